//! Fixed layout of the survey extracts and the header rule table.
//!
//! Column [`CITY_INDEX`] carries the city identifier; everything after it is
//! category data. Header cells are matched against an ordered list of
//! [`HeaderRule`]s to decide which columns open a group, which ones carry
//! values, and how the group gets its display name.

pub const CITY_INDEX: usize = 3;

pub const TOT_: &str = "TOT_";
pub const MED_: &str = "MED_";
pub const SHAPE__: &str = "Shape__";

/// Where a group's display name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupNaming {
    /// Header text with the marker removed.
    StripMarker,
    /// A constant name.
    Fixed(&'static str),
    /// The header text of the column right after the marker.
    NextColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRule {
    pub marker: &'static str,
    /// Marker columns open a new group.
    pub starts_group: bool,
    /// Marker columns carry per-category values.
    pub contributes: bool,
    /// Number of columns before the marker that already belong to the group.
    pub lead: usize,
    pub naming: GroupNaming,
}

impl HeaderRule {
    pub fn matches(&self, header: &str) -> bool {
        header.contains(self.marker)
    }

    /// First member column of a group whose marker sits at `column`.
    pub fn first_member(&self, column: usize) -> Option<usize> {
        let start = if self.contributes { column } else { column + 1 };
        start.checked_sub(self.lead)
    }

    pub fn group_name(&self, header: &[String], column: usize) -> Option<String> {
        match self.naming {
            GroupNaming::StripMarker => Some(header[column].replace(self.marker, "")),
            GroupNaming::Fixed(name) => Some(name.to_string()),
            GroupNaming::NextColumn => header.get(column + 1).cloned(),
        }
    }
}

/// Ordered rule table. Earlier rules take priority when a header matches more
/// than one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRules {
    rules: Vec<HeaderRule>,
}

impl HeaderRules {
    pub fn new(rules: Vec<HeaderRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }

    /// First rule that opens a group for this header cell.
    pub fn group_indicator(&self, header: &str) -> Option<&HeaderRule> {
        self.rules
            .iter()
            .filter(|rule| rule.starts_group)
            .find(|rule| rule.matches(header))
    }

    /// First rule of any kind matching this header cell.
    pub fn naming_rule(&self, header: &str) -> Option<&HeaderRule> {
        self.rules.iter().find(|rule| rule.matches(header))
    }

    /// Columns that only locate groups and never add to a category.
    pub fn is_excluded(&self, header: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| !rule.contributes && rule.matches(header))
    }
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self::new(vec![
            HeaderRule {
                marker: SHAPE__,
                starts_group: true,
                contributes: true,
                lead: 1,
                naming: GroupNaming::Fixed("Shape"),
            },
            HeaderRule {
                marker: TOT_,
                starts_group: true,
                contributes: false,
                lead: 0,
                naming: GroupNaming::StripMarker,
            },
            HeaderRule {
                marker: MED_,
                starts_group: false,
                contributes: false,
                lead: 0,
                naming: GroupNaming::NextColumn,
            },
        ])
    }
}
