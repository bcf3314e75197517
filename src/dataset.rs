//! Raw input grid and the grouped structure handed to presentation.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Parsed survey grid. Row 0 is the header; every other row describes one city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    source: Option<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { source: None, rows }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows paired with their row number in the grid (the header is row 0).
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// Named cluster of categories, ordered by their column offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    categories: Vec<Category>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, category: Category) -> usize {
        self.categories.push(category);
        self.categories.len() - 1
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub(crate) fn categories_mut(&mut self) -> &mut [Category] {
        &mut self.categories
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category fed by the column at `offset` from the group's first member.
    pub fn category_at(&self, offset: usize) -> Option<&Category> {
        self.categories
            .binary_search_by_key(&offset, |c| c.offset)
            .ok()
            .map(|idx| &self.categories[idx])
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Groups built from one raw table, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
    groups: Vec<Group>,
}

impl Dataset {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            groups: Vec::new(),
        }
    }

    pub(crate) fn group_index_or_insert(&mut self, name: &str) -> usize {
        match self.groups.iter().position(|g| g.name == name) {
            Some(idx) => idx,
            None => {
                self.groups.push(Group::new(name));
                self.groups.len() - 1
            }
        }
    }

    pub(crate) fn group_at_mut(&mut self, idx: usize) -> &mut Group {
        &mut self.groups[idx]
    }

    pub(crate) fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.group(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// First dataset carrying `name` wins.
pub fn find_group<'a>(datasets: &'a [Dataset], name: &str) -> Option<&'a Group> {
    datasets.iter().find_map(|dataset| dataset.group(name))
}
