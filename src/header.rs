//! Header analysis: group boundaries and column resolution.
//!
//! The header row is scanned once from `CITY_INDEX + 1` up to, but not
//! including, the last column. Every cell carrying a group indicator becomes a
//! [`Boundary`]. Data columns are then resolved to the group whose span covers
//! them and to an offset inside that group.

use log::debug;

use crate::{
    error::IngestError,
    layout::{CITY_INDEX, HeaderRules},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Header column holding the group indicator.
    pub column: usize,
    /// First column whose values belong to the group.
    pub start: usize,
    pub name: String,
}

/// Where a single data column lands inside the grouped structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub group: String,
    pub boundary: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBoundaries {
    entries: Vec<Boundary>,
}

impl GroupBoundaries {
    pub fn compute(header: &[String], rules: &HeaderRules) -> Result<Self, IngestError> {
        let mut entries: Vec<Boundary> = Vec::new();
        let scan_end = header.len().saturating_sub(1);
        for column in CITY_INDEX + 1..scan_end {
            let cell = &header[column];
            let Some(indicator) = rules.group_indicator(cell) else {
                continue;
            };
            let start = indicator
                .first_member(column)
                .filter(|start| *start > CITY_INDEX)
                .ok_or_else(|| {
                    IngestError::header(
                        column,
                        format!("group '{cell}' would start before the data columns"),
                    )
                })?;
            let naming = rules.naming_rule(cell).unwrap_or(indicator);
            let name = naming.group_name(header, column).ok_or_else(|| {
                IngestError::header(
                    column,
                    format!("no column to borrow a group name from for '{cell}'"),
                )
            })?;
            if let Some(existing) = entries.iter().find(|b| b.name == name) {
                return Err(IngestError::DuplicateGroup {
                    name,
                    first: existing.column,
                    second: column,
                });
            }
            entries.push(Boundary {
                column,
                start,
                name,
            });
        }
        debug!(
            "Found {} group boundary(ies) in {} header column(s)",
            entries.len(),
            header.len()
        );
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Boundary] {
        &self.entries
    }

    pub fn columns(&self) -> Vec<usize> {
        self.entries.iter().map(|b| b.column).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolves `column` to its group and offset.
    ///
    /// The floor boundary (greatest indicator column `<= column`) is found by
    /// binary search. A following group whose lead reaches back over `column`
    /// takes precedence, which is how the column before a `Shape__` indicator
    /// joins the shape group.
    pub fn resolve_column(&self, column: usize) -> Result<ColumnSlot, IngestError> {
        let mut idx = self.entries.partition_point(|b| b.column <= column);
        if let Some(next) = self.entries.get(idx)
            && next.start <= column
        {
            idx += 1;
        }
        let boundary = idx
            .checked_sub(1)
            .map(|i| &self.entries[i])
            .ok_or_else(|| {
                let reason = if self.entries.is_empty() {
                    "header declares no groups".to_string()
                } else {
                    "column precedes the first group".to_string()
                };
                IngestError::header(column, reason)
            })?;
        let offset = column.checked_sub(boundary.start).ok_or_else(|| {
            IngestError::header(
                column,
                format!("column is the indicator of group '{}'", boundary.name),
            )
        })?;
        Ok(ColumnSlot {
            group: boundary.name.clone(),
            boundary: boundary.column,
            offset,
        })
    }
}
