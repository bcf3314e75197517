//! City indexing.
//!
//! [`CityTally`] is the per-table scan of the city column. [`CityCounts`] is
//! the long-lived divisor table shared by every table ingested through one
//! aggregator; it only ever grows.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{dataset::RawTable, error::IngestError, layout::CITY_INDEX};

/// Rows per city for a single table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityTally {
    counts: BTreeMap<String, usize>,
}

impl CityTally {
    pub fn scan(table: &RawTable) -> Result<Self, IngestError> {
        let mut counts = BTreeMap::new();
        for (row, cells) in table.data_rows() {
            let city = cells
                .get(CITY_INDEX)
                .ok_or(IngestError::MissingCity { row })?;
            *counts.entry(city.clone()).or_insert(0) += 1;
        }
        Ok(Self { counts })
    }

    pub fn cities(&self) -> BTreeSet<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn rows_for(&self, city: &str) -> usize {
        self.counts.get(city).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CityCounts {
    counts: BTreeMap<String, usize>,
}

impl CityCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more raw row for `city`.
    pub fn record(&mut self, city: &str) {
        *self.counts.entry(city.to_string()).or_insert(0) += 1;
    }

    pub fn absorb(&mut self, tally: &CityTally) {
        for (city, rows) in &tally.counts {
            *self.counts.entry(city.clone()).or_insert(0) += rows;
        }
    }

    pub fn get(&self, city: &str) -> Option<usize> {
        self.counts.get(city).copied()
    }

    /// Divisor for `city`; a missing or zero count means indexing was skipped.
    pub fn divisor(&self, city: &str) -> Result<f64, IngestError> {
        match self.get(city) {
            Some(rows) if rows > 0 => Ok(rows as f64),
            _ => Err(IngestError::MissingCityCount(city.to_string())),
        }
    }

    /// Distinct city identifiers in sorted order.
    pub fn cities(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(city, rows)| (city.as_str(), *rows))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
