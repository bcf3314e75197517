use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{cities::CityCounts, error::IngestError};

/// One statistic inside a group, holding a value per city.
///
/// Values start out as running sums while a table is being ingested and are
/// replaced by per-city means once the table is finalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Offset of the source column from the group's first member column.
    pub offset: usize,
    cities: BTreeMap<String, f64>,
}

impl Category {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            cities: BTreeMap::new(),
        }
    }

    pub fn add_to_city(&mut self, city: &str, value: f64) {
        *self.cities.entry(city.to_string()).or_insert(0.0) += value;
    }

    /// Value for `city`, or `None` when the city never reported this category.
    pub fn value(&self, city: &str) -> Option<f64> {
        self.cities.get(city).copied()
    }

    /// Value for `city`, treating an unreported city as zero.
    pub fn value_for(&self, city: &str) -> f64 {
        self.value(city).unwrap_or(0.0)
    }

    pub fn cities(&self) -> &BTreeMap<String, f64> {
        &self.cities
    }

    /// Replaces each accumulated sum with the mean over that city's row count.
    ///
    /// Not idempotent: a second call divides the means again.
    pub(crate) fn average_by(&mut self, counts: &CityCounts) -> Result<(), IngestError> {
        for (city, value) in self.cities.iter_mut() {
            *value /= counts.divisor(city)?;
        }
        Ok(())
    }
}
