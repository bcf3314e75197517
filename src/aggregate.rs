//! Aggregation of raw survey tables into grouped per-city means.
//!
//! An [`Aggregator`] owns the [`CityCounts`] divisor table for its lifetime.
//! Ingestion of a batch runs in three passes:
//!
//! 1. every table is scanned for cities and accumulated into running sums
//!    without touching shared state,
//! 2. the per-table city tallies are committed to the shared counts,
//! 3. each accumulated dataset is finalised exactly once, dividing every sum
//!    by the city's row count.
//!
//! A failure in pass 1 leaves the aggregator unchanged.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::{
    category::Category,
    cities::{CityCounts, CityTally},
    dataset::{Dataset, RawTable},
    error::IngestError,
    header::GroupBoundaries,
    layout::{CITY_INDEX, HeaderRules},
};

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    counts: CityCounts,
    rules: HeaderRules,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: HeaderRules) -> Self {
        Self {
            counts: CityCounts::new(),
            rules,
        }
    }

    pub fn rules(&self) -> &HeaderRules {
        &self.rules
    }

    pub fn city_counts(&self) -> &CityCounts {
        &self.counts
    }

    /// Every city seen so far, sorted.
    pub fn cities(&self) -> Vec<String> {
        self.counts.cities()
    }

    /// Counts the rows of `table` per city into the shared divisor table.
    ///
    /// [`ingest`](Self::ingest) already does this; calling both for the same
    /// table counts its rows twice.
    pub fn index_table(&mut self, table: &RawTable) -> Result<BTreeSet<String>, IngestError> {
        let tally = CityTally::scan(table)?;
        self.counts.absorb(&tally);
        Ok(tally.cities())
    }

    pub fn ingest(&mut self, table: &RawTable) -> Result<Dataset, IngestError> {
        let mut datasets = self.ingest_all(std::slice::from_ref(table))?;
        Ok(datasets.remove(0))
    }

    /// Ingests several tables that share one city set.
    ///
    /// All tallies are committed before any table is averaged, so every
    /// dataset is divided by the full row count of each city.
    pub fn ingest_all(&mut self, tables: &[RawTable]) -> Result<Vec<Dataset>, IngestError> {
        let pending = tables
            .iter()
            .map(|table| accumulate(table, &self.rules))
            .collect::<Result<Vec<_>, _>>()?;

        for accumulation in &pending {
            self.counts.absorb(&accumulation.tally);
        }

        let datasets = pending
            .into_iter()
            .map(|accumulation| accumulation.finalize(&self.counts))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "Ingested {} table(s) into {} group(s) across {} city(ies)",
            tables.len(),
            datasets.iter().map(Dataset::len).sum::<usize>(),
            self.counts.len()
        );
        Ok(datasets)
    }
}

/// Summed but not yet averaged dataset for one table.
struct Accumulation {
    dataset: Dataset,
    tally: CityTally,
}

impl Accumulation {
    fn finalize(mut self, counts: &CityCounts) -> Result<Dataset, IngestError> {
        for group in self.dataset.groups_mut() {
            for category in group.categories_mut() {
                category.average_by(counts)?;
            }
        }
        Ok(self.dataset)
    }
}

/// Target of a data column: group index and category index inside it.
type Slot = (usize, usize);

fn accumulate(table: &RawTable, rules: &HeaderRules) -> Result<Accumulation, IngestError> {
    let header = table.header().ok_or(IngestError::EmptyTable)?;
    let tally = CityTally::scan(table)?;
    let boundaries = GroupBoundaries::compute(header, rules)?;

    let mut dataset = Dataset::new(table.source().map(str::to_string));
    let plan = allocate_slots(header, rules, &boundaries, &mut dataset)?;

    for (row, cells) in table.data_rows() {
        if cells.len() > header.len() {
            return Err(IngestError::RaggedRow {
                row,
                expected: header.len(),
                found: cells.len(),
            });
        }
        let city = cells.get(CITY_INDEX).ok_or(IngestError::MissingCity { row })?;
        for (column, cell) in cells.iter().enumerate().skip(CITY_INDEX + 1) {
            let Some((group, category)) = plan[column] else {
                continue;
            };
            let value = parse_cell(cell).ok_or_else(|| IngestError::MalformedValue {
                row,
                column: header[column].clone(),
                value: cell.clone(),
            })?;
            dataset.group_at_mut(group).categories_mut()[category].add_to_city(city, value);
        }
    }

    debug!(
        "Accumulated {} row(s) for {} city(ies) into {} group(s){}",
        table.row_count(),
        tally.len(),
        dataset.len(),
        table
            .source()
            .map(|source| format!(" from {source}"))
            .unwrap_or_default()
    );
    Ok(Accumulation { dataset, tally })
}

/// Creates every group and category the header describes, before any value is
/// summed, and maps each contributing column to its slot.
fn allocate_slots(
    header: &[String],
    rules: &HeaderRules,
    boundaries: &GroupBoundaries,
    dataset: &mut Dataset,
) -> Result<Vec<Option<Slot>>, IngestError> {
    for boundary in boundaries.entries() {
        dataset.group_index_or_insert(&boundary.name);
    }

    let mut plan = vec![None; header.len()];
    for (column, name) in header.iter().enumerate().skip(CITY_INDEX + 1) {
        if rules.is_excluded(name) {
            continue;
        }
        let slot = boundaries.resolve_column(column)?;
        let group = dataset.group_index_or_insert(&slot.group);
        let category = dataset
            .group_at_mut(group)
            .push(Category::new(name.clone(), slot.offset));
        plan[column] = Some((group, category));
    }
    Ok(plan)
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    const HEADER: &[&str] = &[
        "ID", "_", "_", "City", "TOT_Bedrooms", "ONE_BED", "TWO_BED", "MED_Bedrooms", "END",
    ];

    #[test]
    fn slots_are_allocated_before_any_row() {
        let raw = table(&[HEADER]);
        let mut aggregator = Aggregator::new();
        let dataset = aggregator.ingest(&raw).unwrap();
        let group = dataset.group("Bedrooms").unwrap();
        assert_eq!(group.category_names(), vec!["ONE_BED", "TWO_BED", "END"]);
        assert!(group.categories().iter().all(|c| c.cities().is_empty()));
        assert!(aggregator.cities().is_empty());
    }

    #[test]
    fn failed_table_leaves_counts_untouched() {
        let good = table(&[HEADER, &["1", "", "", "Aurora", "10", "4", "6", "5", "0"]]);
        let bad = table(&[HEADER, &["2", "", "", "Aurora", "10", "four", "6", "5", "0"]]);
        let mut aggregator = Aggregator::new();
        let err = aggregator.ingest_all(&[good, bad]).unwrap_err();
        assert_eq!(
            err,
            IngestError::MalformedValue {
                row: 1,
                column: "ONE_BED".to_string(),
                value: "four".to_string()
            }
        );
        assert!(aggregator.city_counts().is_empty());
    }

    #[test]
    fn excluded_cells_are_never_parsed() {
        let raw = table(&[HEADER, &["1", "", "", "Aurora", "n/a", "4", "6", "n/a", "0"]]);
        let dataset = Aggregator::new().ingest(&raw).unwrap();
        let group = dataset.group("Bedrooms").unwrap();
        assert_eq!(group.category("ONE_BED").unwrap().value("Aurora"), Some(4.0));
    }

    #[test]
    fn wider_row_than_header_is_rejected() {
        let raw = table(&[HEADER, &["1", "", "", "Aurora", "1", "1", "1", "1", "1", "1"]]);
        assert_eq!(
            Aggregator::new().ingest(&raw).unwrap_err(),
            IngestError::RaggedRow {
                row: 1,
                expected: 9,
                found: 10
            }
        );
    }

    #[test]
    fn table_without_header_is_rejected() {
        let raw = RawTable::default();
        assert_eq!(
            Aggregator::new().ingest(&raw).unwrap_err(),
            IngestError::EmptyTable
        );
    }

    #[test]
    fn index_table_counts_cities_once_per_call() {
        let raw = table(&[
            HEADER,
            &["1", "", "", "Aurora", "1", "1", "1", "1", "1"],
            &["2", "", "", "Aurora", "1", "1", "1", "1", "1"],
        ]);
        let mut aggregator = Aggregator::new();
        let cities = aggregator.index_table(&raw).unwrap();
        assert_eq!(cities.into_iter().collect::<Vec<_>>(), vec!["Aurora"]);
        aggregator.index_table(&raw).unwrap();
        assert_eq!(aggregator.city_counts().get("Aurora"), Some(4));
    }
}
