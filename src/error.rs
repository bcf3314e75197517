//! Error taxonomy for table ingestion.
//!
//! Every variant is fatal for the table being ingested: the aggregator never
//! hands back a partially filled dataset.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IngestError {
    #[error("table has no header row")]
    EmptyTable,

    #[error("malformed header at column {column}: {reason}")]
    MalformedHeader { column: usize, reason: String },

    #[error("group '{name}' is declared by columns {first} and {second}")]
    DuplicateGroup {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("row {row} has no city identifier")]
    MissingCity { row: usize },

    #[error("row {row} has {found} cells but the header only has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row} column '{column}': '{value}' is not a number")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("no row count recorded for city '{0}'")]
    MissingCityCount(String),
}

impl IngestError {
    pub(crate) fn header(column: usize, reason: impl Into<String>) -> Self {
        IngestError::MalformedHeader {
            column,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("group '{0}' not found in any dataset")]
    UnknownGroup(String),

    #[error("city '{0}' was not seen during ingestion")]
    UnknownCity(String),
}
