#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use survey_groups::dataset::RawTable;
use tempfile::{TempDir, tempdir};

/// Builds a raw table from string literals, header first.
pub fn raw_table(rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
}

/// Header from the bedroom example: a total, two categories, a median and a
/// trailing column.
pub const BEDROOMS_HEADER: &[&str] = &[
    "ID", "_", "_", "City", "TOT_Bedrooms", "ONE_BED", "TWO_BED", "MED_Bedrooms", "END",
];

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
