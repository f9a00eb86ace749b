//! Remote key layout.
//!
//! Key format: `<folder>/<date>/<file name>`. All backends use this format so
//! a re-run over the same date range probes the same keys.

use chrono::NaiveDate;

/// Deterministic remote key prefix for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPrefix {
    folder: String,
    date: NaiveDate,
}

impl ObjectPrefix {
    pub fn new(folder: impl Into<String>, date: NaiveDate) -> Self {
        ObjectPrefix {
            folder: folder.into(),
            date,
        }
    }

    /// Remote key for a file name: `<folder>/<date>/<file_name>`.
    pub fn key_for(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.folder,
            self.date.format("%Y-%m-%d"),
            file_name
        )
    }
}
