//! Audit trail and ledger record types

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Status recorded in the processing audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStatus {
    /// File processed and persisted
    Success,

    /// Extraction, inference, decoding or validation failed
    ParseError,

    /// Storage open or write failed
    DbError,
}

impl ProcessingStatus {
    /// Get the status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "success",
            ProcessingStatus::ParseError => "parse_error",
            ProcessingStatus::DbError => "db_error",
        }
    }

    /// Parse a stored status name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(ProcessingStatus::Success),
            "parse_error" => Some(ProcessingStatus::ParseError),
            "db_error" => Some(ProcessingStatus::DbError),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only processing audit log
///
/// Exactly one entry is written per processing attempt, whatever the
/// outcome. Entries are never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingLogEntry {
    /// File name of the processed document
    pub source_file: String,

    /// Statement date, if parsing got far enough to know it
    pub statement_date: Option<NaiveDate>,

    /// Account name, empty if unknown
    pub account_name: String,

    /// Rows newly inserted
    pub transactions_inserted: usize,

    /// Rows whose natural key already existed
    pub transactions_skipped: usize,

    /// Outcome of the attempt
    pub status: ProcessingStatus,

    /// Failure reason, empty on success
    pub error_message: String,

    /// When the attempt finished
    pub processed_at: DateTime<Utc>,
}

impl ProcessingLogEntry {
    /// Start an entry for a file with zero counts and no error
    pub fn new(source_file: impl Into<String>, status: ProcessingStatus) -> Self {
        Self {
            source_file: source_file.into(),
            statement_date: None,
            account_name: String::new(),
            transactions_inserted: 0,
            transactions_skipped: 0,
            status,
            error_message: String::new(),
            processed_at: Utc::now(),
        }
    }
}

/// A completed (watch, file) pair in the processing ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// Watch the file was discovered under
    pub watch_id: String,

    /// File name relative to the watch directory
    pub file_path: String,

    /// When processing completed
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in [
            ProcessingStatus::Success,
            ProcessingStatus::ParseError,
            ProcessingStatus::DbError,
        ] {
            assert_eq!(ProcessingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProcessingStatus::parse("pending"), None);
    }

    #[test]
    fn test_new_entry_defaults() {
        let entry = ProcessingLogEntry::new("stmt.pdf", ProcessingStatus::ParseError);
        assert_eq!(entry.source_file, "stmt.pdf");
        assert_eq!(entry.transactions_inserted, 0);
        assert!(entry.error_message.is_empty());
        assert!(entry.statement_date.is_none());
    }
}
