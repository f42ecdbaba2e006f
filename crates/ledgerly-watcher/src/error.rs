//! Error types for watch scanning

use thiserror::Error;

/// Errors that abort a scan
///
/// Per-file failures never surface here; they are counted in
/// [`ScanMetrics`](crate::ScanMetrics) and the file is retried next run.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Watch configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Processing ledger could not be read or written
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Another scan holds the run lease
    #[error("Another scan is running: {0}")]
    LeaseHeld(String),
}

impl From<ledgerly_store::StoreError> for WatcherError {
    fn from(e: ledgerly_store::StoreError) -> Self {
        match e {
            ledgerly_store::StoreError::LeaseHeld { .. } => WatcherError::LeaseHeld(e.to_string()),
            other => WatcherError::Ledger(other.to_string()),
        }
    }
}
