//! Trait definitions for external interactions
//!
//! These traits define the boundaries between pipeline logic and
//! infrastructure. Implementations live in other crates.

use crate::{ProcessOutcome, ProcessingLogEntry, TransactionRecord};
use std::path::Path;

/// Trait for the structured-completion inference service
///
/// Implemented by the infrastructure layer (ledgerly-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Check that the service is reachable
    fn health_check(&self) -> Result<(), Self::Error>;

    /// Generate a completion constrained to a JSON document
    fn generate_structured(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Counts reported after persisting one statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    /// Rows with a new natural key
    pub inserted: usize,

    /// Rows whose natural key already existed
    pub skipped: usize,
}

/// Trait for durable transaction storage with an audit log
///
/// Implemented by the infrastructure layer (ledgerly-store)
pub trait TransactionStore {
    /// Error type for store operations
    type Error;

    /// Persist one statement's records and its audit entry atomically
    ///
    /// A record whose natural key already exists is counted as skipped and
    /// does not abort the batch. Any other failure rolls back both the rows
    /// and the audit entry. The entry is written with the resulting counts.
    fn insert_transactions(
        &mut self,
        records: &[TransactionRecord],
        entry: &ProcessingLogEntry,
    ) -> Result<InsertSummary, Self::Error>;

    /// Append an entry to the processing audit log
    fn append_log(&mut self, entry: &ProcessingLogEntry) -> Result<(), Self::Error>;
}

/// Trait for the durable record of completed (watch, file) pairs
///
/// Implemented by the infrastructure layer (ledgerly-store)
pub trait ProcessingLedger {
    /// Error type for ledger operations
    type Error;

    /// Whether the file has already completed processing under this watch
    fn is_processed(&self, watch_id: &str, file_path: &str) -> Result<bool, Self::Error>;

    /// Record that the file completed processing under this watch
    fn record_processed(&mut self, watch_id: &str, file_path: &str) -> Result<(), Self::Error>;
}

/// Trait for turning one document into persisted transactions
///
/// Implemented by the application layer (ledgerly-processor)
pub trait DocumentProcessor {
    /// Process a file end to end and report the outcome
    fn process(&mut self, file: &Path) -> ProcessOutcome;
}
