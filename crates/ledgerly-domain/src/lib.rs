//! Ledgerly Domain Layer
//!
//! Core value types and trait seams for the statement ingestion pipeline.
//! Infrastructure (SQLite, HTTP, PDF decoding, subprocesses) lives in other
//! crates and plugs in through the traits defined in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Statement envelope**: account-identifying metadata shared by every
//!   transaction extracted from one document
//! - **Transaction candidate**: one row proposed by the parser for a page
//! - **Transaction record**: a validated row ready for storage
//! - **Natural key**: `(account_last4, transaction_date, description, amount)`,
//!   the identity used for both in-memory dedup and storage uniqueness
//! - **Process outcome**: the three-way result of processing one file

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod outcome;
pub mod statement;
pub mod traits;
pub mod transaction;

// Re-exports for convenience
pub use audit::{LedgerRecord, ProcessingLogEntry, ProcessingStatus};
pub use outcome::{ProcessOutcome, EXIT_CONFIG_ERROR, EXIT_PARSE_ERROR, EXIT_STORE_ERROR, EXIT_SUCCESS};
pub use statement::{PageParse, RawPage, StatementEnvelope};
pub use transaction::{
    amount_to_cents, NaturalKey, TransactionCandidate, TransactionRecord, TransactionType,
};
