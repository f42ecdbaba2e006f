//! Ledgerly Document Processor
//!
//! Orchestrates one statement document from file to stored transactions and
//! reports a three-way [`ProcessOutcome`](ledgerly_domain::ProcessOutcome).
//! The `ledgerly-process` binary maps that outcome to an exit code.
//!
//! # Example Usage
//!
//! ```no_run
//! use ledgerly_domain::traits::DocumentProcessor;
//! use ledgerly_extractor::ExtractorConfig;
//! use ledgerly_llm::OllamaProvider;
//! use ledgerly_processor::Processor;
//! use ledgerly_store::SqliteStore;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = OllamaProvider::new("http://localhost:11434", "llama3.1")?;
//! let store = SqliteStore::new("transactions.db")?;
//! let mut processor = Processor::new(llm, store, ExtractorConfig::default());
//!
//! let outcome = processor.process(Path::new("statement.pdf"));
//! println!("exit code {}", outcome.exit_code());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
mod processor;

pub use config::ProcessorConfig;
pub use error::{ProcessorError, Result};
pub use processor::Processor;
