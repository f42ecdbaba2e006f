//! Error types for the processor

use ledgerly_domain::{EXIT_CONFIG_ERROR, EXIT_STORE_ERROR};
use thiserror::Error;

/// Errors raised before a document is processed
///
/// Failures while processing a document are not errors: they are reported
/// as a [`ProcessOutcome`](ledgerly_domain::ProcessOutcome).
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid extraction settings
    #[error(transparent)]
    Extractor(#[from] ledgerly_extractor::ExtractorError),

    /// Transaction store could not be opened
    #[error("Cannot open transaction store: {0}")]
    Store(#[from] ledgerly_store::StoreError),

    /// Inference client could not be built
    #[error("Cannot build inference client: {0}")]
    Llm(#[from] ledgerly_llm::LlmError),
}

impl ProcessorError {
    /// Exit code the `ledgerly-process` binary reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessorError::Store(_) => EXIT_STORE_ERROR,
            ProcessorError::Config(_) | ProcessorError::Extractor(_) | ProcessorError::Llm(_) => {
                EXIT_CONFIG_ERROR
            }
        }
    }
}

/// Result type for processor setup
pub type Result<T> = std::result::Result<T, ProcessorError>;
