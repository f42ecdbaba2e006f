//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while turning a document into page parses
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Image documents are recognised but not ingested
    #[error("Image ingestion not supported: {0}")]
    UnsupportedImage(String),

    /// Extension is neither PDF, text, nor a known image type
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Extraction produced no usable page
    #[error("No extractable pages in {0}")]
    NoPages(String),

    /// PDF could not be opened or decoded
    #[error("PDF error: {0}")]
    Pdf(String),

    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inference service failed the reachability check
    #[error("Inference service unreachable: {0}")]
    Unreachable(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Response did not match the page schema
    #[error("Invalid page format: {0}")]
    InvalidFormat(String),

    /// A date matched none of the accepted formats
    #[error("Unrecognised date: {0:?}")]
    Date(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<lopdf::Error> for ExtractorError {
    fn from(e: lopdf::Error) -> Self {
        ExtractorError::Pdf(e.to_string())
    }
}
