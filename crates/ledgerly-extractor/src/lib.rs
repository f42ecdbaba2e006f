//! Ledgerly Extractor
//!
//! Converts a statement document into per-page parse results.
//!
//! # Architecture
//!
//! ```text
//! Document → extract_pages → RawPage* → StatementParser (LLM, one call per page) → PageParse*
//! ```
//!
//! Merging pages and validating the result is the gatekeeper's job.
//!
//! # Example Usage
//!
//! ```no_run
//! use ledgerly_extractor::{extract_pages, ExtractorConfig, StatementParser};
//! use ledgerly_llm::OllamaProvider;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = OllamaProvider::new("http://localhost:11434", "llama3.1")?;
//! let parser = StatementParser::new(llm, ExtractorConfig::default());
//!
//! for page in extract_pages(Path::new("statement.pdf"))? {
//!     let parsed = parser.parse_page(&page)?;
//!     println!("page {}: {} rows", parsed.page_number, parsed.transactions.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod dates;
mod error;
mod parser;
mod pdf;
mod prompt;
mod statement_parser;


pub use config::ExtractorConfig;
pub use dates::parse_date;
pub use error::ExtractorError;
pub use parser::{parse_amount, parse_page_response};
pub use pdf::{extract_pages, IMAGE_EXTENSIONS};
pub use statement_parser::StatementParser;
