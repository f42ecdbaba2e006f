//! Configuration for the Extractor

use crate::ExtractorError;
use serde::{Deserialize, Serialize};

/// Configuration for page extraction and parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Page text longer than this (characters) is truncated before prompting
    pub max_page_chars: usize,

    /// Include the page number in the prompt
    pub include_page_number: bool,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_page_chars == 0 {
            return Err(ExtractorError::Config(
                "max_page_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_page_chars: 20_000,
            include_page_number: true,
        }
    }
}
