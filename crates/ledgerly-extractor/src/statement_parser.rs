//! Per-page statement parsing against an LLM provider

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_page_response;
use crate::prompt::PromptBuilder;
use ledgerly_domain::traits::LlmProvider;
use ledgerly_domain::{PageParse, RawPage};
use std::fmt::Display;
use tracing::{debug, info};

/// Turns one page of statement text into a [`PageParse`]
///
/// Each page is an independent request, so one bad page never poisons the
/// others. The provider's reachability is checked before every request.
pub struct StatementParser<L> {
    llm: L,
    config: ExtractorConfig,
}

impl<L> StatementParser<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a parser over the given provider
    pub fn new(llm: L, config: ExtractorConfig) -> Self {
        Self { llm, config }
    }

    /// Borrow the underlying provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Parse a single page
    ///
    /// # Errors
    ///
    /// - `Unreachable` if the health check fails (no generation is attempted)
    /// - `Llm` if generation fails
    /// - `JsonParse`, `InvalidFormat` or `Date` if the response does not
    ///   match the page schema
    pub fn parse_page(&self, page: &RawPage) -> Result<PageParse, ExtractorError> {
        self.llm
            .health_check()
            .map_err(|e| ExtractorError::Unreachable(e.to_string()))?;

        let mut builder = PromptBuilder::new(&page.text, self.config.max_page_chars);
        if self.config.include_page_number {
            builder = builder.with_page_number(page.number);
        }
        let prompt = builder.build();
        debug!("Page {} prompt length: {} chars", page.number, prompt.len());

        let response = self
            .llm
            .generate_structured(&prompt)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;
        debug!("Page {} response length: {} chars", page.number, response.len());

        let (envelope, transactions) = parse_page_response(&response)?;
        info!(
            "Page {}: {} transaction candidate(s)",
            page.number,
            transactions.len()
        );

        Ok(PageParse {
            page_number: page.number,
            envelope,
            transactions,
        })
    }
}
