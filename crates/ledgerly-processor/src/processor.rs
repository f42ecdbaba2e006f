//! End-to-end processing of one statement document
//!
//! ```text
//! file → extract_pages → parse_page (per page) → merge_pages → validate → store
//! ```
//!
//! Every attempt leaves exactly one audit log entry behind.

use ledgerly_domain::traits::{DocumentProcessor, LlmProvider, TransactionStore};
use ledgerly_domain::{
    ProcessOutcome, ProcessingLogEntry, ProcessingStatus, StatementEnvelope, TransactionRecord,
};
use ledgerly_extractor::{extract_pages, ExtractorConfig, StatementParser};
use ledgerly_gatekeeper::{merge_pages, validate};
use std::fmt::Display;
use std::path::Path;
use tracing::{error, info, warn};

/// Why a document failed before storage, plus whatever envelope was known
struct ParseFailure {
    reason: String,
    envelope: Option<StatementEnvelope>,
}

impl ParseFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            envelope: None,
        }
    }
}

/// Document processor over an LLM provider and a transaction store
pub struct Processor<L, S> {
    parser: StatementParser<L>,
    store: S,
}

impl<L, S> Processor<L, S>
where
    L: LlmProvider,
    L::Error: Display,
    S: TransactionStore,
    S::Error: Display,
{
    /// Create a processor
    pub fn new(llm: L, store: S, config: ExtractorConfig) -> Self {
        Self {
            parser: StatementParser::new(llm, config),
            store,
        }
    }

    /// Borrow the transaction store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Borrow the LLM provider
    pub fn llm(&self) -> &L {
        self.parser.llm()
    }

    fn parse_statement(
        &self,
        file: &Path,
        source_file: &str,
    ) -> Result<(StatementEnvelope, Vec<TransactionRecord>), ParseFailure> {
        let pages = extract_pages(file).map_err(|e| ParseFailure::new(e.to_string()))?;
        let page_count = pages.len();

        let mut parsed = Vec::with_capacity(page_count);
        for page in &pages {
            match self.parser.parse_page(page) {
                Ok(result) => parsed.push(result),
                Err(e) => warn!("Dropping page {} of {}: {}", page.number, source_file, e),
            }
        }

        let merged = merge_pages(parsed).map_err(|e| {
            ParseFailure::new(format!("{} ({} page(s) extracted)", e, page_count))
        })?;
        if merged.duplicates_removed > 0 {
            info!(
                "{}: collapsed {} cross-page duplicate(s)",
                source_file, merged.duplicates_removed
            );
        }

        let records = validate(&merged, source_file).map_err(|e| ParseFailure {
            reason: e.to_string(),
            envelope: Some(merged.envelope.clone()),
        })?;

        Ok((merged.envelope, records))
    }

    /// Append an audit entry; failure is only logged
    fn append_log_best_effort(&mut self, entry: &ProcessingLogEntry) {
        if let Err(e) = self.store.append_log(entry) {
            error!("Failed to write audit entry for {}: {}", entry.source_file, e);
        }
    }
}

impl<L, S> DocumentProcessor for Processor<L, S>
where
    L: LlmProvider,
    L::Error: Display,
    S: TransactionStore,
    S::Error: Display,
{
    fn process(&mut self, file: &Path) -> ProcessOutcome {
        let source_file = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        info!("Processing {}", file.display());

        let (envelope, records) = match self.parse_statement(file, &source_file) {
            Ok(parsed) => parsed,
            Err(failure) => {
                error!("Parse error for {}: {}", source_file, failure.reason);
                let mut entry = ProcessingLogEntry::new(&source_file, ProcessingStatus::ParseError);
                if let Some(envelope) = failure.envelope {
                    entry.statement_date = envelope.statement_date;
                    entry.account_name = envelope.account_name;
                }
                entry.error_message = failure.reason.clone();
                self.append_log_best_effort(&entry);
                return ProcessOutcome::ParseError {
                    reason: failure.reason,
                };
            }
        };

        // Rows and this entry commit together
        let mut entry = ProcessingLogEntry::new(&source_file, ProcessingStatus::Success);
        entry.statement_date = envelope.statement_date;
        entry.account_name = envelope.account_name;

        match self.store.insert_transactions(&records, &entry) {
            Ok(summary) => {
                info!(
                    "Stored {}: inserted={} skipped={}",
                    source_file, summary.inserted, summary.skipped
                );
                ProcessOutcome::Success {
                    inserted: summary.inserted,
                    skipped: summary.skipped,
                }
            }
            Err(e) => {
                let reason = e.to_string();
                error!("Store error for {}: {}", source_file, reason);
                entry.status = ProcessingStatus::DbError;
                entry.error_message = reason.clone();
                self.append_log_best_effort(&entry);
                ProcessOutcome::StoreError { reason }
            }
        }
    }
}
