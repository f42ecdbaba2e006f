//! Page merging and cross-page deduplication

use crate::GatekeeperError;
use ledgerly_domain::{PageParse, StatementEnvelope, TransactionCandidate};
use std::collections::HashSet;
use tracing::debug;

/// All parsed pages of one document folded into a single statement
#[derive(Debug, Clone, PartialEq)]
pub struct MergedStatement {
    /// Envelope of the first parsed page
    pub envelope: StatementEnvelope,

    /// Unique candidates in page order
    pub candidates: Vec<TransactionCandidate>,

    /// Candidates dropped because an earlier one had the same natural key
    pub duplicates_removed: usize,

    /// Number of pages that contributed
    pub pages_parsed: usize,
}

/// Merge per-page results into one statement
///
/// The envelope is taken from the lowest-numbered page and never
/// overwritten. Candidates keep page order; a repeat of an earlier natural
/// key (a row printed again on a continuation page) is dropped.
pub fn merge_pages(mut pages: Vec<PageParse>) -> Result<MergedStatement, GatekeeperError> {
    if pages.is_empty() {
        return Err(GatekeeperError::NoPagesParsed);
    }
    pages.sort_by_key(|p| p.page_number);

    let pages_parsed = pages.len();
    let envelope = pages[0].envelope.clone();

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut duplicates_removed = 0;

    for page in pages {
        for candidate in page.transactions {
            if seen.insert(candidate.natural_key(&envelope.account_last4)) {
                candidates.push(candidate);
            } else {
                duplicates_removed += 1;
            }
        }
    }

    debug!(
        "Merged {} page(s): {} candidate(s), {} duplicate(s) removed",
        pages_parsed,
        candidates.len(),
        duplicates_removed
    );

    Ok(MergedStatement {
        envelope,
        candidates,
        duplicates_removed,
        pages_parsed,
    })
}
