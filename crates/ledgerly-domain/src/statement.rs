//! Statement-level types: pages, envelopes and per-page parse results

use crate::transaction::TransactionCandidate;
use chrono::NaiveDate;

/// One page of extracted plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// 1-based page number within the source document
    pub number: u32,

    /// Extracted text for this page only
    pub text: String,
}

/// Account-identifying metadata shared by all transactions of one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementEnvelope {
    /// Account holder / product name
    pub account_name: String,

    /// Last four characters of the account number
    pub account_last4: String,

    /// Closing date of the statement, when the page shows one
    pub statement_date: Option<NaiveDate>,
}

/// What the parser extracted from a single page
#[derive(Debug, Clone, PartialEq)]
pub struct PageParse {
    /// Page the result came from
    pub page_number: u32,

    /// Envelope fields as seen on this page
    pub envelope: StatementEnvelope,

    /// Candidate transactions on this page, in printed order
    pub transactions: Vec<TransactionCandidate>,
}
