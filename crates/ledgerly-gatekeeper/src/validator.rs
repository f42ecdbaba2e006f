//! Structural validation of a merged statement

use crate::{GatekeeperError, MergedStatement};
use ledgerly_domain::{TransactionRecord, TransactionType};
use std::fmt;
use tracing::warn;

/// Reasons a merged statement is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Envelope has no account name
    MissingAccountName,

    /// Envelope's last-four is not exactly four characters
    InvalidAccountLast4(String),

    /// Envelope has no statement date
    MissingStatementDate,

    /// Nothing to store
    NoTransactions,

    /// A transaction has a blank description
    EmptyDescription {
        /// Position in the merged candidate list
        index: usize,
    },

    /// A transaction's type is neither debit nor credit
    InvalidTransactionType {
        /// Position in the merged candidate list
        index: usize,
        /// Type text as returned by the model
        value: String,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingAccountName => write!(f, "account_name is empty"),
            RejectionReason::InvalidAccountLast4(v) => {
                write!(f, "account_last4 must be 4 characters, got {:?}", v)
            }
            RejectionReason::MissingStatementDate => write!(f, "statement_date is missing"),
            RejectionReason::NoTransactions => write!(f, "no transactions"),
            RejectionReason::EmptyDescription { index } => {
                write!(f, "transaction {} has an empty description", index)
            }
            RejectionReason::InvalidTransactionType { index, value } => {
                write!(f, "transaction {} has invalid type {:?}", index, value)
            }
        }
    }
}

/// Validate a merged statement and build its storage records
///
/// Every rule is checked so the error lists all problems at once. On
/// success the envelope and `source_file` are stamped onto each candidate.
pub fn validate(
    merged: &MergedStatement,
    source_file: &str,
) -> Result<Vec<TransactionRecord>, GatekeeperError> {
    let envelope = &merged.envelope;
    let mut reasons = Vec::new();

    if envelope.account_name.trim().is_empty() {
        reasons.push(RejectionReason::MissingAccountName);
    }
    if envelope.account_last4.chars().count() != 4 {
        reasons.push(RejectionReason::InvalidAccountLast4(
            envelope.account_last4.clone(),
        ));
    }
    if envelope.statement_date.is_none() {
        reasons.push(RejectionReason::MissingStatementDate);
    }
    if merged.candidates.is_empty() {
        reasons.push(RejectionReason::NoTransactions);
    }

    let mut types = Vec::with_capacity(merged.candidates.len());
    for (index, candidate) in merged.candidates.iter().enumerate() {
        if candidate.description.trim().is_empty() {
            reasons.push(RejectionReason::EmptyDescription { index });
        }
        match TransactionType::parse(&candidate.transaction_type) {
            Some(t) => types.push(t),
            None => reasons.push(RejectionReason::InvalidTransactionType {
                index,
                value: candidate.transaction_type.clone(),
            }),
        }
    }

    let statement_date = match envelope.statement_date {
        Some(date) if reasons.is_empty() => date,
        _ => {
            warn!("Rejected {}: {} problem(s)", source_file, reasons.len());
            return Err(GatekeeperError::Rejected(reasons));
        }
    };

    let records = merged
        .candidates
        .iter()
        .zip(types)
        .map(|(candidate, transaction_type)| TransactionRecord {
            account_name: envelope.account_name.trim().to_string(),
            account_last4: envelope.account_last4.clone(),
            transaction_date: candidate.transaction_date,
            post_date: candidate.post_date,
            description: candidate.description.clone(),
            amount: transaction_type.signed(candidate.amount),
            transaction_type,
            balance: candidate.balance,
            statement_date,
            source_file: source_file.to_string(),
        })
        .collect();

    Ok(records)
}
