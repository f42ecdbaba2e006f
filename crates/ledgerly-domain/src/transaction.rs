//! Transaction module - candidate rows from the parser and validated records

use chrono::NaiveDate;
use std::fmt;

/// Direction of money movement for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Money leaving the account
    Debit,

    /// Money entering the account
    Credit,
}

impl TransactionType {
    /// Get the type name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
        }
    }

    /// Parse a transaction type, ignoring case and surrounding whitespace
    ///
    /// # Examples
    ///
    /// ```
    /// use ledgerly_domain::TransactionType;
    ///
    /// assert_eq!(TransactionType::parse(" Debit "), Some(TransactionType::Debit));
    /// assert_eq!(TransactionType::parse("fee"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Some(TransactionType::Debit),
            "credit" => Some(TransactionType::Credit),
            _ => None,
        }
    }

    /// Apply this type's sign to an amount: debits negative, credits positive
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            TransactionType::Debit => -amount.abs(),
            TransactionType::Credit => amount.abs(),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a decimal amount to integer cents, rounding half away from zero
pub fn amount_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Identity of a transaction independent of any surrogate id
///
/// Two rows with the same natural key are the same transaction, whether they
/// come from two pages of one statement or from two runs over the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    /// Last four characters of the account number
    pub account_last4: String,

    /// Date the transaction occurred
    pub transaction_date: NaiveDate,

    /// Description as printed on the statement
    pub description: String,

    /// Signed amount in cents
    pub amount_cents: i64,
}

/// One transaction row proposed by the parser for a single page
///
/// Account fields are not carried per candidate; they come from the
/// statement envelope once pages are merged. `transaction_type` is kept as
/// raw text so the validator can reject anything that is not debit/credit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    /// Date the transaction occurred
    pub transaction_date: NaiveDate,

    /// Date the transaction posted, when the statement shows one
    pub post_date: Option<NaiveDate>,

    /// Description as printed on the statement
    pub description: String,

    /// Amount, signed according to `transaction_type` when it is recognised
    pub amount: f64,

    /// Raw type text from the model, normally "debit" or "credit"
    pub transaction_type: String,

    /// Running balance after this transaction, if printed
    pub balance: Option<f64>,
}

impl TransactionCandidate {
    /// Natural key of this candidate under the given account
    pub fn natural_key(&self, account_last4: &str) -> NaturalKey {
        NaturalKey {
            account_last4: account_last4.to_string(),
            transaction_date: self.transaction_date,
            description: self.description.clone(),
            amount_cents: amount_to_cents(self.amount),
        }
    }
}

/// A validated transaction ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Account holder / product name from the statement
    pub account_name: String,

    /// Last four characters of the account number
    pub account_last4: String,

    /// Date the transaction occurred
    pub transaction_date: NaiveDate,

    /// Date the transaction posted
    pub post_date: Option<NaiveDate>,

    /// Description as printed on the statement
    pub description: String,

    /// Signed amount: negative for debits, positive for credits
    pub amount: f64,

    /// Debit or credit
    pub transaction_type: TransactionType,

    /// Running balance after this transaction
    pub balance: Option<f64>,

    /// Closing date of the statement this row came from
    pub statement_date: NaiveDate,

    /// File name of the source document
    pub source_file: String,
}

impl TransactionRecord {
    /// Natural key used for storage uniqueness
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            account_last4: self.account_last4.clone(),
            transaction_date: self.transaction_date,
            description: self.description.clone(),
            amount_cents: amount_to_cents(self.amount),
        }
    }
}
