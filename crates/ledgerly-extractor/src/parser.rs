//! Parse LLM output into a statement envelope and transaction candidates

use crate::dates::parse_date;
use crate::error::ExtractorError;
use chrono::NaiveDate;
use ledgerly_domain::{StatementEnvelope, TransactionCandidate, TransactionType};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    account_name: Option<String>,
    #[serde(default)]
    account_last4: Option<String>,
    #[serde(default)]
    statement_date: Option<String>,
    transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    transaction_date: String,
    #[serde(default)]
    post_date: Option<String>,
    description: String,
    amount: AmountValue,
    transaction_type: String,
    #[serde(default)]
    balance: Option<AmountValue>,
}

/// Models emit amounts either as JSON numbers or as printed currency
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AmountValue {
    Number(f64),
    Text(String),
}

impl AmountValue {
    fn to_f64(&self, field: &str) -> Result<f64, ExtractorError> {
        match self {
            AmountValue::Number(n) => Ok(*n),
            AmountValue::Text(s) => parse_amount(s).ok_or_else(|| {
                ExtractorError::InvalidFormat(format!("{} is not an amount: {:?}", field, s))
            }),
        }
    }
}

/// Parse a printed currency amount
///
/// Accepts `$`, thousands separators, a leading minus, and accounting
/// parentheses for negatives.
///
/// # Examples
///
/// ```
/// use ledgerly_extractor::parse_amount;
///
/// assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
/// assert_eq!(parse_amount("(50.00)"), Some(-50.0));
/// assert_eq!(parse_amount("n/a"), None);
/// ```
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '$', '"'], "");
    let s = s.trim();
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => inner.trim().parse::<f64>().ok().map(|v| -v),
        None => s.parse::<f64>().ok(),
    };
    value.filter(|v| v.is_finite())
}

/// Decode one page's response into its envelope and candidates
///
/// Any schema violation fails the whole page.
pub fn parse_page_response(
    response: &str,
) -> Result<(StatementEnvelope, Vec<TransactionCandidate>), ExtractorError> {
    let json_str = extract_json(response)?;
    let page: PageResponse = serde_json::from_str(json_str)?;

    let envelope = StatementEnvelope {
        account_name: page.account_name.unwrap_or_default().trim().to_string(),
        account_last4: page.account_last4.unwrap_or_default().trim().to_string(),
        statement_date: optional_date(page.statement_date.as_deref(), "statement_date")?,
    };

    let transactions = page
        .transactions
        .into_iter()
        .map(to_candidate)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((envelope, transactions))
}

fn to_candidate(tx: TransactionResponse) -> Result<TransactionCandidate, ExtractorError> {
    let transaction_date = parse_date(&tx.transaction_date)
        .ok_or_else(|| ExtractorError::Date(tx.transaction_date.clone()))?;
    let post_date = optional_date(tx.post_date.as_deref(), "post_date")?;

    let raw_amount = tx.amount.to_f64("amount")?;
    // Unrecognised types keep the raw sign; the validator rejects them
    let amount = match TransactionType::parse(&tx.transaction_type) {
        Some(t) => t.signed(raw_amount),
        None => raw_amount,
    };

    let balance = tx.balance.as_ref().map(|b| b.to_f64("balance")).transpose()?;

    Ok(TransactionCandidate {
        transaction_date,
        post_date,
        description: tx.description.trim().to_string(),
        amount,
        transaction_type: tx.transaction_type.trim().to_string(),
        balance,
    })
}

/// Null or blank means absent; anything else must parse
fn optional_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ExtractorError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| ExtractorError::Date(format!("{}: {}", field, s))),
    }
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the info string ("json") on the opening fence line
        let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body).trim();
        if body.is_empty() {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        Ok(body)
    } else {
        Ok(trimmed)
    }
}
