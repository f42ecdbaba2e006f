//! Prompt for per-page statement parsing

use tracing::warn;

/// Builds the structured-completion prompt for one statement page
pub struct PromptBuilder<'a> {
    text: &'a str,
    page_number: Option<u32>,
    max_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for the given page text
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self {
            text,
            page_number: None,
            max_chars,
        }
    }

    /// Mention the page number in the prompt
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(PAGE_INSTRUCTIONS.len() + self.text.len() + 256);

        prompt.push_str(PAGE_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(n) = self.page_number {
            prompt.push_str(&format!("This is page {} of the statement.\n\n", n));
        }

        let (text, dropped) = truncate_chars(self.text, self.max_chars);
        if dropped > 0 {
            match self.page_number {
                Some(n) => warn!(
                    "Page {}: dropped {} character(s) past max_page_chars={}",
                    n, dropped, self.max_chars
                ),
                None => warn!(
                    "Dropped {} character(s) past max_page_chars={}",
                    dropped, self.max_chars
                ),
            }
        }

        prompt.push_str("Statement page text:\n---\n");
        prompt.push_str(text);
        prompt.push_str("\n---\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

/// Truncate at a character boundary, returning the kept text and how many
/// characters were dropped
fn truncate_chars(text: &str, max_chars: usize) -> (&str, usize) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], text[idx..].chars().count()),
        None => (text, 0),
    }
}

const PAGE_INSTRUCTIONS: &str = r#"You are extracting transactions from one page of a bank or credit card statement.

Return a single JSON object with exactly these fields:

{
  "account_name": string,        // account holder or product name; "" if not on this page
  "account_last4": string,       // last 4 digits of the account number; "" if not on this page
  "statement_date": string|null, // statement closing date, YYYY-MM-DD
  "transactions": [
    {
      "transaction_date": string,  // YYYY-MM-DD
      "post_date": string|null,    // YYYY-MM-DD
      "description": string,       // exactly as printed
      "amount": number,            // positive magnitude
      "transaction_type": "debit" | "credit",
      "balance": number|null       // running balance if printed
    }
  ]
}

Rules:
- Debits are money leaving the account (purchases, fees, withdrawals).
- Credits are money entering the account (deposits, payments, refunds).
- Include only individual transactions, not totals or summaries.
- If the page has no transactions, return an empty "transactions" array."#;

const OUTPUT_FORMAT_REMINDER: &str = "Respond with the JSON object only.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_page_text() {
        let prompt = PromptBuilder::new("01/02 COFFEE 4.50", 1000)
            .with_page_number(2)
            .build();
        assert!(prompt.contains("01/02 COFFEE 4.50"));
        assert!(prompt.contains("page 2"));
        assert!(prompt.contains("\"transactions\""));
    }

    #[test]
    fn test_long_page_is_truncated() {
        let text = "é".repeat(50);
        let prompt = PromptBuilder::new(&text, 10).build();
        assert!(prompt.contains(&"é".repeat(10)));
        assert!(!prompt.contains(&"é".repeat(11)));
    }

    #[test]
    fn test_truncation_reports_dropped_chars() {
        assert_eq!(truncate_chars("abcdef", 4), ("abcd", 2));
        assert_eq!(truncate_chars("éé", 2), ("éé", 0));
        assert_eq!(truncate_chars("", 0), ("", 0));
    }
}
