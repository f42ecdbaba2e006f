//! Processing outcome and its process exit-code encoding

/// Exit code for a successfully processed file
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for a parse error (inference, decoding, validation)
pub const EXIT_PARSE_ERROR: i32 = 1;

/// Exit code for a storage error
pub const EXIT_STORE_ERROR: i32 = 2;

/// Exit code for a configuration error detected before any work
pub const EXIT_CONFIG_ERROR: i32 = 3;

/// Result of processing one document
///
/// The three-way taxonomy is the contract between the processor and whoever
/// invokes it, in-process or via exit codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Persisted; duplicates by natural key are counted as skipped
    Success {
        /// Rows newly inserted
        inserted: usize,
        /// Rows that already existed
        skipped: usize,
    },

    /// The document could not be turned into a valid statement
    ParseError {
        /// Human-readable cause
        reason: String,
    },

    /// The store could not be opened or written
    StoreError {
        /// Human-readable cause
        reason: String,
    },
}

impl ProcessOutcome {
    /// Whether the file should be considered done
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success { .. })
    }

    /// Exit code a processor binary reports for this outcome
    ///
    /// # Examples
    ///
    /// ```
    /// use ledgerly_domain::ProcessOutcome;
    ///
    /// let outcome = ProcessOutcome::ParseError { reason: "no pages".into() };
    /// assert_eq!(outcome.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessOutcome::Success { .. } => EXIT_SUCCESS,
            ProcessOutcome::ParseError { .. } => EXIT_PARSE_ERROR,
            ProcessOutcome::StoreError { .. } => EXIT_STORE_ERROR,
        }
    }

    /// Rebuild an outcome from a processor's exit code and captured output
    ///
    /// Returns `None` for codes outside the outcome taxonomy (configuration
    /// errors, signals, unknown codes). Success counts are read from the
    /// `inserted=N skipped=M` summary line when present.
    pub fn from_exit_code(code: i32, output: &str) -> Option<Self> {
        match code {
            EXIT_SUCCESS => {
                let (inserted, skipped) = parse_summary_counts(output).unwrap_or((0, 0));
                Some(ProcessOutcome::Success { inserted, skipped })
            }
            EXIT_PARSE_ERROR => Some(ProcessOutcome::ParseError {
                reason: last_line(output),
            }),
            EXIT_STORE_ERROR => Some(ProcessOutcome::StoreError {
                reason: last_line(output),
            }),
            _ => None,
        }
    }
}

fn last_line(output: &str) -> String {
    output
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}

fn parse_summary_counts(output: &str) -> Option<(usize, usize)> {
    for line in output.lines().rev() {
        let mut inserted = None;
        let mut skipped = None;
        for token in line.split_whitespace() {
            if let Some(v) = token.strip_prefix("inserted=") {
                inserted = v.parse().ok();
            } else if let Some(v) = token.strip_prefix("skipped=") {
                skipped = v.parse().ok();
            }
        }
        if let (Some(i), Some(s)) = (inserted, skipped) {
            return Some((i, s));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProcessOutcome::Success { inserted: 1, skipped: 0 }.exit_code(), 0);
        assert_eq!(ProcessOutcome::ParseError { reason: String::new() }.exit_code(), 1);
        assert_eq!(ProcessOutcome::StoreError { reason: String::new() }.exit_code(), 2);
    }

    #[test]
    fn test_from_exit_code_reads_summary() {
        let out = "2025-01-01 INFO starting\nprocessed stmt1.pdf: inserted=10 skipped=2\n";
        assert_eq!(
            ProcessOutcome::from_exit_code(0, out),
            Some(ProcessOutcome::Success { inserted: 10, skipped: 2 })
        );
    }

    #[test]
    fn test_from_exit_code_failure_reason_is_last_line() {
        let out = "warn: page 2 dropped\nerror: no pages parsed\n\n";
        assert_eq!(
            ProcessOutcome::from_exit_code(1, out),
            Some(ProcessOutcome::ParseError { reason: "error: no pages parsed".into() })
        );
    }

    #[test]
    fn test_from_exit_code_outside_taxonomy() {
        assert_eq!(ProcessOutcome::from_exit_code(EXIT_CONFIG_ERROR, ""), None);
        assert_eq!(ProcessOutcome::from_exit_code(-1, ""), None);
    }
}
