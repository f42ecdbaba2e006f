//! Counters collected during one scan

use std::path::PathBuf;

/// Metrics for a single scan across all watches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Watches visited
    pub watches_scanned: usize,

    /// Files matching a watch pattern
    pub discovered: usize,

    /// Matches already recorded in the ledger
    pub skipped: usize,

    /// Matches not yet in the ledger
    pub eligible: usize,

    /// Files processed, moved and recorded
    pub processed: usize,

    /// Per-file and per-watch failures; each is retried next scan
    pub errors: usize,

    /// Files a dry run would have processed
    pub would_process: Vec<PathBuf>,
}

impl ScanMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Scan Summary".to_string(),
            "============".to_string(),
            format!("Watches scanned: {}", self.watches_scanned),
            format!("Discovered: {}", self.discovered),
            format!("Already processed: {}", self.skipped),
            format!("Eligible: {}", self.eligible),
            format!("Processed: {}", self.processed),
            format!("Errors: {}", self.errors),
        ];

        if !self.would_process.is_empty() {
            lines.push(String::new());
            lines.push("Would process:".to_string());
            for file in &self.would_process {
                lines.push(format!("  {}", file.display()));
            }
        }

        lines.join("\n")
    }
}
