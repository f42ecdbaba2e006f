//! One pass over every configured watch
//!
//! Per file:
//!
//! ```text
//! discovered → skip (in ledger) | eligible → run → exit 0  → move → ledger row
//!                                                → exit ≠0 → left in place
//! ```
//!
//! A ledger row is written only after the file has been moved, so a failed
//! run or a failed move is retried on the next scan.

use crate::config::WatchConfig;
use crate::error::WatcherError;
use crate::fs::WatchFs;
use crate::metrics::ScanMetrics;
use crate::runner::WatchRunner;
use ledgerly_domain::traits::ProcessingLedger;
use ledgerly_domain::ProcessOutcome;
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Scans watches and dispatches eligible files
#[derive(Debug, Default, Clone)]
pub struct Scanner {
    dry_run: bool,
}

impl Scanner {
    /// Create a scanner; a dry run never runs, moves or records anything
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Whether this is a dry run
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Scan every watch in order
    ///
    /// Only ledger failures abort the scan. Everything else is logged,
    /// counted in [`ScanMetrics::errors`] and left for the next run.
    pub fn scan<L, F, R>(
        &self,
        watches: &[WatchConfig],
        ledger: &mut L,
        fs: &F,
        runner: &mut R,
    ) -> Result<ScanMetrics, WatcherError>
    where
        L: ProcessingLedger,
        L::Error: Display,
        F: WatchFs,
        R: WatchRunner,
    {
        let mut metrics = ScanMetrics::new();
        for watch in watches {
            metrics.watches_scanned += 1;
            self.scan_watch(watch, ledger, fs, runner, &mut metrics)?;
        }
        info!(
            "Scan complete: processed={} errors={} skipped={}",
            metrics.processed, metrics.errors, metrics.skipped
        );
        Ok(metrics)
    }

    fn scan_watch<L, F, R>(
        &self,
        watch: &WatchConfig,
        ledger: &mut L,
        fs: &F,
        runner: &mut R,
        metrics: &mut ScanMetrics,
    ) -> Result<(), WatcherError>
    where
        L: ProcessingLedger,
        L::Error: Display,
        F: WatchFs,
        R: WatchRunner,
    {
        let files = match fs.list_matching(&watch.watch_path, &watch.file_pattern) {
            Ok(files) => files,
            Err(e) => {
                error!(
                    "Watch {}: cannot list {}: {}",
                    watch.watch_id,
                    watch.watch_path.display(),
                    e
                );
                metrics.errors += 1;
                return Ok(());
            }
        };
        debug!("Watch {}: {} matching file(s)", watch.watch_id, files.len());

        for file in files {
            metrics.discovered += 1;
            let key = ledger_key(&file);

            let done = ledger
                .is_processed(&watch.watch_id, &key)
                .map_err(|e| WatcherError::Ledger(e.to_string()))?;
            if done {
                debug!("Watch {}: {} already processed", watch.watch_id, key);
                metrics.skipped += 1;
                continue;
            }
            metrics.eligible += 1;

            if self.dry_run {
                info!("Watch {}: would process {}", watch.watch_id, file.display());
                metrics.would_process.push(file);
                continue;
            }

            self.process_file(watch, &file, &key, ledger, fs, runner, metrics)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn process_file<L, F, R>(
        &self,
        watch: &WatchConfig,
        file: &Path,
        key: &str,
        ledger: &mut L,
        fs: &F,
        runner: &mut R,
        metrics: &mut ScanMetrics,
    ) -> Result<(), WatcherError>
    where
        L: ProcessingLedger,
        L::Error: Display,
        F: WatchFs,
        R: WatchRunner,
    {
        info!("Watch {}: processing {}", watch.watch_id, file.display());
        let report = runner.run(watch, file);
        match report.outcome() {
            Some(ProcessOutcome::Success { inserted, skipped }) => info!(
                "Watch {}: {} inserted={} skipped={}",
                watch.watch_id,
                file.display(),
                inserted,
                skipped
            ),
            Some(failure) => {
                let kind = match failure {
                    ProcessOutcome::StoreError { .. } => "store error",
                    _ => "parse error",
                };
                error!(
                    "Watch {}: {} failed with {} (exit code {}):\n{}",
                    watch.watch_id,
                    file.display(),
                    kind,
                    report.exit_code,
                    report.output.trim_end()
                );
                metrics.errors += 1;
                return Ok(());
            }
            None => {
                error!(
                    "Watch {}: {} failed with exit code {}:\n{}",
                    watch.watch_id,
                    file.display(),
                    report.exit_code,
                    report.output.trim_end()
                );
                metrics.errors += 1;
                return Ok(());
            }
        }

        let moved = match fs.move_into(file, &watch.processed_path) {
            Ok(moved) => moved,
            Err(e) => {
                warn!(
                    "Watch {}: processed {} but could not move it to {}: {}",
                    watch.watch_id,
                    file.display(),
                    watch.processed_path.display(),
                    e
                );
                metrics.errors += 1;
                return Ok(());
            }
        };

        ledger
            .record_processed(&watch.watch_id, key)
            .map_err(|e| WatcherError::Ledger(e.to_string()))?;
        info!("Watch {}: {} moved to {}", watch.watch_id, key, moved.display());
        metrics.processed += 1;
        Ok(())
    }
}

/// Ledger identity of a file: its name within the watch directory
fn ledger_key(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}
