//! Ledgerly Watch Scanner
//!
//! Finds new statement files in configured directories, hands each one to a
//! document processor, and moves the successes aside. A
//! [`ProcessingLedger`](ledgerly_domain::traits::ProcessingLedger) remembers
//! which files are done so that repeated scans are idempotent.
//!
//! # Example Usage
//!
//! ```no_run
//! use ledgerly_store::SqliteLedger;
//! use ledgerly_watcher::{load_watch_configs, ExternalRunner, LocalFs, Scanner};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let watches = load_watch_configs(Path::new("watches.json"))?;
//! let mut ledger = SqliteLedger::new("watcher.db")?;
//!
//! let metrics = Scanner::new(false).scan(&watches, &mut ledger, &LocalFs, &mut ExternalRunner)?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fs;
pub mod metrics;
pub mod runner;
pub mod scanner;

pub use config::{load_watch_configs, parse_watch_configs, WatchConfig};
pub use error::WatcherError;
pub use fs::{LocalFs, WatchFs};
pub use metrics::ScanMetrics;
pub use runner::{ExternalRunner, InProcessRunner, RunReport, WatchRunner};
pub use scanner::Scanner;

use std::path::PathBuf;

/// The scan ran to completion, whether or not individual files failed
pub const EXIT_OK: i32 = 0;
/// The processing ledger could not be opened, read or written
pub const EXIT_LEDGER_ERROR: i32 = 2;
/// The watch configuration is missing or invalid
pub const EXIT_CONFIG_ERROR: i32 = 3;
/// Another scan holds the run lease
pub const EXIT_LEASE_HELD: i32 = 4;

/// Default ledger database: `~/.ledgerly/watcher.db`
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ledgerly")
        .join("watcher.db")
}

impl WatcherError {
    /// Exit code the `ledgerly-watch` binary reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            WatcherError::Config(_) => EXIT_CONFIG_ERROR,
            WatcherError::Ledger(_) => EXIT_LEDGER_ERROR,
            WatcherError::LeaseHeld(_) => EXIT_LEASE_HELD,
        }
    }
}
