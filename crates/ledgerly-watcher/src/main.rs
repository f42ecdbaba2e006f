//! ledgerly-watch - run one scan over the configured watch directories.
//!
//! Exit codes: 0 scan completed, 2 ledger error, 3 configuration error,
//! 4 another scan is running.

use chrono::{Duration, Utc};
use clap::Parser;
use ledgerly_cli::{expand_home, init_logging, parse_args};
use ledgerly_store::ledger::DEFAULT_LEASE_STALE_AFTER_HOURS;
use ledgerly_store::SqliteLedger;
use ledgerly_watcher::{
    default_db_path, load_watch_configs, ExternalRunner, LocalFs, Scanner, WatcherError, EXIT_OK,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Scan watch directories and process new statement files.
#[derive(Debug, Parser)]
#[command(name = "ledgerly-watch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Watch configuration (JSON array)
    #[arg(long)]
    config: PathBuf,

    /// Processing ledger database [default: ~/.ledgerly/watcher.db]
    #[arg(long)]
    db: Option<PathBuf>,

    /// Report what would be processed without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli: Cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => std::process::exit(code),
    };
    init_logging(cli.verbose);
    let code = match run(&cli) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<(), WatcherError> {
    let watches = load_watch_configs(&expand_home(&cli.config))?;
    info!("Loaded {} watch(es)", watches.len());

    let db_path = cli
        .db
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(default_db_path);
    let scanner = Scanner::new(cli.dry_run);
    if scanner.is_dry_run() {
        let mut ledger = SqliteLedger::open_read_only(&db_path)?;
        let metrics = scanner.scan(&watches, &mut ledger, &LocalFs, &mut ExternalRunner)?;
        println!("{}", metrics.summary());
        return Ok(());
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            WatcherError::Ledger(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    let mut ledger = SqliteLedger::new(&db_path)?;

    let holder = format!("ledgerly-watch:{}:{}", std::process::id(), Utc::now().timestamp());
    ledger.acquire_lease(&holder, Duration::hours(DEFAULT_LEASE_STALE_AFTER_HOURS))?;

    let result = scanner.scan(&watches, &mut ledger, &LocalFs, &mut ExternalRunner);
    if let Err(e) = ledger.release_lease(&holder) {
        warn!("Failed to release scan lease: {}", e);
    }

    let metrics = result?;
    println!("{}", metrics.summary());
    Ok(())
}
