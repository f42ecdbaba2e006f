//! ledgerly-process - ingest one statement document into the transaction store.
//!
//! Exit codes: 0 success, 1 parse error, 2 store error, 3 configuration error.

use clap::Parser;
use ledgerly_cli::{init_logging, parse_args};
use ledgerly_domain::traits::DocumentProcessor;
use ledgerly_domain::ProcessOutcome;
use ledgerly_llm::OllamaProvider;
use ledgerly_processor::{Processor, ProcessorConfig, Result};
use ledgerly_store::SqliteStore;
use std::path::PathBuf;
use tracing::{debug, error};

/// Parse a bank statement and store its transactions.
#[derive(Debug, Parser)]
#[command(name = "ledgerly-process")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Statement document (.pdf or .txt)
    file: PathBuf,

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
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<ProcessOutcome> {
    let config = ProcessorConfig::load()?;
    debug!("Using model {} at {}", config.model, config.ollama_url);

    let llm = OllamaProvider::with_timeout(&config.ollama_url, &config.model, config.llm_timeout())?
        .with_max_retries(config.llm_max_retries);
    let store = SqliteStore::new(config.db_path()?)?;

    let mut processor = Processor::new(llm, store, config.extractor.clone());
    let outcome = processor.process(&cli.file);

    match &outcome {
        ProcessOutcome::Success { inserted, skipped } => {
            println!(
                "processed {}: inserted={} skipped={}",
                cli.file.display(),
                inserted,
                skipped
            );
        }
        ProcessOutcome::ParseError { reason } => eprintln!("Error: parse failed: {}", reason),
        ProcessOutcome::StoreError { reason } => eprintln!("Error: store failed: {}", reason),
    }

    Ok(outcome)
}
