//! Invoking the document processor for one file

use crate::config::WatchConfig;
use ledgerly_domain::traits::DocumentProcessor;
use ledgerly_domain::ProcessOutcome;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Exit code reported when the processor could not be run or was killed
pub const EXIT_NOT_RUN: i32 = -1;

/// What one processor invocation reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Process exit code
    pub exit_code: i32,

    /// Combined stdout and stderr
    pub output: String,
}

impl RunReport {
    /// Outcome decoded from the exit code, if it is one the processor defines
    pub fn outcome(&self) -> Option<ProcessOutcome> {
        ProcessOutcome::from_exit_code(self.exit_code, &self.output)
    }
}

/// Runs the processor configured for a watch
pub trait WatchRunner {
    /// Process `file` and report how it went
    fn run(&mut self, watch: &WatchConfig, file: &Path) -> RunReport;
}

/// Runs `executable_path` as a subprocess with the file as its only argument
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalRunner;

impl WatchRunner for ExternalRunner {
    fn run(&mut self, watch: &WatchConfig, file: &Path) -> RunReport {
        debug!("Running {} {}", watch.executable_path.display(), file.display());
        match Command::new(&watch.executable_path).arg(file).output() {
            Ok(out) => {
                let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&out.stderr));
                RunReport {
                    exit_code: out.status.code().unwrap_or(EXIT_NOT_RUN),
                    output,
                }
            }
            Err(e) => RunReport {
                exit_code: EXIT_NOT_RUN,
                output: format!("failed to start {}: {}", watch.executable_path.display(), e),
            },
        }
    }
}

/// Runs a [`DocumentProcessor`] inside the scanner process
///
/// The watch's `executable_path` is ignored.
pub struct InProcessRunner<P> {
    processor: P,
}

impl<P: DocumentProcessor> InProcessRunner<P> {
    /// Wrap a processor
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    /// Borrow the wrapped processor
    pub fn processor(&self) -> &P {
        &self.processor
    }
}

impl<P: DocumentProcessor> WatchRunner for InProcessRunner<P> {
    fn run(&mut self, _watch: &WatchConfig, file: &Path) -> RunReport {
        let outcome = self.processor.process(file);
        let output = match &outcome {
            ProcessOutcome::Success { inserted, skipped } => format!(
                "processed {}: inserted={} skipped={}",
                file.display(),
                inserted,
                skipped
            ),
            ProcessOutcome::ParseError { reason } | ProcessOutcome::StoreError { reason } => {
                reason.clone()
            }
        };
        RunReport {
            exit_code: outcome.exit_code(),
            output,
        }
    }
}
