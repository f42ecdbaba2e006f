//! Shared command-line plumbing for the ledgerly binaries
//!
//! Both binaries accept Go-style single-dash long flags, log to stderr, and
//! report usage errors as configuration errors (exit 3) rather than clap's
//! default exit 2, which the binaries reserve for storage failures.

#![warn(missing_docs)]

use clap::error::ErrorKind;
use clap::Parser;
use ledgerly_domain::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Parse command-line arguments, or the exit code to stop with
///
/// `--help` and `--version` print and yield 0; any usage error prints and
/// yields [`EXIT_CONFIG_ERROR`].
pub fn parse_args<C, I>(args: I) -> Result<C, i32>
where
    C: Parser,
    I: IntoIterator<Item = OsString>,
{
    C::try_parse_from(normalize_args(args)).map_err(|e| {
        // Printing only fails if stdout/stderr are gone
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => EXIT_SUCCESS,
            _ => EXIT_CONFIG_ERROR,
        }
    })
}

/// Rewrite Go-style single-dash long flags (`-config x`) to `--config x`
///
/// Short flags (`-h`), negative numbers and anything after a bare `--` are
/// left alone, as is the program name.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || passthrough {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                passthrough = true;
                return arg;
            }
            let is_single_dash_long = s.len() > 2
                && s.starts_with('-')
                && !s.starts_with("--")
                && s[1..].starts_with(|c: char| c.is_ascii_alphabetic());
            if is_single_dash_long {
                OsString::from(format!("-{}", s))
            } else {
                arg
            }
        })
        .collect()
}

/// Install the stderr log subscriber
///
/// `verbose` raises the default level to debug; `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
