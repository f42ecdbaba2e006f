//! Watch configuration
//!
//! The configuration file is a JSON array of watch objects:
//!
//! ```json
//! [
//!   {
//!     "watch_id": "checking",
//!     "watch_path": "/statements/inbox",
//!     "file_pattern": "*.pdf",
//!     "executable_path": "/usr/local/bin/ledgerly-process",
//!     "processed_path": "/statements/done"
//!   }
//! ]
//! ```
//!
//! Loading is all-or-nothing: the first problem rejects the whole file so
//! that no watch is ever partially activated.

use crate::error::WatcherError;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Unique identifier, also the ledger namespace
    pub watch_id: String,

    /// Directory scanned (non-recursively)
    pub watch_path: PathBuf,

    /// Glob matched against file names
    pub file_pattern: String,

    /// Processor invoked once per eligible file
    pub executable_path: PathBuf,

    /// Directory successfully processed files are moved into
    pub processed_path: PathBuf,
}

/// Load and validate the watch configuration file
pub fn load_watch_configs(path: &Path) -> Result<Vec<WatchConfig>, WatcherError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| WatcherError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    parse_watch_configs(&contents)
}

/// Parse and validate watch configuration JSON
pub fn parse_watch_configs(json: &str) -> Result<Vec<WatchConfig>, WatcherError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| WatcherError::Config(format!("Invalid JSON: {}", e)))?;
    let entries = value
        .as_array()
        .ok_or_else(|| WatcherError::Config("Expected a JSON array of watches".to_string()))?;

    let mut seen_ids = HashSet::new();
    let mut watches = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let obj = entry
            .as_object()
            .ok_or_else(|| WatcherError::Config(format!("watch #{} is not an object", index)))?;

        let field = |name: &str| -> Result<String, WatcherError> {
            obj.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    WatcherError::Config(format!("watch #{}: missing field {}", index, name))
                })
        };

        // Checked in this order; the first missing field is reported
        let watch_id = field("watch_id")?;
        let watch_path = field("watch_path")?;
        let file_pattern = field("file_pattern")?;
        let executable_path = field("executable_path")?;
        let processed_path = field("processed_path")?;

        if !seen_ids.insert(watch_id.clone()) {
            return Err(WatcherError::Config(format!(
                "watch #{}: duplicate watch_id {}",
                index, watch_id
            )));
        }
        glob::Pattern::new(&file_pattern).map_err(|e| {
            WatcherError::Config(format!(
                "watch {}: invalid file_pattern {:?}: {}",
                watch_id, file_pattern, e
            ))
        })?;

        watches.push(WatchConfig {
            watch_id,
            watch_path: PathBuf::from(watch_path),
            file_pattern,
            executable_path: PathBuf::from(executable_path),
            processed_path: PathBuf::from(processed_path),
        });
    }

    Ok(watches)
}
