//! Processor configuration
//!
//! Resolved in three layers: built-in defaults, an optional TOML file named
//! by `LEDGERLY_CONFIG`, then individual environment variables.

use crate::error::{ProcessorError, Result};
use ledgerly_cli::expand_home;
use ledgerly_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path of an optional TOML configuration file
pub const ENV_CONFIG: &str = "LEDGERLY_CONFIG";
/// Transaction store database path
pub const ENV_DB_PATH: &str = "LEDGERLY_DB_PATH";
/// Inference service endpoint
pub const ENV_OLLAMA_URL: &str = "LEDGERLY_OLLAMA_URL";
/// Inference model name
pub const ENV_MODEL: &str = "LEDGERLY_MODEL";
/// Per-request inference timeout in seconds
pub const ENV_LLM_TIMEOUT_SECS: &str = "LEDGERLY_LLM_TIMEOUT_SECS";
/// Attempts per inference request
pub const ENV_LLM_MAX_RETRIES: &str = "LEDGERLY_LLM_MAX_RETRIES";

/// Configuration for one processor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Transaction store database; required
    pub db_path: Option<PathBuf>,

    /// Inference service endpoint
    pub ollama_url: String,

    /// Model used for page parsing
    pub model: String,

    /// Per-request inference timeout (seconds)
    pub llm_timeout_secs: u64,

    /// Attempts per inference request
    pub llm_max_retries: u32,

    /// Page extraction and prompting
    pub extractor: ExtractorConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            llm_timeout_secs: 120,
            llm_max_retries: 3,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Resolve configuration from the process environment
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::from_env_map(&vars)
    }

    /// Resolve configuration from an explicit variable map
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = match non_empty(vars, ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_env(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ProcessorError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ProcessorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        if let Some(v) = non_empty(vars, ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(vars, ENV_OLLAMA_URL) {
            self.ollama_url = v.to_string();
        }
        if let Some(v) = non_empty(vars, ENV_MODEL) {
            self.model = v.to_string();
        }
        if let Some(v) = non_empty(vars, ENV_LLM_TIMEOUT_SECS) {
            self.llm_timeout_secs = parse_number(ENV_LLM_TIMEOUT_SECS, v)?;
        }
        if let Some(v) = non_empty(vars, ENV_LLM_MAX_RETRIES) {
            self.llm_max_retries = parse_number(ENV_LLM_MAX_RETRIES, v)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.db_path.is_none() {
            return Err(ProcessorError::Config(format!("{} is not set", ENV_DB_PATH)));
        }
        if self.ollama_url.trim().is_empty() {
            return Err(ProcessorError::Config("ollama_url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ProcessorError::Config("model must not be empty".to_string()));
        }
        if self.llm_timeout_secs == 0 {
            return Err(ProcessorError::Config(
                "llm_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm_max_retries == 0 {
            return Err(ProcessorError::Config(
                "llm_max_retries must be greater than 0".to_string(),
            ));
        }
        self.extractor.validate()?;
        Ok(())
    }

    /// Database path with `~` expanded
    pub fn db_path(&self) -> Result<PathBuf> {
        self.db_path
            .as_deref()
            .map(expand_home)
            .ok_or_else(|| ProcessorError::Config(format!("{} is not set", ENV_DB_PATH)))
    }

    /// Get the inference timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ProcessorError::Config(format!("{} must be a number, got {:?}", key, value)))
}
