//! Ollama Provider Implementation
//!
//! Talks to a locally hosted Ollama instance using its JSON mode
//! (`format: "json"`), so each completion is a single JSON document.
//!
//! # Features
//!
//! - Reachability check (`GET /`) before generation
//! - Configurable endpoint and model
//! - Bounded retry with exponential backoff for transport errors and 5xx
//! - Per-request timeout
//!
//! # Examples
//!
//! ```no_run
//! use ledgerly_llm::OllamaProvider;
//! use ledgerly_domain::traits::LlmProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1").unwrap();
//! provider.health_check().unwrap();
//! let json = provider.generate_structured("Return {\"ok\": true}").unwrap();
//! ```

use crate::LlmError;
use ledgerly_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for generation requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Timeout for the reachability check
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Default number of attempts per generation
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_backoff: Duration,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the default request timeout
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        // Connections must not outlive the per-call runtime used by the sync wrapper
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_secs(1),
        })
    }

    /// Create a new Ollama provider on the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts per generation (minimum 1)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the base delay between attempts; it doubles after each failure
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the Ollama server answers at all
    pub async fn check_reachable(&self) -> Result<(), LlmError> {
        let url = format!("{}/", self.endpoint);
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| LlmError::Unreachable(format!("{}: {}", self.endpoint, e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::Unreachable(format!(
                "{} answered HTTP {}",
                self.endpoint,
                response.status()
            )))
        }
    }

    /// Generate one JSON document using the Ollama API
    ///
    /// The request carries `format: "json"`, which constrains the model to
    /// emit a single JSON document.
    ///
    /// # Errors
    ///
    /// - `ModelNotAvailable` on HTTP 404 (not retried)
    /// - `InvalidResponse` if the envelope cannot be decoded (not retried)
    /// - `Communication` once all attempts failed
    pub async fn generate_async(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return match response.json::<OllamaGenerateResponse>().await {
                            Ok(ollama_response) => {
                                debug!(
                                    "Ollama returned {} chars (attempt {})",
                                    ollama_response.response.len(),
                                    attempts + 1
                                );
                                Ok(ollama_response.response)
                            }
                            Err(e) => Err(LlmError::InvalidResponse(format!(
                                "Failed to parse response: {}",
                                e
                            ))),
                        };
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = self.retry_backoff * 2u32.pow(attempts - 1);
                warn!(
                    "Ollama attempt {}/{} failed, retrying in {:?}",
                    attempts, self.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    /// Drive a future to completion on a fresh single-threaded runtime
    fn block_on<F, T>(&self, future: F) -> Result<T, LlmError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
        runtime.block_on(future)
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn health_check(&self) -> Result<(), Self::Error> {
        self.block_on(self.check_reachable())
    }

    fn generate_structured(&self, prompt: &str) -> Result<String, Self::Error> {
        self.block_on(self.generate_async(prompt))
    }
}
