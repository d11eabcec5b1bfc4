//! OpenAI-compatible summary backend.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use quill_core::defaults::{
    SUMMARY_MODEL, SUMMARY_SYSTEM_PROMPT, UPSTREAM_CONNECT_TIMEOUT_SECS,
    UPSTREAM_IDLE_TIMEOUT_SECS, UPSTREAM_TIMEOUT_SECS,
};
use quill_core::{Error, Result};

use super::error::upstream_error;
use super::streaming::parse_sse_stream;
use super::types::ChatCompletionRequest;
use crate::summary::{DeltaStream, SummaryBackend};

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Message returned when no credential is configured.
pub const MISSING_KEY_MESSAGE: &str = "OpenAI API key is missing";

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key. Summaries fail with a configuration error while this is unset.
    pub api_key: Option<String>,
    /// Chat model used for summaries.
    pub model: String,
    /// Bound on waiting for response headers, in seconds.
    pub timeout_seconds: u64,
    /// Bound on establishing the connection, in seconds.
    pub connect_timeout_seconds: u64,
    /// Bound on the gap between body chunks, in seconds.
    pub idle_timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: SUMMARY_MODEL.to_string(),
            timeout_seconds: UPSTREAM_TIMEOUT_SECS,
            connect_timeout_seconds: UPSTREAM_CONNECT_TIMEOUT_SECS,
            idle_timeout_seconds: UPSTREAM_IDLE_TIMEOUT_SECS,
        }
    }
}

impl OpenAIConfig {
    /// Read configuration from the environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `OPENAI_API_KEY` | unset |
    /// | `OPENAI_GEN_MODEL` | `gpt-3.5-turbo` |
    /// | `OPENAI_TIMEOUT` | 30 |
    /// | `OPENAI_CONNECT_TIMEOUT` | 10 |
    /// | `OPENAI_STREAM_IDLE_TIMEOUT` | 30 |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |name: &str, fallback: u64| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(fallback)
        };
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("OPENAI_GEN_MODEL").unwrap_or(defaults.model),
            timeout_seconds: secs("OPENAI_TIMEOUT", defaults.timeout_seconds),
            connect_timeout_seconds: secs(
                "OPENAI_CONNECT_TIMEOUT",
                defaults.connect_timeout_seconds,
            ),
            idle_timeout_seconds: secs("OPENAI_STREAM_IDLE_TIMEOUT", defaults.idle_timeout_seconds),
        }
    }

    /// The configured key, if it is non-blank.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Streams summaries from an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new backend with the given configuration.
    ///
    /// A missing key is not an error here; it is reported per request so the
    /// server can still start and serve notes.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        if config.usable_api_key().is_none() {
            warn!(
                subsystem = "inference",
                "OPENAI_API_KEY is not set; summarize requests will fail"
            );
        }
        info!(
            subsystem = "inference",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing OpenAI summary backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummaryBackend for OpenAIBackend {
    #[instrument(skip(self, text), fields(subsystem = "inference", component = "openai", op = "stream_summary", model = %self.config.model, prompt_len = text.len()))]
    async fn stream_summary(&self, text: &str) -> Result<DeltaStream> {
        let api_key = self
            .config
            .usable_api_key()
            .ok_or_else(|| Error::Config(MISSING_KEY_MESSAGE.to_string()))?;

        let request =
            ChatCompletionRequest::streaming_summary(&self.config.model, SUMMARY_SYSTEM_PROMPT, text);
        let start = Instant::now();

        let send = self
            .client
            .post(self.completions_url())
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&request)
            .send();

        let header_timeout = Duration::from_secs(self.config.timeout_seconds);
        let response = tokio::time::timeout(header_timeout, send)
            .await
            .map_err(|_| {
                Error::Request(format!(
                    "Upstream did not respond within {}s",
                    self.config.timeout_seconds
                ))
            })?
            .map_err(|e| Error::Request(format!("Upstream request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (err, code) = upstream_error(status.as_u16(), &body);
            warn!(
                upstream_status = status.as_u16(),
                error_code = code.as_str(),
                retryable = code.is_retryable(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Upstream rejected summary request"
            );
            return Err(err);
        }

        debug!(
            upstream_status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Upstream summary stream opened"
        );

        let idle = Duration::from_secs(self.config.idle_timeout_seconds);
        Ok(parse_sse_stream(response.bytes_stream(), Some(idle)))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
