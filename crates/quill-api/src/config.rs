//! Server configuration read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use quill_core::defaults::SSE_KEEPALIVE_SECS;
use quill_inference::OpenAIConfig;

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is unset or blank.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Console/file log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration.
///
/// | Variable | Meaning |
/// |----------|---------|
/// | `LOG_FORMAT` | `json` or `text` (default `text`) |
/// | `LOG_FILE` | path of a daily-rolling log file; stdout when unset |
/// | `LOG_ANSI` | `true`/`false` override for ANSI colors |
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    pub ansi: Option<bool>,
}

/// Everything `main` needs to assemble the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL. Notes live in memory when unset.
    pub database_url: Option<String>,
    pub openai: OpenAIConfig,
    pub sse_keepalive: Duration,
    /// Raw `QUILL_SESSIONS` table, `token=user-uuid` pairs separated by commas.
    pub sessions: String,
    pub allowed_origins: Vec<HeaderValue>,
    pub log: LogConfig,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok());
        config.openai = OpenAIConfig::from_env();
        config
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Provider settings are left at their defaults; [`ServerConfig::from_env`]
    /// fills them from the environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_blank("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = non_blank("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(3000);
        let sse_keepalive_secs = non_blank("SSE_KEEPALIVE_SECS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(SSE_KEEPALIVE_SECS);

        let format = match non_blank("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            host,
            port,
            database_url: non_blank("DATABASE_URL"),
            openai: OpenAIConfig::default(),
            sse_keepalive: Duration::from_secs(sse_keepalive_secs),
            sessions: lookup("QUILL_SESSIONS").unwrap_or_default(),
            allowed_origins: parse_allowed_origins(
                &lookup("ALLOWED_ORIGINS").unwrap_or_default(),
            ),
            log: LogConfig {
                format,
                file: non_blank("LOG_FILE").map(PathBuf::from),
                ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
            },
        }
    }

    /// Address to bind.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Parse a comma-separated origin list, dropping entries that are not valid
/// header values. Blank input yields [`DEFAULT_ALLOWED_ORIGINS`].
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    let origins = if origins.trim().is_empty() {
        DEFAULT_ALLOWED_ORIGINS
    } else {
        origins
    };

    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
