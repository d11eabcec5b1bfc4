//! Classification of upstream provider failures.

use quill_core::Error;

use super::types::OpenAIErrorResponse;

/// Provider error categories, used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit or quota exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Prompt too large for the model.
    ContextLengthExceeded,
    /// Provider-side failure.
    ServerError,
    Unknown,
}

impl ProviderErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401, _) | (403, _) => Self::AuthenticationError,
            (429, _) => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationError => "authentication_error",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::ModelNotFound => "model_not_found",
            Self::ContextLengthExceeded => "context_length_exceeded",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
        }
    }
}

/// Build an [`Error::Upstream`] from a non-success status and its body.
///
/// The provider's own message is used when the body is a standard error
/// object; otherwise the raw body (or the status alone) is kept.
pub fn upstream_error(status: u16, body: &str) -> (Error, ProviderErrorCode) {
    let (message, error_type) = match serde_json::from_str::<OpenAIErrorResponse>(body) {
        Ok(parsed) => {
            let kind = parsed
                .error
                .code
                .or(parsed.error.error_type)
                .unwrap_or_default();
            (parsed.error.message, kind)
        }
        Err(_) if body.trim().is_empty() => (format!("HTTP {}", status), String::new()),
        Err(_) => (body.trim().to_string(), String::new()),
    };
    let code = ProviderErrorCode::from_response(status, &error_type);
    (Error::Upstream { status, message }, code)
}
