//! HTTP error mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use quill_core::ErrorBody;

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Errors surfaced at the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    /// No valid session; redirected to the login page.
    Unauthenticated,
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    /// Server misconfiguration, such as a missing upstream credential.
    Config(String),
    /// The upstream provider rejected the request with this status.
    Upstream { status: u16, message: String },
    /// The upstream provider could not be reached or broke mid-response.
    BadGateway(String),
    Internal(String),
}

impl From<quill_core::Error> for ApiError {
    fn from(err: quill_core::Error) -> Self {
        use quill_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note {} not found", id)),
            Error::Unauthorized(_) => ApiError::Unauthenticated,
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Config(msg) => ApiError::Config(msg),
            Error::Upstream { status, message } => ApiError::Upstream { status, message },
            Error::Stream(msg) | Error::Request(msg) => ApiError::BadGateway(msg),
            Error::Database(e) => ApiError::Internal(e.to_string()),
            Error::Serialization(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl ApiError {
    /// Status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::SEE_OTHER,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthenticated => {
                return (StatusCode::SEE_OTHER, [(header::LOCATION, LOGIN_PATH)]).into_response();
            }
            ApiError::Config(msg) => {
                tracing::error!(error = %msg, "Server misconfigured");
                msg
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "Internal server error".to_string()
            }
            ApiError::Upstream { status, message } => {
                tracing::warn!(upstream_status = status, error = %message, "Upstream error");
                message
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Upstream unavailable");
                msg
            }
            ApiError::Forbidden(msg) | ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg,
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
