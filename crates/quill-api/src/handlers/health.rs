//! Liveness and login landing endpoints.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use quill_core::ErrorBody;

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Target of unauthenticated redirects.
///
/// Sign-in itself happens with the external identity provider, which issues
/// the session token clients send back as a bearer token.
pub async fn login_required() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: "Authentication required".to_string(),
        }),
    )
}
