//! # quill-api
//!
//! HTTP API for quill: note CRUD, streamed summaries, and tag suggestions.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /health` | liveness |
//! | `GET /login` | landing target for unauthenticated redirects |
//! | `GET, POST /notes` | list / create |
//! | `GET, PUT, DELETE /notes/:id` | read / update / delete |
//! | `GET /notes/:id/summarize` | SSE summary stream |
//! | `POST /tags` | keyword tags for form field `content` |

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod services;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use error::ApiError;
pub use state::AppState;

use handlers::{health, notes, summarize, tags};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Routes only, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/login", get(health::login_required))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/notes/:id/summarize", get(summarize::summarize_note))
        .route("/tags", post(tags::generate_tags))
}

/// The full application: routes plus tracing, request ids, and CORS.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    routes()
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .with_state(state)
}
