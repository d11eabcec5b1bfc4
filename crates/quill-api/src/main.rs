//! quill API server.

use std::sync::Arc;

use tracing::{info, warn};

use quill_api::auth::StaticSessions;
use quill_api::config::ServerConfig;
use quill_api::logging::init_tracing;
use quill_api::{build_router, AppState};
use quill_db::Database;
use quill_inference::OpenAIBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    let _log_guard = init_tracing(&config.log);

    // Connect to database, or keep notes in memory
    let db = match config.database_url.as_deref() {
        Some(url) => {
            info!("Connecting to database...");
            let db = Database::connect(url).await?;
            info!("Running database migrations...");
            db.migrate().await?;
            info!("Database ready");
            db
        }
        None => {
            warn!("DATABASE_URL not set; notes are kept in memory and lost on restart");
            Database::in_memory()
        }
    };

    let backend = OpenAIBackend::new(config.openai.clone())?;

    let sessions = StaticSessions::parse(&config.sessions)?;
    if sessions.is_empty() {
        warn!("QUILL_SESSIONS is empty; every note request will be redirected to /login");
    } else {
        info!(session_count = sessions.len(), "Loaded session table");
    }

    let state = AppState::new(db, Arc::new(backend), Arc::new(sessions))
        .with_sse_keepalive(config.sse_keepalive);
    let app = build_router(state, config.allowed_origins.clone());

    // Start server
    let addr = config.bind_addr()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
