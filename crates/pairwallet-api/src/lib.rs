//! HTTP API server for the Mini App
//!
//! Routes are organized into modules:
//! - routes::state: `GET`/`POST /user-state/:id`, the whole-document store
//! - routes::ledger: summary and planner views of a stored document
//! - routes::chat: finance assistant proxy

pub mod chat;
pub mod error;
pub mod routes;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use pairwallet_config::Config;
use pairwallet_core::RemoteStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use chat::ChatClient;
pub use error::ApiError;
pub use storage::FsDocumentStore;

/// Shared handler state
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn RemoteStore>,
    pub config: Arc<Config>,
    pub chat: Option<Arc<ChatClient>>,
}

/// Create the application router
pub fn create_router(state: ServerState) -> Router {
    use routes::chat::api_chat;
    use routes::ledger::{api_planner, api_summary};
    use routes::state::{api_get_user_state, api_save_user_state};

    let cors = cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.data.max_document_bytes;

    Router::new()
        .route("/api/health", get(health_check))
        .route("/user-state/:id", get(api_get_user_state).post(api_save_user_state))
        .route("/api/summary/:id", get(api_summary))
        .route("/api/planner/:id", get(api_planner))
        .route("/api/chat", post(api_chat))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Permissive unless specific origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

/// Start the HTTP server
///
/// Creates the data directory and the optional chat client, binds to the
/// configured address and serves until Ctrl-C.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let store = FsDocumentStore::new(&config.data.path, config.data.max_document_bytes);
    store.ensure_root().await?;

    let request_timeout = Duration::from_millis(config.sync.request_timeout_ms);
    let chat = ChatClient::from_config(&config.chat, request_timeout)?.map(Arc::new);
    if chat.is_none() {
        log::info!("Chat assistant disabled (no chat.endpoint configured)");
    }

    let addr = config.bind_address();
    let state = ServerState {
        store: Arc::new(store),
        config: Arc::new(config),
        chat,
    };
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting pairwallet server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - GET/POST /user-state/:id (state documents)");
    log::info!("  - GET /api/summary/:id, /api/planner/:id");
    log::info!("  - POST /api/chat");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
