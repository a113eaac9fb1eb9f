//! HTTP API.
//!
//! A small axum server exposing the chat message log and placeholder
//! enterprise integration endpoints.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::storage::Storage;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

/// Build the API router.
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        .route(
            "/api/chat/messages",
            get(routes::list_messages).post(routes::create_message),
        )
        .route(
            "/api/enterprise/salesforce/opportunities",
            get(routes::salesforce_opportunities),
        )
        .route("/api/enterprise/gmail/messages", get(routes::gmail_messages))
        .route("/api/enterprise/gdrive/files", get(routes::gdrive_files))
        .route("/api/enterprise/notion/pages", get(routes::notion_pages))
        .with_state(state);

    if enable_cors {
        // Permissive for local development
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app.layer(cors)
    } else {
        app
    }
}

/// Bind and serve in a background task.
///
/// Returns the server task and the bound address (useful with port 0).
pub async fn start_server(
    config: &ServerConfig,
    storage: Arc<dyn Storage>,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let app = router(AppState::new(storage), config.enable_cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;

    tracing::info!("Venn API listening on http://{}", addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((handle, addr))
}
