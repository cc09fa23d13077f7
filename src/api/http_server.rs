use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use super::embeddings::embeddings_handler;
use crate::embeddings::EmbeddingService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EmbeddingService>,
}

/// Builds the application router over an already-loaded service.
pub fn router(service: Arc<EmbeddingService>) -> Router {
    let state = AppState { service };

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Embeddings endpoint
        .route("/v1/embeddings", post(embeddings_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    listen_addr: &str,
    service: Arc<EmbeddingService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(service);

    let addr = listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::response::Json(json!({
        "status": "ok",
        "model": state.service.model_name(),
        "dimension": state.service.dimension(),
        "policy": state.service.policy().to_string(),
    }))
}
