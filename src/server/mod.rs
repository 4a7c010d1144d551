//! HTTP server
//!
//! Router assembly and startup. All state shared across requests is the
//! immutable `ServerConfig`; handlers own everything else per request.

pub mod error;
pub mod handlers;
pub mod protocol;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::server::protocol::HealthResponse;

pub use error::{ApiError, ApiResult};

/// Shared request context.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
}

/// Build the application router; split out so tests can drive the routes
/// without binding a socket.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/snapshot", post(handlers::snapshot::create_snapshot))
        .route("/api/snapshot/text", post(handlers::snapshot::render_snapshot_text))
        .route("/api/archive", post(handlers::archive::download_archive))
        .route("/api/deploy", post(handlers::deploy::trigger_deploy))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Run the HTTP server until shutdown.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    info!(
        "Snapshot root: {:?}, deploy {}",
        config.snapshot_root,
        if config.vercel_token.is_some() {
            "enabled"
        } else {
            "disabled (no VERCEL_TOKEN)"
        }
    );

    let ctx = AppContext {
        config: Arc::new(config),
    };
    let app = router(ctx);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
