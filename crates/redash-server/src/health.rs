use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::config::HealthConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness check. Always ok while the process is up.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn build_router() -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// Serve the health endpoint until the process exits
pub async fn serve(config: &HealthConfig) -> anyhow::Result<()> {
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Health check: http://{}/healthz", addr);

    axum::serve(listener, build_router()).await?;
    Ok(())
}
