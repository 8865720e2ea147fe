use axum::{routing::get, Router};
use tracing::debug;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Liveness probe; does not touch the upstream services
async fn health_check() -> &'static str {
    debug!("GET /health - Liveness probe");
    "OK"
}
