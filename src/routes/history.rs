use axum::extract::{Path, Query, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{CompareQuery, RunComparison, SimulationRun};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compare", get(compare_runs))
        .route("/:index", delete(delete_run))
}

/// DELETE /api/history/:index
pub async fn delete_run(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SimulationRun>, AppError> {
    info!("DELETE /api/history/{} - Removing run", index);
    let removed = state.history.delete(index).await.map_err(|e| {
        error!("Failed to delete run at {}: {}", index, e);
        e
    })?;

    state.chart_surfaces.clear_run(removed.id);
    state.exports.cancel(removed.id);
    info!("Removed run {} ({} left)", removed.id, state.history.len());
    Ok(Json(removed))
}

/// GET /api/history/compare?sim1=&sim2=
///
/// Key portfolio metrics of two runs, addressed by history position.
pub async fn compare_runs(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<RunComparison>, AppError> {
    info!("GET /api/history/compare - Comparing runs {} and {}", query.sim1, query.sim2);
    let comparison = state.history.compare(query.sim1, query.sim2).map_err(|e| {
        error!("Failed to compare runs {} and {}: {}", query.sim1, query.sim2, e);
        e
    })?;
    Ok(Json(comparison))
}
