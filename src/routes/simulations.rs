use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    AnalysisQuery, AnalysisReport, ChartSpec, SimulationRequest, SimulationResponse, SimulationRun,
};
use crate::services::analysis_service::{analyze, analyze_run};
use crate::services::chart_data::{chart_spec, required_charts};
use crate::services::report_compositor::ExportCancellation;
use crate::services::simulation_service::run_simulation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_simulations).post(create_simulation))
        .route("/:id", get(get_simulation))
        .route("/:id/analysis", get(get_analysis))
        .route("/:id/charts", get(get_charts))
}

/// POST /api/simulations
///
/// Runs the Monte Carlo simulation upstream, analyzes the result and stores
/// the run in the history.
#[axum::debug_handler]
pub async fn create_simulation(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, AppError> {
    info!("POST /api/simulations - Running simulation for {:?}", request.tickers);

    let (params, results) = run_simulation(state.simulation_provider.as_ref(), &request)
        .await
        .map_err(|e| {
            error!("Simulation failed: {}", e);
            e
        })?;

    let analysis = analyze(&results, params.years, &results.sentiment_by_ticker());
    let run = SimulationRun::new(params, results);
    let index = state.history.append(run.clone()).await;

    info!(
        "🎲 Stored run {} at position {}: {}",
        run.id, index, analysis.recommendation.decision
    );
    Ok(Json(SimulationResponse { index, run, analysis }))
}

pub async fn list_simulations(State(state): State<AppState>) -> Json<Vec<SimulationRun>> {
    info!("GET /api/simulations - Listing run history");
    Json(state.history.list())
}

pub async fn get_simulation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SimulationRun>, AppError> {
    info!("GET /api/simulations/{} - Fetching run", id);
    let run = state.run(id).map_err(|e| {
        error!("Failed to fetch run {}: {}", id, e);
        e
    })?;
    Ok(Json(run))
}

/// GET /api/simulations/:id/analysis
///
/// Query parameters:
/// - `refresh_sentiment`: re-fetch sentiment per ticker from the news service (default: false)
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisReport>, AppError> {
    info!(
        "GET /api/simulations/{}/analysis - refresh_sentiment={}",
        id, query.refresh_sentiment
    );
    let run = state.run(id)?;
    let analysis = analyze_run(
        &run,
        query.refresh_sentiment,
        state.news_provider.as_ref(),
        &ExportCancellation::new(),
    )
    .await?;
    Ok(Json(analysis))
}

/// GET /api/simulations/:id/charts
///
/// Datasets for every chart the report needs, in report order.
pub async fn get_charts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChartSpec>>, AppError> {
    info!("GET /api/simulations/{}/charts - Building chart datasets", id);
    let run = state.run(id)?;
    let charts: Vec<ChartSpec> = required_charts(&run.results)
        .iter()
        .filter_map(|kind| chart_spec(kind, &run.results))
        .collect();
    Ok(Json(charts))
}
