use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AnalysisQuery, PageLayout, PaginatedReport, RasterizedImage, ReportDocument, SimulationRun};
use crate::services::analysis_service::analyze_run;
use crate::services::chart_data::required_charts;
use crate::services::report_compositor::{compose_report, ExportCancellation};
use crate::services::report_renderer::{export_csv, paginate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/charts/:section_id", put(upload_chart).get(get_chart))
        .route("/:id/export", post(export_report).delete(cancel_export))
        .route("/:id/export.csv", get(export_report_csv))
}

#[derive(Debug, Deserialize)]
pub struct ChartUploadQuery {
    pub width: u32,
    pub height: u32,
}

/// PUT /api/reports/:id/charts/:section_id?width=&height=
///
/// Registers the latest rendered frame of a chart surface (PNG body).
pub async fn upload_chart(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Query(size): Query<ChartUploadQuery>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    info!(
        "PUT /api/reports/{}/charts/{} - {}x{}, {} bytes",
        id,
        section_id,
        size.width,
        size.height,
        body.len()
    );

    let run = state.run(id)?;
    let known = required_charts(&run.results)
        .iter()
        .any(|kind| kind.section_id() == section_id);
    if !known {
        warn!("Rejected upload for unknown chart section {}", section_id);
        return Err(AppError::Validation(format!("Unknown chart section: {}", section_id)));
    }

    let image = RasterizedImage::png(size.width, size.height, body.to_vec());
    if image.is_empty() {
        return Err(AppError::Validation("Chart image is empty".to_string()));
    }

    state.chart_surfaces.register(id, &section_id, image);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/reports/:id/charts/:section_id
///
/// Latest uploaded frame. Exports embed the frame they captured instead.
pub async fn get_chart(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/reports/{}/charts/{} - Fetching chart image", id, section_id);
    let image = state
        .chart_surfaces
        .get(id, &section_id)
        .ok_or(AppError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
}

/// POST /api/reports/:id/export
///
/// Composes the report from the run's snapshot and the uploaded chart
/// surfaces, then lays it out on A4 pages. Each chart block carries the image
/// captured for this export, so later uploads do not change it.
///
/// The export can be cancelled with `DELETE` from the moment it starts,
/// including while sentiment is being refreshed.
#[axum::debug_handler]
pub async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<PaginatedReport>, AppError> {
    info!("POST /api/reports/{}/export - Exporting report", id);
    let run = state.run(id)?;

    let cancellation = state.exports.begin(id);
    let composed = compose_export(&state, &run, query.refresh_sentiment, &cancellation).await;
    state.exports.finish(id, &cancellation);

    let document = composed.map_err(|e| {
        error!("Report export for {} failed: {}", id, e);
        e
    })?;

    let report = paginate(&document);
    info!(
        "📄 Exported report for {}: {} pages, {} warnings",
        id,
        report.page_count,
        report.warnings.len()
    );
    Ok(Json(report))
}

async fn compose_export(
    state: &AppState,
    run: &SimulationRun,
    refresh_sentiment: bool,
    cancellation: &ExportCancellation,
) -> Result<ReportDocument, AppError> {
    let analysis = analyze_run(run, refresh_sentiment, state.news_provider.as_ref(), cancellation).await?;
    let locator = state
        .chart_surfaces
        .for_run(run.id, state.config.chart_capture_timeout);
    compose_report(&run.results, &analysis, PageLayout::a4(), &locator, cancellation).await
}

/// DELETE /api/reports/:id/export
pub async fn cancel_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /api/reports/{}/export - Cancelling export", id);
    if state.exports.cancel(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// GET /api/reports/:id/export.csv
pub async fn export_report_csv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/reports/{}/export.csv - Exporting CSV", id);
    let run = state.run(id)?;
    let analysis = analyze_run(
        &run,
        query.refresh_sentiment,
        state.news_provider.as_ref(),
        &ExportCancellation::new(),
    )
    .await?;

    let csv = export_csv(&run.results, &analysis).map_err(|e| {
        error!("CSV export for {} failed: {}", id, e);
        e
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"simulation_results.csv\"",
            ),
        ],
        csv,
    ))
}
