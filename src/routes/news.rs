use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::TickerNews;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:ticker", get(get_ticker_news))
}

/// GET /api/news/:ticker
///
/// Recent articles and the aggregate sentiment score for one ticker.
pub async fn get_ticker_news(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerNews>, AppError> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker is required".to_string()));
    }

    info!("GET /api/news/{} - Fetching news", ticker);
    let news = state.news_provider.fetch_news(&ticker).await.map_err(|e| {
        error!("Failed to fetch news for {}: {}", ticker, e);
        e
    })?;

    info!(
        "Fetched {} articles for {} (sentiment: {:?})",
        news.news_articles.len(),
        ticker,
        news.sentiment_score
    );
    Ok(Json(news))
}
