use std::collections::HashMap;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::news_provider::NewsProvider;
use crate::models::{AnalysisReport, SimulationResult, SimulationRun};
use crate::services::interpretation_service::generate_interpretations;
use crate::services::recommendation_service::generate_recommendation;
use crate::services::report_compositor::ExportCancellation;
use crate::services::suggestion_service::generate_suggestions;

/// Run all three decision functions over one snapshot.
pub fn analyze(
    result: &SimulationResult,
    years: u32,
    sentiment_by_ticker: &HashMap<String, f64>,
) -> AnalysisReport {
    AnalysisReport {
        interpretations: generate_interpretations(result, years),
        suggestions: generate_suggestions(result, sentiment_by_ticker),
        recommendation: generate_recommendation(&result.portfolio),
    }
}

/// Fresh sentiment per ticker from the news service, looked up one ticker at
/// a time. A failed lookup keeps the score the simulation carried, if any;
/// otherwise the ticker is left out.
///
/// Cancelling `cancellation` abandons the lookup in flight and skips the rest.
pub async fn refresh_sentiment(
    result: &SimulationResult,
    news_provider: &dyn NewsProvider,
    cancellation: &ExportCancellation,
) -> Result<HashMap<String, f64>, AppError> {
    let mut sentiment = HashMap::with_capacity(result.stocks.len());

    for stock in &result.stocks {
        let fetched = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                info!("Sentiment refresh cancelled before {}", stock.ticker);
                return Err(AppError::Cancelled);
            }
            fetched = news_provider.fetch_news(&stock.ticker) => fetched,
        };

        let refreshed = match fetched {
            Ok(news) => news.sentiment_score,
            Err(e) => {
                warn!("Sentiment refresh failed for {}: {}", stock.ticker, e);
                None
            }
        };

        match refreshed.or(stock.sentiment_score) {
            Some(score) => {
                sentiment.insert(stock.ticker.clone(), score);
            }
            None => warn!("No sentiment available for {}", stock.ticker),
        }
    }

    info!(
        "Refreshed sentiment for {}/{} instruments",
        sentiment.len(),
        result.stocks.len()
    );
    Ok(sentiment)
}

/// Analysis of a stored run, optionally with sentiment re-fetched from the
/// news service instead of the scores captured with the run.
pub async fn analyze_run(
    run: &SimulationRun,
    refresh: bool,
    news_provider: &dyn NewsProvider,
    cancellation: &ExportCancellation,
) -> Result<AnalysisReport, AppError> {
    let sentiment = if refresh {
        refresh_sentiment(&run.results, news_provider, cancellation).await?
    } else {
        run.results.sentiment_by_ticker()
    };
    Ok(analyze(&run.results, run.params.years, &sentiment))
}
