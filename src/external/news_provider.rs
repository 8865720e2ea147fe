use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::TickerNews;
use crate::services::result_adapter::parse_news_articles;

/// News and sentiment lookup for a single ticker
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, ticker: &str) -> Result<TickerNews, AppError>;
}

pub struct HttpNewsProvider {
    base_url: String,
    client: Client,
}

impl HttpNewsProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::UpstreamUnavailable(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl NewsProvider for HttpNewsProvider {
    async fn fetch_news(&self, ticker: &str) -> Result<TickerNews, AppError> {
        info!("Fetching news for {}", ticker);

        let response = self
            .client
            .get(format!("{}/api/news", self.base_url))
            .query(&[("ticker", ticker)])
            .send()
            .await
            .map_err(|e| {
                error!("News request for {} failed: {}", ticker, e);
                AppError::UpstreamUnavailable(format!("News service unreachable: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("News service error {} for {}: {}", status, ticker, error_text);
            return Err(AppError::UpstreamUnavailable(format!(
                "News service returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to parse news response for {}: {}", ticker, e);
            AppError::UpstreamUnavailable(format!("Malformed news response: {}", e))
        })?;

        Ok(TickerNews {
            ticker: body
                .get("ticker")
                .and_then(Value::as_str)
                .unwrap_or(ticker)
                .to_string(),
            news_articles: body
                .get("news_articles")
                .map(parse_news_articles)
                .unwrap_or_default(),
            sentiment_score: body
                .get("sentiment_score")
                .and_then(Value::as_f64)
                .filter(|s| s.is_finite())
                .map(|s| s.clamp(-1.0, 1.0)),
        })
    }
}
