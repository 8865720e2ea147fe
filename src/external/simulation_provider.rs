use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::SimulationRequest;

/// The Monte Carlo simulation backend.
///
/// Returns the raw response body; shape checks belong to the result adapter.
#[async_trait]
pub trait SimulationProvider: Send + Sync {
    async fn simulate(&self, request: &SimulationRequest) -> Result<Value, AppError>;
}

pub struct HttpSimulationProvider {
    base_url: String,
    client: Client,
}

impl HttpSimulationProvider {
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
impl SimulationProvider for HttpSimulationProvider {
    async fn simulate(&self, request: &SimulationRequest) -> Result<Value, AppError> {
        let tickers = request.tickers.join(",");
        let weights = request
            .weights
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(",");

        info!(
            "Requesting simulation for [{}] over {} years from {}",
            tickers, request.years, self.base_url
        );

        let response = self
            .client
            .get(format!("{}/api/simulate", self.base_url))
            .query(&[
                ("initial_investment", request.initial_investment.to_string()),
                ("years", request.years.to_string()),
                ("discount_rate", request.discount_rate.to_string()),
                ("tickers", tickers),
                ("weights", weights),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Simulation request failed: {}", e);
                AppError::UpstreamUnavailable(format!("Simulation service unreachable: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited);
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to parse simulation response: {}", e);
            AppError::UpstreamUnavailable(format!("Malformed simulation response: {}", e))
        })?;

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        error!("Simulation service returned {}: {}", status, message);

        if status == reqwest::StatusCode::BAD_REQUEST {
            Err(AppError::Validation(message))
        } else {
            Err(AppError::UpstreamUnavailable(format!(
                "Simulation service returned {}: {}",
                status, message
            )))
        }
    }
}
