//! Shared fixtures for the integration tests: upstream response builders,
//! mock collaborators and a ready-to-route application state.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use riskwise_backend::config::AppConfig;
use riskwise_backend::errors::AppError;
use riskwise_backend::external::news_provider::NewsProvider;
use riskwise_backend::external::simulation_provider::SimulationProvider;
use riskwise_backend::models::{RasterizedImage, SimulationRequest, TickerNews};
use riskwise_backend::services::chart_surface::ChartSurfaceLocator;
use riskwise_backend::services::history_service::SimulationHistory;
use riskwise_backend::services::report_compositor::ExportCancellation;
use riskwise_backend::state::AppState;

// ---------------------------------------------------------------------------
// Upstream payloads
// ---------------------------------------------------------------------------

pub struct StockSpec {
    pub ticker: &'static str,
    pub risk_prob: f64,
    pub sharpe_ratio: f64,
    pub historical_volatility: f64,
    pub sentiment_score: Option<f64>,
}

impl StockSpec {
    pub fn calm(ticker: &'static str) -> Self {
        Self {
            ticker,
            risk_prob: 0.1,
            sharpe_ratio: 1.4,
            historical_volatility: 0.012,
            sentiment_score: Some(0.2),
        }
    }
}

/// A simulation response shaped like the upstream service's JSON
pub fn simulation_response(risk_prob: f64, sharpe_ratio: f64, stocks: &[StockSpec]) -> Value {
    let mut stocks_obj = Map::new();
    for spec in stocks {
        stocks_obj.insert(
            spec.ticker.to_string(),
            json!({
                "mean_npv": 42000.0,
                "risk_prob": spec.risk_prob,
                "var_95": -61000.0,
                "sharpe_ratio": spec.sharpe_ratio,
                "predicted_mean_return": 0.0005,
                "ci_lower": -0.0011,
                "ci_upper": 0.0021,
                "historical_volatility": spec.historical_volatility,
                "trend": "bullish",
                "sentiment_score": spec.sentiment_score,
                "historical_prices": [180.2, 181.0, 179.4, 183.9, 185.1],
                "npv_values": [52000.0, -12000.0, 86000.0],
                "news_articles": [
                    {
                        "title": format!("{} beats estimates", spec.ticker),
                        "source": {"name": "Reuters"},
                        "url": "https://example.com/a",
                        "description": "Quarterly results",
                        "publishedAt": "2024-05-02T14:30:00Z"
                    }
                ]
            }),
        );
    }

    json!({
        "portfolio": {
            "mean_npv": 154000.0,
            "risk_prob": risk_prob,
            "var_95": -210000.0,
            "sharpe_ratio": sharpe_ratio,
            "npv_values": [-90000.0, 40000.0, 260000.0, 410000.0],
            "cumulative_prob": [[-90000.0, 0.25], [40000.0, 0.5], [260000.0, 0.75], [410000.0, 1.0]]
        },
        "stocks": Value::Object(stocks_obj)
    })
}

pub fn request(tickers: &[&str], weights: &[f64]) -> SimulationRequest {
    SimulationRequest {
        initial_investment: 1_000_000.0,
        years: 5,
        discount_rate: 0.05,
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        weights: weights.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

enum Outcome {
    Response(Value),
    Error(fn() -> AppError),
}

/// Replays one canned outcome and counts calls
pub struct MockSimulation {
    outcome: Outcome,
    pub calls: AtomicUsize,
}

impl MockSimulation {
    pub fn returning(response: Value) -> Self {
        Self {
            outcome: Outcome::Response(response),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(make_error: fn() -> AppError) -> Self {
        Self {
            outcome: Outcome::Error(make_error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimulationProvider for MockSimulation {
    async fn simulate(&self, _request: &SimulationRequest) -> Result<Value, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Response(value) => Ok(value.clone()),
            Outcome::Error(make_error) => Err(make_error()),
        }
    }
}

/// Fixed sentiment per ticker; tickers without an entry fail upstream
#[derive(Default)]
pub struct MockNews {
    pub sentiment: HashMap<String, f64>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockNews {
    pub fn with(entries: &[(&str, f64)]) -> Self {
        Self {
            sentiment: entries.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
            ..Self::default()
        }
    }

    /// Every lookup waits `delay` before answering
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsProvider for MockNews {
    async fn fetch_news(&self, ticker: &str) -> Result<TickerNews, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.sentiment.get(ticker) {
            Some(score) => Ok(TickerNews {
                ticker: ticker.to_string(),
                news_articles: Vec::new(),
                sentiment_score: Some(*score),
            }),
            None => Err(AppError::UpstreamUnavailable("news service down".to_string())),
        }
    }
}

/// Locator that records capture order and how many captures overlap.
/// Sections listed in `missing` are never found.
pub struct RecordingLocator {
    pub order: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    missing: Vec<String>,
    cancel_after: Option<(usize, ExportCancellation)>,
}

impl RecordingLocator {
    pub fn new() -> Self {
        Self {
            order: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            missing: Vec::new(),
            cancel_after: None,
        }
    }

    pub fn without(mut self, section_id: &str) -> Self {
        self.missing.push(section_id.to_string());
        self
    }

    /// Cancel `token` once `captures` sections have been captured
    pub fn cancelling_after(mut self, captures: usize, token: ExportCancellation) -> Self {
        self.cancel_after = Some((captures, token));
        self
    }

    pub fn captured(&self) -> Vec<String> {
        self.order.lock().clone()
    }
}

#[async_trait]
impl ChartSurfaceLocator for RecordingLocator {
    async fn locate(&self, section_id: &str) -> Option<RasterizedImage> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(2)).await;

        let captured = {
            let mut order = self.order.lock();
            order.push(section_id.to_string());
            order.len()
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((after, token)) = &self.cancel_after {
            if captured >= *after {
                token.cancel();
            }
        }

        if self.missing.iter().any(|m| m == section_id) {
            None
        } else {
            Some(RasterizedImage::png(1200, 600, vec![0x89, 0x50, 0x4e, 0x47]))
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub fn test_state(simulation: Arc<MockSimulation>, news: Arc<MockNews>) -> AppState {
    let config = AppConfig {
        chart_capture_timeout: Duration::from_millis(20),
        ..AppConfig::default()
    };
    AppState::new(config, simulation, news, SimulationHistory::in_memory())
}
