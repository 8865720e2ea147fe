use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::NewsArticle;

/// Trading days per year, used to annualize daily returns
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Parameters of a simulation run, as sent to the simulation backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationRequest {
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,

    /// Time horizon in years
    #[serde(default = "default_years")]
    pub years: u32,

    /// Discount rate as a decimal (e.g., 0.05 for 5%)
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    pub tickers: Vec<String>,

    /// Portfolio weights, one per ticker, summing to 1
    pub weights: Vec<f64>,
}

fn default_initial_investment() -> f64 {
    1_000_000.0
}

fn default_years() -> u32 {
    5
}

fn default_discount_rate() -> f64 {
    0.05
}

/// A point on the portfolio's cumulative NPV distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CumulativePoint {
    pub npv: f64,
    /// P(NPV <= npv)
    pub prob: f64,
}

/// Portfolio-level Monte Carlo results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioMetrics {
    pub mean_npv: f64,
    /// Probability of a negative NPV, in [0, 1]
    pub risk_prob: f64,
    pub var_95: f64,
    pub sharpe_ratio: f64,
    /// One entry per trial, in trial order
    pub npv_values: Vec<f64>,
    /// Sorted ascending by npv
    pub cumulative_prob: Vec<CumulativePoint>,
}

/// Moving-average trend signal (MA10 vs MA50).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// MA10 > MA50
    Bullish,
    /// MA10 < MA50
    Bearish,
    /// Signal missing or not recognized
    Undetermined,
}

impl Trend {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace(' ', "").as_str() {
            "bullish" | "ma10>ma50" => Trend::Bullish,
            "bearish" | "ma10<ma50" => Trend::Bearish,
            _ => Trend::Undetermined,
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bullish => write!(f, "Bullish (MA10 > MA50)"),
            Trend::Bearish => write!(f, "Bearish (MA10 < MA50)"),
            Trend::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// Per-instrument simulation and forecasting results.
///
/// Return and volatility figures are daily decimals as produced upstream;
/// annualize with [`TRADING_DAYS_PER_YEAR`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMetrics {
    pub ticker: String,
    pub mean_npv: f64,
    pub risk_prob: f64,
    pub var_95: f64,
    pub sharpe_ratio: f64,
    pub predicted_mean_return: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub historical_volatility: f64,
    pub trend: Trend,
    /// News sentiment in [-1, 1]; `None` when the news lookup produced nothing
    pub sentiment_score: Option<f64>,
    pub historical_prices: Vec<f64>,
    pub npv_values: Vec<f64>,
    pub news_articles: Vec<NewsArticle>,
}

impl StockMetrics {
    pub fn annual_predicted_return(&self) -> f64 {
        self.predicted_mean_return * TRADING_DAYS_PER_YEAR
    }
}

/// A completed simulation, normalized from the upstream response.
///
/// `stocks` keeps the upstream iteration order; every rule that walks
/// instruments depends on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub portfolio: PortfolioMetrics,
    pub stocks: Vec<StockMetrics>,
}

impl SimulationResult {
    pub fn stock(&self, ticker: &str) -> Option<&StockMetrics> {
        self.stocks.iter().find(|s| s.ticker == ticker)
    }

    pub fn tickers(&self) -> Vec<String> {
        self.stocks.iter().map(|s| s.ticker.clone()).collect()
    }

    /// Sentiment scores carried by the simulation response itself.
    pub fn sentiment_by_ticker(&self) -> HashMap<String, f64> {
        self.stocks
            .iter()
            .filter_map(|s| s.sentiment_score.map(|score| (s.ticker.clone(), score)))
            .collect()
    }
}

/// Risk badge derived from a loss probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_probability(risk_prob: f64) -> Self {
        if risk_prob < 0.30 {
            RiskLevel::Low
        } else if risk_prob < 0.60 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_parses_both_spellings() {
        assert_eq!(Trend::parse("Bullish"), Trend::Bullish);
        assert_eq!(Trend::parse("MA10 > MA50"), Trend::Bullish);
        assert_eq!(Trend::parse("ma10<ma50"), Trend::Bearish);
        assert_eq!(Trend::parse("sideways"), Trend::Undetermined);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.2999), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.30), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.5999), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.60), RiskLevel::High);
    }

    #[test]
    fn test_request_defaults_fill_missing_fields() {
        let request: SimulationRequest = serde_json::from_value(serde_json::json!({
            "tickers": ["AAPL"],
            "weights": [1.0]
        }))
        .unwrap();

        assert_eq!(request.initial_investment, 1_000_000.0);
        assert_eq!(request.years, 5);
        assert_eq!(request.discount_rate, 0.05);
    }
}
