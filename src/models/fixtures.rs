//! Builders shared by unit tests.

use crate::models::*;

pub fn stock(ticker: &str) -> StockMetrics {
    StockMetrics {
        ticker: ticker.to_string(),
        mean_npv: 25_000.0,
        risk_prob: 0.2,
        var_95: -40_000.0,
        sharpe_ratio: 1.2,
        predicted_mean_return: 0.0004,
        ci_lower: -0.001,
        ci_upper: 0.0018,
        historical_volatility: 0.015,
        trend: Trend::Bullish,
        sentiment_score: Some(0.1),
        historical_prices: vec![100.0, 101.5, 99.8, 102.3],
        npv_values: vec![10_000.0, -5_000.0, 40_000.0],
        news_articles: Vec::new(),
    }
}

pub fn portfolio(risk_prob: f64, sharpe_ratio: f64) -> PortfolioMetrics {
    PortfolioMetrics {
        mean_npv: 120_000.0,
        risk_prob,
        var_95: -150_000.0,
        sharpe_ratio,
        npv_values: vec![-80_000.0, 50_000.0, 310_000.0, 120_000.0],
        cumulative_prob: vec![
            CumulativePoint { npv: -80_000.0, prob: 0.05 },
            CumulativePoint { npv: -10_000.0, prob: 0.2 },
            CumulativePoint { npv: 5_000.0, prob: 0.3 },
            CumulativePoint { npv: 310_000.0, prob: 1.0 },
        ],
    }
}

pub fn result(risk_prob: f64, sharpe_ratio: f64, stocks: Vec<StockMetrics>) -> SimulationResult {
    SimulationResult {
        portfolio: portfolio(risk_prob, sharpe_ratio),
        stocks,
    }
}

/// Three instruments where TSLA is the most volatile and NVDA has the best forecast
pub fn three_stock_result(risk_prob: f64, sharpe_ratio: f64) -> SimulationResult {
    let aapl = stock("AAPL");
    let tsla = StockMetrics {
        historical_volatility: 0.035,
        ..stock("TSLA")
    };
    let nvda = StockMetrics {
        predicted_mean_return: 0.0011,
        ..stock("NVDA")
    };
    result(risk_prob, sharpe_ratio, vec![aapl, tsla, nvda])
}
