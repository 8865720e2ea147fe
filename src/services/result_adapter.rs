use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::{
    CumulativePoint, NewsArticle, PortfolioMetrics, SimulationResult, StockMetrics, Trend,
};

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Normalize a raw simulation response into a [`SimulationResult`].
///
/// Fails with `AppError::Validation` if any required numeric field is missing
/// or non-numeric, if `stocks` is empty, or if an instrument has no NPV
/// samples or price history. Nothing is returned on failure.
pub fn adapt_simulation_response(raw: &Value) -> Result<SimulationResult, AppError> {
    let root = raw
        .as_object()
        .ok_or_else(|| invalid("simulation response is not a JSON object"))?;

    if let Some(message) = root.get("error").and_then(Value::as_str) {
        return Err(AppError::Validation(message.to_string()));
    }

    let portfolio = adapt_portfolio(
        root.get("portfolio")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("missing 'portfolio' object"))?,
    )?;

    let stocks_obj = root
        .get("stocks")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("missing 'stocks' object"))?;

    if stocks_obj.is_empty() {
        return Err(invalid("'stocks' must contain at least one instrument"));
    }

    let stocks = stocks_obj
        .iter()
        .map(|(ticker, value)| {
            let obj = value
                .as_object()
                .ok_or_else(|| invalid(&format!("'stocks.{}' is not an object", ticker)))?;
            adapt_stock(ticker, obj)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Adapted simulation response: {} trials, {} instruments",
        portfolio.npv_values.len(),
        stocks.len()
    );

    Ok(SimulationResult { portfolio, stocks })
}

fn adapt_portfolio(obj: &Map<String, Value>) -> Result<PortfolioMetrics, AppError> {
    let ctx = "portfolio";
    Ok(PortfolioMetrics {
        mean_npv: required_f64(obj, ctx, "mean_npv")?,
        risk_prob: required_probability(obj, ctx, "risk_prob")?,
        var_95: required_f64(obj, ctx, "var_95")?,
        sharpe_ratio: required_f64(obj, ctx, "sharpe_ratio")?,
        npv_values: required_series(obj, ctx, "npv_values")?,
        cumulative_prob: adapt_cumulative(obj.get("cumulative_prob"))?,
    })
}

fn adapt_stock(ticker: &str, obj: &Map<String, Value>) -> Result<StockMetrics, AppError> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(invalid("instrument with an empty ticker"));
    }
    let ctx = format!("stocks.{}", ticker);
    let ctx = ctx.as_str();

    let sentiment_score = match obj.get("sentiment_score") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let score = finite(value)
                .ok_or_else(|| invalid(&format!("'{}.sentiment_score' is not numeric", ctx)))?;
            if !(-1.0 - PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&score) {
                return Err(invalid(&format!(
                    "'{}.sentiment_score' = {} is outside [-1, 1]",
                    ctx, score
                )));
            }
            Some(score.clamp(-1.0, 1.0))
        }
    };

    let trend = match obj.get("trend").and_then(Value::as_str) {
        Some(raw) => Trend::parse(raw),
        None => {
            warn!("No trend signal for {}", ticker);
            Trend::Undetermined
        }
    };

    Ok(StockMetrics {
        ticker: ticker.to_string(),
        mean_npv: required_f64(obj, ctx, "mean_npv")?,
        risk_prob: required_probability(obj, ctx, "risk_prob")?,
        var_95: required_f64(obj, ctx, "var_95")?,
        sharpe_ratio: required_f64(obj, ctx, "sharpe_ratio")?,
        predicted_mean_return: required_f64(obj, ctx, "predicted_mean_return")?,
        ci_lower: required_f64(obj, ctx, "ci_lower")?,
        ci_upper: required_f64(obj, ctx, "ci_upper")?,
        historical_volatility: required_f64(obj, ctx, "historical_volatility")?,
        trend,
        sentiment_score,
        historical_prices: required_series(obj, ctx, "historical_prices")?,
        npv_values: required_series(obj, ctx, "npv_values")?,
        news_articles: obj
            .get("news_articles")
            .map(parse_news_articles)
            .unwrap_or_default(),
    })
}

/// Accepts `[[npv, prob], ...]` or `[{"npv": .., "prob": ..}, ...]`, sorts by
/// npv and checks the curve never decreases.
fn adapt_cumulative(value: Option<&Value>) -> Result<Vec<CumulativePoint>, AppError> {
    let entries = value
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing 'portfolio.cumulative_prob' array"))?;

    let mut points = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let (npv, prob) = match entry {
            Value::Array(pair) if pair.len() == 2 => (finite(&pair[0]), finite(&pair[1])),
            Value::Object(obj) => (
                obj.get("npv").and_then(finite),
                obj.get("prob").and_then(finite),
            ),
            _ => (None, None),
        };
        let (npv, prob) = npv
            .zip(prob)
            .ok_or_else(|| invalid(&format!("'portfolio.cumulative_prob[{}]' is not an (npv, prob) pair", i)))?;
        if !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&prob) {
            return Err(invalid(&format!(
                "'portfolio.cumulative_prob[{}]' probability {} is outside [0, 1]",
                i, prob
            )));
        }
        points.push(CumulativePoint { npv, prob: prob.clamp(0.0, 1.0) });
    }

    points.sort_by(|a, b| a.npv.total_cmp(&b.npv));

    if points
        .windows(2)
        .any(|w| w[1].prob + PROBABILITY_TOLERANCE < w[0].prob)
    {
        return Err(invalid("'portfolio.cumulative_prob' decreases as npv increases"));
    }

    Ok(points)
}

/// Lenient article parsing; placeholders stand in for missing text fields.
pub fn parse_news_articles(value: &Value) -> Vec<NewsArticle> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|article| {
            let text = |key: &str, fallback: &str| {
                article
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(fallback)
                    .to_string()
            };
            NewsArticle {
                title: text("title", "No title available"),
                source: match article.get("source") {
                    Some(Value::Object(source)) => source
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown Source")
                        .to_string(),
                    _ => text("source", "Unknown Source"),
                },
                url: text("url", "#"),
                description: text("description", "No description available."),
                published_at: article
                    .get("publishedAt")
                    .or_else(|| article.get("published_at"))
                    .and_then(Value::as_str)
                    .and_then(parse_timestamp),
            }
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn required_f64(obj: &Map<String, Value>, ctx: &str, field: &str) -> Result<f64, AppError> {
    obj.get(field)
        .and_then(finite)
        .ok_or_else(|| invalid(&format!("missing or non-numeric field '{}.{}'", ctx, field)))
}

fn required_probability(obj: &Map<String, Value>, ctx: &str, field: &str) -> Result<f64, AppError> {
    let value = required_f64(obj, ctx, field)?;
    if !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&value) {
        return Err(invalid(&format!("'{}.{}' = {} is outside [0, 1]", ctx, field, value)));
    }
    Ok(value.clamp(0.0, 1.0))
}

fn required_series(obj: &Map<String, Value>, ctx: &str, field: &str) -> Result<Vec<f64>, AppError> {
    let items = obj
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(&format!("missing array '{}.{}'", ctx, field)))?;

    if items.is_empty() {
        return Err(invalid(&format!("'{}.{}' must not be empty", ctx, field)));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            finite(v).ok_or_else(|| invalid(&format!("'{}.{}[{}]' is not numeric", ctx, field, i)))
        })
        .collect()
}

fn invalid(message: &str) -> AppError {
    AppError::Validation(format!("Invalid simulation result: {}", message))
}
