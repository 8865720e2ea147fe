use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single news article about an instrument
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub url: String,
    pub description: String,
    /// `None` when the provider sent no usable timestamp
    pub published_at: Option<DateTime<Utc>>,
}

/// News lookup result for one ticker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerNews {
    pub ticker: String,
    pub news_articles: Vec<NewsArticle>,
    /// Mean polarity in [-1, 1]
    pub sentiment_score: Option<f64>,
}
