use serde::{Deserialize, Serialize};

/// Charts the report needs, each backed by one rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "chart", content = "ticker", rename_all = "snake_case")]
pub enum ChartKind {
    PortfolioNpvHistogram,
    CumulativeProbability,
    RiskReturnScatter,
    InstrumentNpvHistogram(String),
    InstrumentPriceHistory(String),
}

impl ChartKind {
    /// Stable identifier the rendering layer registers its surface under
    pub fn section_id(&self) -> String {
        match self {
            ChartKind::PortfolioNpvHistogram => "portfolio-npv".to_string(),
            ChartKind::CumulativeProbability => "portfolio-cumulative".to_string(),
            ChartKind::RiskReturnScatter => "risk-return".to_string(),
            ChartKind::InstrumentNpvHistogram(ticker) => format!("{}-npv", ticker),
            ChartKind::InstrumentPriceHistory(ticker) => format!("{}-price", ticker),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ChartKind::PortfolioNpvHistogram => "Portfolio NPV Distribution".to_string(),
            ChartKind::CumulativeProbability => "Cumulative Probability of NPV".to_string(),
            ChartKind::RiskReturnScatter => "Risk vs Return (All Stocks)".to_string(),
            ChartKind::InstrumentNpvHistogram(ticker) => format!("{} NPV Distribution", ticker),
            ChartKind::InstrumentPriceHistory(ticker) => format!("{} Historical Price Trend", ticker),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<XyPoint>,
}

/// Data handed to the rendering layer; how it is drawn is not our concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartDataset {
    Bar {
        label: String,
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Line {
        label: String,
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Scatter {
        series: Vec<ScatterSeries>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub section_id: String,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub dataset: ChartDataset,
}
