use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AnalysisReport, SimulationRequest, SimulationResult};

/// A completed simulation kept in the run history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationRun {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub params: SimulationRequest,
    pub results: SimulationResult,
}

impl SimulationRun {
    pub fn new(params: SimulationRequest, results: SimulationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            params,
            results,
        }
    }
}

/// One run's figures in a side-by-side comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonSeries {
    /// e.g. "Simulation 1" (1-based history position)
    pub label: String,
    pub run_id: Uuid,
    pub initial_investment: f64,
    pub tickers: Vec<String>,
    pub weights: Vec<f64>,
    /// Aligned with [`RunComparison::metrics`]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunComparison {
    pub metrics: Vec<String>,
    pub series: Vec<ComparisonSeries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareQuery {
    pub sim1: usize,
    pub sim2: usize,
}

/// A freshly created run together with its analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Position in the run history
    pub index: usize,
    pub run: SimulationRun,
    pub analysis: AnalysisReport,
}
