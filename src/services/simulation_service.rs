use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::simulation_provider::SimulationProvider;
use crate::models::{SimulationRequest, SimulationResult};
use crate::services::result_adapter::adapt_simulation_response;

/// Allowed deviation of the weight sum from 1
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Check and normalize a request before it reaches the simulation backend.
/// Tickers are trimmed and upper-cased.
pub fn validate_request(request: &SimulationRequest) -> Result<SimulationRequest, AppError> {
    if !(request.initial_investment.is_finite() && request.initial_investment > 0.0) {
        return Err(AppError::Validation("Initial investment must be positive".to_string()));
    }
    if request.years == 0 {
        return Err(AppError::Validation("Years must be positive".to_string()));
    }
    if !(request.discount_rate.is_finite() && request.discount_rate >= 0.0) {
        return Err(AppError::Validation("Discount rate cannot be negative".to_string()));
    }
    if request.tickers.is_empty() {
        return Err(AppError::Validation("At least one ticker is required".to_string()));
    }
    if request.tickers.len() != request.weights.len() {
        return Err(AppError::Validation(
            "Number of tickers must match number of weights".to_string(),
        ));
    }

    let tickers: Vec<String> = request
        .tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .collect();
    if tickers.iter().any(|t| t.is_empty() || t.contains(',')) {
        return Err(AppError::Validation("Tickers must be non-empty symbols".to_string()));
    }

    if request.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(AppError::Validation("Weights must be non-negative numbers".to_string()));
    }
    let total: f64 = request.weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(AppError::Validation("Weights must sum to 1".to_string()));
    }

    Ok(SimulationRequest {
        tickers,
        ..request.clone()
    })
}

/// Validate, run upstream and adapt. A malformed response fails the whole run.
pub async fn run_simulation(
    provider: &dyn SimulationProvider,
    request: &SimulationRequest,
) -> Result<(SimulationRequest, SimulationResult), AppError> {
    let request = validate_request(request)?;

    info!(
        "Running simulation: investment={}, years={}, discount_rate={}, tickers={:?}",
        request.initial_investment, request.years, request.discount_rate, request.tickers
    );

    let raw = provider.simulate(&request).await?;
    let result = adapt_simulation_response(&raw).map_err(|e| {
        warn!("Rejected simulation response: {}", e);
        e
    })?;

    info!(
        "Simulation complete: mean NPV {:.2}, risk probability {:.4}, {} instruments",
        result.portfolio.mean_npv,
        result.portfolio.risk_prob,
        result.stocks.len()
    );

    Ok((request, result))
}
