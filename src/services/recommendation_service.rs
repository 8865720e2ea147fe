use crate::models::{Decision, PortfolioMetrics, Recommendation};
use crate::services::formatting::{pct, ratio};

pub const NO_GO_RISK: f64 = 0.60;
pub const NO_GO_SHARPE: f64 = 0.5;
pub const CAUTION_RISK: f64 = 0.30;
pub const CAUTION_SHARPE: f64 = 1.0;

/// Classify a (risk probability, Sharpe ratio) pair. Total: every pair maps
/// to exactly one decision; a NaN input is treated as the worst case.
pub fn classify(risk_prob: f64, sharpe_ratio: f64) -> Decision {
    let undefined = risk_prob.is_nan() || sharpe_ratio.is_nan();
    if undefined || risk_prob > NO_GO_RISK || sharpe_ratio < NO_GO_SHARPE {
        Decision::NoGo
    } else if risk_prob > CAUTION_RISK || sharpe_ratio < CAUTION_SHARPE {
        Decision::ProceedWithCaution
    } else {
        Decision::Go
    }
}

/// Three-way investment recommendation from portfolio-level metrics.
pub fn generate_recommendation(portfolio: &PortfolioMetrics) -> Recommendation {
    let risk = pct(portfolio.risk_prob);
    let sharpe = ratio(portfolio.sharpe_ratio);

    let decision = classify(portfolio.risk_prob, portfolio.sharpe_ratio);
    let (reason, investment_decision) = match decision {
        Decision::NoGo => (
            format!(
                "Risk probability of {} exceeds the 60% limit or the Sharpe ratio of {} is below 0.5; the expected return does not justify the downside.",
                risk, sharpe
            ),
            "No-Go: Reconsider this investment or restructure the portfolio before committing capital.".to_string(),
        ),
        Decision::ProceedWithCaution => (
            format!(
                "Risk probability of {} is above 30% or the Sharpe ratio of {} is below 1.0; the portfolio is viable but carries meaningful risk.",
                risk, sharpe
            ),
            "Proceed with Caution: Review position weights and monitor the flagged holdings closely.".to_string(),
        ),
        Decision::Go => (
            format!(
                "Risk probability of {} is at most 30% and the Sharpe ratio of {} is at least 1.0; risk-adjusted returns are attractive.",
                risk, sharpe
            ),
            "Go: Proceed with the investment as planned.".to_string(),
        ),
    };

    Recommendation {
        decision,
        reason,
        investment_decision,
    }
}
