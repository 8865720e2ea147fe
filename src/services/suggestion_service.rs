use std::collections::HashMap;
use tracing::debug;

use crate::models::{SimulationResult, Suggestion, SuggestionKind};
use crate::services::formatting::{pct, ratio};
use crate::services::interpretation_service::risk_return_extremes;

/// Portfolio loss probability above which the portfolio is high risk
pub const PORTFOLIO_HIGH_RISK: f64 = 0.60;
/// Portfolio loss probability above which the portfolio is moderate risk
pub const PORTFOLIO_MODERATE_RISK: f64 = 0.30;
pub const PORTFOLIO_MIN_SHARPE: f64 = 1.0;
pub const INSTRUMENT_HIGH_RISK: f64 = 0.50;
pub const INSTRUMENT_MIN_SHARPE: f64 = 0.5;

/// Derive actionable warnings from threshold breaches.
///
/// Rules run in a fixed order: one portfolio risk-tier suggestion, the
/// portfolio Sharpe check, per-instrument risk and Sharpe checks in
/// `stocks` order, then negative sentiment per instrument. Instruments with
/// no entry in `sentiment_by_ticker` are skipped by the sentiment rule only.
pub fn generate_suggestions(
    result: &SimulationResult,
    sentiment_by_ticker: &HashMap<String, f64>,
) -> Vec<Suggestion> {
    let portfolio = &result.portfolio;
    let mut suggestions = Vec::new();

    let most_volatile = risk_return_extremes(result)
        .map(|(volatile, _)| volatile.ticker)
        .unwrap_or_else(|| "the most volatile holding".to_string());

    // Exactly one risk-tier suggestion
    if portfolio.risk_prob > PORTFOLIO_HIGH_RISK {
        suggestions.push(suggestion(
            SuggestionKind::PortfolioHighRisk,
            None,
            format!(
                "High risk: the portfolio loses money in {} of simulations. Consider reducing exposure to {}, the most volatile holding, or diversifying into lower-risk assets.",
                pct(portfolio.risk_prob),
                most_volatile
            ),
        ));
    } else if portfolio.risk_prob > PORTFOLIO_MODERATE_RISK {
        suggestions.push(suggestion(
            SuggestionKind::PortfolioModerateRisk,
            None,
            format!(
                "Moderate risk: the portfolio loses money in {} of simulations. Review position weights and consider adding assets with lower correlation.",
                pct(portfolio.risk_prob)
            ),
        ));
    } else {
        suggestions.push(suggestion(
            SuggestionKind::PortfolioLowRisk,
            None,
            format!(
                "Low risk: the portfolio loses money in only {} of simulations. Keep monitoring {}, the most volatile holding.",
                pct(portfolio.risk_prob),
                most_volatile
            ),
        ));
    }

    if portfolio.sharpe_ratio < PORTFOLIO_MIN_SHARPE {
        suggestions.push(suggestion(
            SuggestionKind::PortfolioLowSharpe,
            None,
            format!(
                "The portfolio Sharpe ratio of {} is below 1.0, so returns do not adequately compensate for risk. Consider higher-return or lower-volatility alternatives.",
                ratio(portfolio.sharpe_ratio)
            ),
        ));
    }

    for stock in &result.stocks {
        if stock.risk_prob > INSTRUMENT_HIGH_RISK {
            suggestions.push(suggestion(
                SuggestionKind::InstrumentHighRisk,
                Some(&stock.ticker),
                format!(
                    "{} has a {} probability of a negative NPV. Consider reducing its weight.",
                    stock.ticker,
                    pct(stock.risk_prob)
                ),
            ));
        }
        if stock.sharpe_ratio < INSTRUMENT_MIN_SHARPE {
            suggestions.push(suggestion(
                SuggestionKind::InstrumentLowSharpe,
                Some(&stock.ticker),
                format!(
                    "{} has a low Sharpe ratio of {}. Its risk-adjusted return is weak; consider replacing it.",
                    stock.ticker,
                    ratio(stock.sharpe_ratio)
                ),
            ));
        }
    }

    for stock in &result.stocks {
        match sentiment_by_ticker.get(&stock.ticker) {
            Some(&score) if score < 0.0 => {
                suggestions.push(suggestion(
                    SuggestionKind::NegativeSentiment,
                    Some(&stock.ticker),
                    format!(
                        "News sentiment for {} is negative ({}). Check recent news before committing capital.",
                        stock.ticker,
                        pct(score)
                    ),
                ));
            }
            Some(_) => {}
            None => debug!("No sentiment for {}, skipping sentiment rule", stock.ticker),
        }
    }

    suggestions
}

fn suggestion(kind: SuggestionKind, ticker: Option<&str>, text: String) -> Suggestion {
    Suggestion {
        kind,
        severity: kind.severity(),
        ticker: ticker.map(str::to_string),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use crate::models::{Severity, StockMetrics};

    fn kinds(suggestions: &[Suggestion]) -> Vec<SuggestionKind> {
        suggestions.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_low_risk_emits_only_advisory() {
        let result = fixtures::three_stock_result(0.25, 1.5);
        let suggestions = generate_suggestions(&result, &HashMap::new());

        assert_eq!(kinds(&suggestions), vec![SuggestionKind::PortfolioLowRisk]);
        assert!(suggestions[0].text.contains("TSLA"));
        assert_eq!(suggestions[0].severity, Severity::Info);
    }

    #[test]
    fn test_moderate_risk_and_low_sharpe_both_fire() {
        let result = fixtures::three_stock_result(0.45, 0.8);
        let suggestions = generate_suggestions(&result, &HashMap::new());

        assert_eq!(
            kinds(&suggestions),
            vec![SuggestionKind::PortfolioModerateRisk, SuggestionKind::PortfolioLowSharpe]
        );
    }

    #[test]
    fn test_high_risk_names_most_volatile_instrument() {
        let result = fixtures::three_stock_result(0.75, 0.3);
        let suggestions = generate_suggestions(&result, &HashMap::new());

        assert_eq!(suggestions[0].kind, SuggestionKind::PortfolioHighRisk);
        assert!(suggestions[0].text.contains("TSLA"));
        assert_eq!(suggestions[0].severity, Severity::Critical);
    }

    #[test]
    fn test_exact_tier_boundaries_fall_to_lower_tier() {
        let at_high = generate_suggestions(&fixtures::three_stock_result(0.60, 1.5), &HashMap::new());
        assert_eq!(at_high[0].kind, SuggestionKind::PortfolioModerateRisk);

        let at_moderate = generate_suggestions(&fixtures::three_stock_result(0.30, 1.5), &HashMap::new());
        assert_eq!(at_moderate[0].kind, SuggestionKind::PortfolioLowRisk);
    }

    #[test]
    fn test_instrument_rules_fire_independently_in_stock_order() {
        let risky = StockMetrics {
            risk_prob: 0.55,
            sharpe_ratio: 0.2,
            ..fixtures::stock("AMZN")
        };
        let weak = StockMetrics {
            sharpe_ratio: 0.4,
            ..fixtures::stock("META")
        };
        let result = fixtures::result(0.2, 1.5, vec![risky, fixtures::stock("AAPL"), weak]);
        let suggestions = generate_suggestions(&result, &HashMap::new());

        let instrument: Vec<(SuggestionKind, Option<String>)> = suggestions
            .iter()
            .skip(1)
            .map(|s| (s.kind, s.ticker.clone()))
            .collect();
        assert_eq!(
            instrument,
            vec![
                (SuggestionKind::InstrumentHighRisk, Some("AMZN".to_string())),
                (SuggestionKind::InstrumentLowSharpe, Some("AMZN".to_string())),
                (SuggestionKind::InstrumentLowSharpe, Some("META".to_string())),
            ]
        );
    }

    #[test]
    fn test_negative_sentiment_once_per_ticker_and_missing_is_skipped() {
        let result = fixtures::three_stock_result(0.25, 1.5);
        let sentiment = HashMap::from([
            ("AAPL".to_string(), -0.4),
            ("TSLA".to_string(), 0.3),
        ]);
        let suggestions = generate_suggestions(&result, &sentiment);

        let negative: Vec<&Suggestion> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::NegativeSentiment)
            .collect();
        assert_eq!(negative.len(), 1);
        assert_eq!(negative[0].ticker.as_deref(), Some("AAPL"));
        assert!(negative[0].text.contains("AAPL"));
        assert!(!suggestions.iter().any(|s| s.ticker.as_deref() == Some("NVDA")));
    }

    #[test]
    fn test_sentiment_suggestions_come_after_numeric_rules() {
        let weak = StockMetrics {
            sharpe_ratio: 0.1,
            ..fixtures::stock("NVDA")
        };
        let result = fixtures::result(0.2, 1.5, vec![fixtures::stock("AAPL"), weak]);
        let sentiment = HashMap::from([("AAPL".to_string(), -0.2)]);
        let suggestions = generate_suggestions(&result, &sentiment);

        assert_eq!(
            kinds(&suggestions),
            vec![
                SuggestionKind::PortfolioLowRisk,
                SuggestionKind::InstrumentLowSharpe,
                SuggestionKind::NegativeSentiment,
            ]
        );
    }

    #[test]
    fn test_is_idempotent() {
        let result = fixtures::three_stock_result(0.75, 0.3);
        let sentiment = result.sentiment_by_ticker();
        assert_eq!(
            generate_suggestions(&result, &sentiment),
            generate_suggestions(&result, &sentiment)
        );
    }
}
