use crate::models::{
    CumulativePoint, InstrumentExtreme, Interpretation, InterpretationDetail, SimulationResult,
};
use crate::services::formatting::{eur, pct};

/// Describe the simulation results in plain language.
///
/// Output order is fixed: NPV range, break-even/VaR, then risk/return
/// extremes across instruments (omitted only when there are no instruments).
/// Pure function of its inputs.
pub fn generate_interpretations(result: &SimulationResult, years: u32) -> Vec<Interpretation> {
    let portfolio = &result.portfolio;
    let mut interpretations = Vec::with_capacity(3);

    let (min_npv, max_npv) = npv_range(&portfolio.npv_values).unwrap_or((portfolio.mean_npv, portfolio.mean_npv));
    interpretations.push(Interpretation {
        text: format!(
            "Over a {}-year horizon, the simulated portfolio NPV ranges from {} to {}, with a mean of {}.",
            years,
            eur(min_npv),
            eur(max_npv),
            eur(portfolio.mean_npv)
        ),
        detail: InterpretationDetail::NpvRange {
            min_npv,
            max_npv,
            mean_npv: portfolio.mean_npv,
            years,
        },
    });

    let break_even = break_even_probability(&portfolio.cumulative_prob);
    interpretations.push(Interpretation {
        text: format!(
            "The probability of breaking even (NPV of zero or more) is {}. The probability of a loss is {}, and at 95% confidence the loss should not exceed {} (VaR).",
            pct(break_even),
            pct(portfolio.risk_prob),
            eur(portfolio.var_95)
        ),
        detail: InterpretationDetail::BreakEven {
            break_even_probability: break_even,
            risk_probability: portfolio.risk_prob,
            var_95: portfolio.var_95,
        },
    });

    if let Some((most_volatile, highest_return)) = risk_return_extremes(result) {
        interpretations.push(Interpretation {
            text: format!(
                "{} carries the highest historical volatility ({}), while {} has the highest predicted annual return ({}).",
                most_volatile.ticker,
                pct(most_volatile.value),
                highest_return.ticker,
                pct(highest_return.value)
            ),
            detail: InterpretationDetail::RiskReturnExtremes {
                most_volatile,
                highest_return,
            },
        });
    }

    interpretations
}

/// Cumulative probability at the smallest npv >= 0, or 0 if the curve never
/// reaches zero. Expects the curve sorted ascending by npv.
pub fn break_even_probability(curve: &[CumulativePoint]) -> f64 {
    curve
        .iter()
        .find(|p| p.npv >= 0.0)
        .map(|p| p.prob)
        .unwrap_or(0.0)
}

fn npv_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Instrument with the highest volatility and the one with the highest
/// annualized predicted return. Ties go to the first in iteration order.
pub fn risk_return_extremes(result: &SimulationResult) -> Option<(InstrumentExtreme, InstrumentExtreme)> {
    let mut stocks = result.stocks.iter();
    let first = stocks.next()?;

    let mut most_volatile = first;
    let mut highest_return = first;
    for stock in stocks {
        if stock.historical_volatility > most_volatile.historical_volatility {
            most_volatile = stock;
        }
        if stock.annual_predicted_return() > highest_return.annual_predicted_return() {
            highest_return = stock;
        }
    }

    Some((
        InstrumentExtreme {
            ticker: most_volatile.ticker.clone(),
            value: most_volatile.historical_volatility,
        },
        InstrumentExtreme {
            ticker: highest_return.ticker.clone(),
            value: highest_return.annual_predicted_return(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use crate::models::StockMetrics;

    #[test]
    fn test_produces_three_statements_in_order() {
        let result = fixtures::three_stock_result(0.25, 1.5);
        let interpretations = generate_interpretations(&result, 5);

        assert_eq!(interpretations.len(), 3);
        assert!(matches!(interpretations[0].detail, InterpretationDetail::NpvRange { .. }));
        assert!(matches!(interpretations[1].detail, InterpretationDetail::BreakEven { .. }));
        assert!(matches!(interpretations[2].detail, InterpretationDetail::RiskReturnExtremes { .. }));
    }

    #[test]
    fn test_npv_range_uses_trial_extremes() {
        let result = fixtures::three_stock_result(0.25, 1.5);
        let interpretations = generate_interpretations(&result, 7);

        match &interpretations[0].detail {
            InterpretationDetail::NpvRange { min_npv, max_npv, mean_npv, years } => {
                assert_eq!(*min_npv, -80_000.0);
                assert_eq!(*max_npv, 310_000.0);
                assert_eq!(*mean_npv, 120_000.0);
                assert_eq!(*years, 7);
            }
            other => panic!("unexpected detail: {:?}", other),
        }
        assert!(interpretations[0].text.contains("7-year"));
        assert!(interpretations[0].text.contains("-€80,000.00"));
    }

    #[test]
    fn test_break_even_reads_first_non_negative_point() {
        let result = fixtures::three_stock_result(0.25, 1.5);
        assert_eq!(break_even_probability(&result.portfolio.cumulative_prob), 0.3);

        let interpretations = generate_interpretations(&result, 5);
        assert!(interpretations[1].text.contains("30.00%"));
        assert!(!interpretations[1].text.contains("3000"));
    }

    #[test]
    fn test_break_even_defaults_to_zero_when_curve_is_negative() {
        let curve = vec![
            CumulativePoint { npv: -500.0, prob: 0.4 },
            CumulativePoint { npv: -1.0, prob: 1.0 },
        ];
        assert_eq!(break_even_probability(&curve), 0.0);
        assert_eq!(break_even_probability(&[]), 0.0);
    }

    #[test]
    fn test_zero_npv_counts_as_break_even() {
        let curve = vec![
            CumulativePoint { npv: -1.0, prob: 0.2 },
            CumulativePoint { npv: 0.0, prob: 0.45 },
            CumulativePoint { npv: 1.0, prob: 0.5 },
        ];
        assert_eq!(break_even_probability(&curve), 0.45);
    }

    #[test]
    fn test_extremes_pick_most_volatile_and_best_return() {
        let result = fixtures::three_stock_result(0.25, 1.5);
        let (volatile, best) = risk_return_extremes(&result).unwrap();

        assert_eq!(volatile.ticker, "TSLA");
        assert_eq!(best.ticker, "NVDA");
        assert!((best.value - 0.0011 * 252.0).abs() < 1e-12);
    }

    #[test]
    fn test_extremes_tie_goes_to_first_instrument() {
        let result = fixtures::result(
            0.2,
            1.2,
            vec![fixtures::stock("MSFT"), fixtures::stock("AAPL"), fixtures::stock("GOOGL")],
        );
        let (volatile, best) = risk_return_extremes(&result).unwrap();
        assert_eq!(volatile.ticker, "MSFT");
        assert_eq!(best.ticker, "MSFT");
    }

    #[test]
    fn test_no_instruments_omits_extremes() {
        let result = fixtures::result(0.2, 1.2, Vec::<StockMetrics>::new());
        let interpretations = generate_interpretations(&result, 5);
        assert_eq!(interpretations.len(), 2);
    }

    #[test]
    fn test_is_idempotent() {
        let result = fixtures::three_stock_result(0.45, 0.8);
        assert_eq!(generate_interpretations(&result, 5), generate_interpretations(&result, 5));
    }
}
