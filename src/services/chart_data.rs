use crate::models::{
    ChartDataset, ChartKind, ChartSpec, ScatterSeries, SimulationResult, XyPoint, TRADING_DAYS_PER_YEAR,
};

/// Charts in the order they appear in the report.
pub fn required_charts(result: &SimulationResult) -> Vec<ChartKind> {
    let mut charts = vec![
        ChartKind::PortfolioNpvHistogram,
        ChartKind::CumulativeProbability,
        ChartKind::RiskReturnScatter,
    ];
    for stock in &result.stocks {
        charts.push(ChartKind::InstrumentNpvHistogram(stock.ticker.clone()));
        charts.push(ChartKind::InstrumentPriceHistory(stock.ticker.clone()));
    }
    charts
}

/// Dataset for one chart. `None` when the chart names an instrument that is
/// not part of the result.
pub fn chart_spec(kind: &ChartKind, result: &SimulationResult) -> Option<ChartSpec> {
    let (x_axis, y_axis, dataset) = match kind {
        ChartKind::PortfolioNpvHistogram => (
            "Trial",
            "NPV (€)",
            npv_bars("Portfolio NPV", &result.portfolio.npv_values),
        ),
        ChartKind::CumulativeProbability => (
            "NPV (€)",
            "Cumulative Probability",
            ChartDataset::Line {
                label: "Cumulative Probability".to_string(),
                labels: result
                    .portfolio
                    .cumulative_prob
                    .iter()
                    .map(|p| format!("{:.2}", p.npv))
                    .collect(),
                values: result.portfolio.cumulative_prob.iter().map(|p| p.prob).collect(),
            },
        ),
        ChartKind::RiskReturnScatter => (
            "Historical Volatility (%)",
            "Predicted Annual Return (%)",
            ChartDataset::Scatter {
                series: result
                    .stocks
                    .iter()
                    .map(|s| ScatterSeries {
                        label: s.ticker.clone(),
                        points: vec![XyPoint {
                            x: s.historical_volatility * 100.0,
                            y: s.predicted_mean_return * TRADING_DAYS_PER_YEAR * 100.0,
                        }],
                    })
                    .collect(),
            },
        ),
        ChartKind::InstrumentNpvHistogram(ticker) => {
            let stock = result.stock(ticker)?;
            ("Trial", "NPV (€)", npv_bars(&format!("{} NPV", ticker), &stock.npv_values))
        }
        ChartKind::InstrumentPriceHistory(ticker) => {
            let stock = result.stock(ticker)?;
            (
                "Day",
                "Price",
                ChartDataset::Line {
                    label: format!("{} Price", ticker),
                    labels: (0..stock.historical_prices.len()).map(|i| i.to_string()).collect(),
                    values: stock.historical_prices.clone(),
                },
            )
        }
    };

    Some(ChartSpec {
        section_id: kind.section_id(),
        title: kind.title(),
        x_axis: x_axis.to_string(),
        y_axis: y_axis.to_string(),
        dataset,
    })
}

fn npv_bars(label: &str, values: &[f64]) -> ChartDataset {
    ChartDataset::Bar {
        label: label.to_string(),
        labels: (1..=values.len()).map(|i| format!("Trial {}", i)).collect(),
        values: values.to_vec(),
    }
}
