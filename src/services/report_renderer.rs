use tracing::info;

use crate::errors::AppError;
use crate::models::{
    AnalysisReport, Page, PaginatedReport, PlacedBlock, ReportDocument, RiskLevel, SimulationResult,
};

/// Lay sections out on fixed-size pages.
///
/// A block that does not fit below the current offset starts a new page; it
/// is never split. A block taller than an empty page goes alone on a fresh
/// page and is flagged as overflowing.
pub fn paginate(doc: &ReportDocument) -> PaginatedReport {
    let page_height = doc.layout.content_height();

    let mut pages: Vec<Page> = Vec::new();
    let mut blocks: Vec<PlacedBlock> = Vec::new();
    let mut y = 0.0;

    for section in &doc.sections {
        let height = section.estimated_height_mm;

        if !blocks.is_empty() && y + height > page_height {
            pages.push(Page {
                number: pages.len() + 1,
                blocks: std::mem::take(&mut blocks),
            });
            y = 0.0;
        }

        blocks.push(PlacedBlock {
            y_mm: y,
            height_mm: height,
            overflow: height > page_height,
            content: section.content.clone(),
        });
        y += height;
    }

    if !blocks.is_empty() || pages.is_empty() {
        pages.push(Page {
            number: pages.len() + 1,
            blocks,
        });
    }

    info!(
        "Paginated {} sections onto {} pages",
        doc.sections.len(),
        pages.len()
    );

    PaginatedReport {
        title: doc.title.clone(),
        generated_at: doc.generated_at,
        layout: doc.layout,
        page_count: pages.len(),
        pages,
        warnings: doc.warnings.clone(),
    }
}

/// Plain-text rendering, one block per line group
pub fn render_text(report: &PaginatedReport) -> String {
    let mut out = String::new();
    for page in &report.pages {
        out.push_str(&format!("=== Page {} of {} ===\n", page.number, report.page_count));
        for block in &page.blocks {
            out.push_str(&block.content.plain_text());
            out.push('\n');
        }
    }
    if !report.warnings.is_empty() {
        out.push_str("=== Warnings ===\n");
        for warning in &report.warnings {
            out.push_str(&format!("{} ({}): {}\n", warning.title, warning.section_id, warning.message));
        }
    }
    out
}

const CSV_HEADER: [&str; 12] = [
    "Section",
    "Item",
    "Mean NPV",
    "Risk Probability (%)",
    "VaR (95%)",
    "Sharpe Ratio",
    "Risk Level",
    "Predicted Annual Return (%)",
    "Historical Volatility (%)",
    "Trend",
    "Sentiment Score (%)",
    "Text",
];

/// Flat tabular export, in the same order as the document: portfolio,
/// instruments, interpretations, suggestions, recommendation.
pub fn export_csv(result: &SimulationResult, analysis: &AnalysisReport) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    let portfolio = &result.portfolio;
    writer.write_record([
        "Portfolio".to_string(),
        "Portfolio".to_string(),
        number(portfolio.mean_npv),
        number(portfolio.risk_prob * 100.0),
        number(portfolio.var_95),
        number(portfolio.sharpe_ratio),
        RiskLevel::from_probability(portfolio.risk_prob).to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
    ])?;

    for stock in &result.stocks {
        writer.write_record([
            "Stock".to_string(),
            stock.ticker.clone(),
            number(stock.mean_npv),
            number(stock.risk_prob * 100.0),
            number(stock.var_95),
            number(stock.sharpe_ratio),
            RiskLevel::from_probability(stock.risk_prob).to_string(),
            number(stock.annual_predicted_return() * 100.0),
            number(stock.historical_volatility * 100.0),
            stock.trend.to_string(),
            stock.sentiment_score.map(|s| number(s * 100.0)).unwrap_or_default(),
            String::new(),
        ])?;
    }

    for (i, interpretation) in analysis.interpretations.iter().enumerate() {
        writer.write_record(text_row("Interpretation", &(i + 1).to_string(), &interpretation.text))?;
    }

    for suggestion in &analysis.suggestions {
        writer.write_record(text_row("Suggestion", suggestion.severity.as_str(), &suggestion.text))?;
    }

    let recommendation = &analysis.recommendation;
    writer.write_record(text_row("Recommendation", "Reason", &recommendation.reason))?;
    writer.write_record(text_row(
        "Recommendation",
        recommendation.decision.label(),
        &recommendation.investment_decision,
    ))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(format!("CSV is not valid UTF-8: {}", e)))
}

fn number(value: f64) -> String {
    format!("{:.2}", value)
}

fn text_row(section: &str, item: &str, text: &str) -> [String; 12] {
    let mut row: [String; 12] = Default::default();
    row[0] = section.to_string();
    row[1] = item.to_string();
    row[11] = text.to_string();
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, PageLayout, ReportSection, SectionContent};
    use crate::services::analysis_service::analyze;
    use chrono::Utc;

    fn block(height: f64) -> ReportSection {
        ReportSection {
            content: SectionContent::TextBlock {
                text: format!("{} mm", height),
            },
            estimated_height_mm: height,
        }
    }

    fn document(sections: Vec<ReportSection>) -> ReportDocument {
        ReportDocument {
            title: "Test".to_string(),
            generated_at: Utc::now(),
            layout: PageLayout::a4(),
            sections,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_single_break_at_first_overflowing_section() {
        // content height on A4 with 10 mm margins is 277 mm
        let doc = document(vec![block(100.0), block(100.0), block(70.0), block(10.0), block(50.0)]);
        let report = paginate(&doc);

        assert_eq!(report.page_count, 2);
        assert_eq!(report.pages[0].blocks.len(), 3);
        assert_eq!(report.pages[1].blocks.len(), 2);
        assert_eq!(report.pages[1].blocks[0].y_mm, 0.0);
        assert!(report.pages.iter().flat_map(|p| &p.blocks).all(|b| !b.overflow));
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let doc = document(vec![block(200.0), block(77.0)]);
        assert_eq!(paginate(&doc).page_count, 1);
    }

    #[test]
    fn test_oversized_block_gets_its_own_page() {
        let doc = document(vec![block(20.0), block(400.0), block(20.0)]);
        let report = paginate(&doc);

        assert_eq!(report.page_count, 3);
        assert_eq!(report.pages[1].blocks.len(), 1);
        assert!(report.pages[1].blocks[0].overflow);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let report = paginate(&document(Vec::new()));
        assert_eq!(report.page_count, 1);
        assert!(report.pages[0].blocks.is_empty());
    }

    #[test]
    fn test_render_text_marks_pages() {
        let report = paginate(&document(vec![block(200.0), block(100.0)]));
        let text = render_text(&report);
        assert!(text.starts_with("=== Page 1 of 2 ===\n200 mm\n"));
        assert!(text.contains("=== Page 2 of 2 ===\n100 mm\n"));
    }

    #[test]
    fn test_csv_carries_recommendation_reason() {
        let result = fixtures::result(0.45, 0.8, vec![fixtures::stock("AAPL")]);
        let analysis = analyze(&result, 5, &result.sentiment_by_ticker());
        let csv = export_csv(&result, &analysis).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        let reason = &rows[rows.len() - 2];
        assert_eq!(&reason[0], "Recommendation");
        assert_eq!(&reason[1], "Reason");
        assert_eq!(&reason[11], analysis.recommendation.reason.as_str());

        let decision = &rows[rows.len() - 1];
        assert_eq!(&decision[1], analysis.recommendation.decision.label());
    }
}
