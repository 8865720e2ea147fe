use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    AnalysisReport, CaptureWarning, ChartKind, NewsArticle, PageLayout, PortfolioMetrics, RasterizedImage,
    ReportDocument, ReportSection, RiskLevel, SectionContent, SimulationResult, StockMetrics,
    TRADING_DAYS_PER_YEAR,
};
use crate::services::chart_surface::ChartSurfaceLocator;
use crate::services::formatting::{eur, pct, ratio};

pub const REPORT_TITLE: &str = "Monte Carlo Simulation Report";

const MAX_NEWS_ITEMS: usize = 3;

/// Best-effort abort flag for one export. Once set, no further sentiment
/// lookups or sections are scheduled and the partial document is discarded.
#[derive(Debug, Clone, Default)]
pub struct ExportCancellation {
    cancelled: Arc<AtomicBool>,
    woken: Arc<Notify>,
}

impl ExportCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.woken.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the export has been cancelled
    pub async fn cancelled(&self) {
        loop {
            let notified = self.woken.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    fn same_as(&self, other: &ExportCancellation) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// In-flight exports per run. Cancelling a run stops its most recent export.
#[derive(Clone, Default)]
pub struct ExportRegistry {
    exports: Arc<DashMap<Uuid, ExportCancellation>>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, run_id: Uuid) -> ExportCancellation {
        let token = ExportCancellation::new();
        self.exports.insert(run_id, token.clone());
        token
    }

    /// Returns false when no export is running for the run
    pub fn cancel(&self, run_id: Uuid) -> bool {
        match self.exports.remove(&run_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn finish(&self, run_id: Uuid, token: &ExportCancellation) {
        self.exports.remove_if(&run_id, |_, current| current.same_as(token));
    }
}

/// Assemble the report for one simulation snapshot.
///
/// Charts are captured one at a time, in document order. A chart whose
/// surface cannot be located is replaced by an inline note and recorded as a
/// warning; only cancellation aborts composition.
pub async fn compose_report(
    result: &SimulationResult,
    analysis: &AnalysisReport,
    layout: PageLayout,
    locator: &dyn ChartSurfaceLocator,
    cancellation: &ExportCancellation,
) -> Result<ReportDocument, AppError> {
    info!("📝 Composing report for {} instruments", result.stocks.len());

    let mut doc = DocumentBuilder::new(layout, cancellation);

    doc.heading(REPORT_TITLE, 1)?;
    doc.heading("Portfolio Results", 2)?;
    doc.text(portfolio_summary(&result.portfolio))?;
    doc.chart(&ChartKind::PortfolioNpvHistogram, locator).await?;
    doc.chart(&ChartKind::CumulativeProbability, locator).await?;

    doc.heading("Individual Stock Results", 2)?;
    doc.chart(&ChartKind::RiskReturnScatter, locator).await?;
    for stock in &result.stocks {
        doc.heading(stock.ticker.clone(), 3)?;
        doc.text(stock_summary(stock))?;
        doc.text(recent_news(&stock.news_articles))?;
        doc.chart(&ChartKind::InstrumentNpvHistogram(stock.ticker.clone()), locator)
            .await?;
        doc.chart(&ChartKind::InstrumentPriceHistory(stock.ticker.clone()), locator)
            .await?;
    }

    doc.heading("Interpretations", 2)?;
    for interpretation in &analysis.interpretations {
        doc.text(bullet(&interpretation.text))?;
    }

    doc.heading("Suggestions", 2)?;
    if analysis.suggestions.is_empty() {
        doc.text("No suggestions at this time.")?;
    }
    for suggestion in &analysis.suggestions {
        doc.text(bullet(&suggestion.text))?;
    }

    let recommendation = &analysis.recommendation;
    doc.heading("Recommendation", 2)?;
    doc.text(format!("Decision: {}", recommendation.decision.label()))?;
    doc.text(recommendation.reason.clone())?;
    doc.text(recommendation.investment_decision.clone())?;

    let DocumentBuilder { sections, warnings, .. } = doc;
    info!(
        "✅ Report composed: {} sections, {} capture warnings",
        sections.len(),
        warnings.len()
    );

    Ok(ReportDocument {
        title: REPORT_TITLE.to_string(),
        generated_at: Utc::now(),
        layout,
        sections,
        warnings,
    })
}

/// Rendered height of a block, trailing gap included.
pub fn estimate_height(content: &SectionContent, layout: &PageLayout) -> f64 {
    let body = match content {
        SectionContent::Heading { text, level } => {
            let line_height = heading_line_height(*level, layout);
            let chars = (layout.chars_per_line() as f64 * layout.line_height_mm / line_height).floor();
            wrapped_lines(text, chars.max(1.0) as usize) as f64 * line_height
        }
        SectionContent::TextBlock { text } => {
            wrapped_lines(text, layout.chars_per_line()) as f64 * layout.line_height_mm
        }
        // Caption line above the image
        SectionContent::ChartImage { height_mm, .. } => layout.line_height_mm + height_mm,
    };
    body + layout.block_gap_mm
}

/// Number of lines `text` occupies when wrapped at `chars_per_line`
pub fn wrapped_lines(text: &str, chars_per_line: usize) -> usize {
    let chars_per_line = chars_per_line.max(1);
    text.lines()
        .map(|line| line.chars().count().div_ceil(chars_per_line).max(1))
        .sum::<usize>()
        .max(1)
}

fn heading_line_height(level: u8, layout: &PageLayout) -> f64 {
    match level {
        1 => layout.line_height_mm * 2.0,
        2 => layout.line_height_mm * 1.5,
        _ => layout.line_height_mm * 1.25,
    }
}

/// Full content width at the image's aspect ratio, scaled down so image and
/// caption fit on one page.
fn chart_dimensions(image: &RasterizedImage, layout: &PageLayout) -> (f64, f64) {
    let mut width = layout.content_width();
    let mut height = width * image.height_px as f64 / image.width_px as f64;

    let max_height = (layout.content_height() - layout.line_height_mm - layout.block_gap_mm).max(0.0);
    if height > max_height && height > 0.0 {
        width *= max_height / height;
        height = max_height;
    }
    (width, height)
}

struct DocumentBuilder<'a> {
    layout: PageLayout,
    sections: Vec<ReportSection>,
    warnings: Vec<CaptureWarning>,
    cancellation: &'a ExportCancellation,
}

impl<'a> DocumentBuilder<'a> {
    fn new(layout: PageLayout, cancellation: &'a ExportCancellation) -> Self {
        Self {
            layout,
            sections: Vec::new(),
            warnings: Vec::new(),
            cancellation,
        }
    }

    fn check_cancelled(&self) -> Result<(), AppError> {
        if self.cancellation.is_cancelled() {
            info!("Report export cancelled after {} sections", self.sections.len());
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    fn push(&mut self, content: SectionContent) -> Result<(), AppError> {
        self.check_cancelled()?;
        let estimated_height_mm = estimate_height(&content, &self.layout);
        self.sections.push(ReportSection {
            content,
            estimated_height_mm,
        });
        Ok(())
    }

    fn heading(&mut self, text: impl Into<String>, level: u8) -> Result<(), AppError> {
        self.push(SectionContent::Heading {
            text: text.into(),
            level,
        })
    }

    fn text(&mut self, text: impl Into<String>) -> Result<(), AppError> {
        self.push(SectionContent::TextBlock { text: text.into() })
    }

    async fn chart(&mut self, kind: &ChartKind, locator: &dyn ChartSurfaceLocator) -> Result<(), AppError> {
        self.check_cancelled()?;

        let section_id = kind.section_id();
        let title = kind.title();

        match locator.locate(&section_id).await {
            Some(image) if !image.is_empty() => {
                let (width_mm, height_mm) = chart_dimensions(&image, &self.layout);
                self.push(SectionContent::ChartImage {
                    section_id,
                    title,
                    image,
                    width_mm,
                    height_mm,
                })
            }
            captured => {
                let message = if captured.is_some() {
                    "Chart surface produced an empty image"
                } else {
                    "Chart surface could not be located"
                };
                warn!("⚠️ Skipping chart {}: {}", section_id, message);
                self.warnings.push(CaptureWarning {
                    section_id,
                    title: title.clone(),
                    message: message.to_string(),
                });
                self.text(format!("[Chart unavailable: {}]", title))
            }
        }
    }
}

fn bullet(text: &str) -> String {
    format!("• {}", text)
}

fn portfolio_summary(portfolio: &PortfolioMetrics) -> String {
    [
        format!("Mean NPV: {}", eur(portfolio.mean_npv)),
        format!("Risk Probability: {}", pct(portfolio.risk_prob)),
        format!("VaR (95%): {}", eur(portfolio.var_95)),
        format!("Sharpe Ratio: {}", ratio(portfolio.sharpe_ratio)),
        format!("Risk Level: {}", RiskLevel::from_probability(portfolio.risk_prob)),
    ]
    .join("\n")
}

fn stock_summary(stock: &StockMetrics) -> String {
    let sentiment = match stock.sentiment_score {
        Some(score) if score > 0.0 => format!("{} (Positive)", pct(score)),
        Some(score) => format!("{} (Negative)", pct(score)),
        None => "N/A".to_string(),
    };

    [
        format!("Mean NPV: {}", eur(stock.mean_npv)),
        format!("Risk Probability: {}", pct(stock.risk_prob)),
        format!("VaR (95%): {}", eur(stock.var_95)),
        format!("Sharpe Ratio: {}", ratio(stock.sharpe_ratio)),
        format!(
            "Predicted Annual Return: {} (95% CI: {} to {})",
            pct(stock.annual_predicted_return()),
            pct(stock.ci_lower * TRADING_DAYS_PER_YEAR),
            pct(stock.ci_upper * TRADING_DAYS_PER_YEAR)
        ),
        format!("Historical Volatility: {}", pct(stock.historical_volatility)),
        format!("Trend: {}", stock.trend),
        format!("Sentiment Score: {}", sentiment),
        format!("Risk Level: {}", RiskLevel::from_probability(stock.risk_prob)),
    ]
    .join("\n")
}

fn recent_news(articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return "Recent news: No recent news available".to_string();
    }

    let mut lines = vec!["Recent news:".to_string()];
    for article in articles.iter().take(MAX_NEWS_ITEMS) {
        let line = match article.published_at {
            Some(published) => format!(
                "{} — {}, {}",
                article.title,
                article.source,
                published.format("%Y-%m-%d")
            ),
            None => format!("{} — {}", article.title, article.source),
        };
        lines.push(bullet(&line));
    }
    lines.join("\n")
}
