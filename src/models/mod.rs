mod analysis;
mod chart;
mod history;
mod news;
mod report;
mod simulation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use analysis::{
    AnalysisQuery, AnalysisReport, Decision, InstrumentExtreme, Interpretation,
    InterpretationDetail, Recommendation, Severity, Suggestion, SuggestionKind,
};
pub use chart::{ChartDataset, ChartKind, ChartSpec, ScatterSeries, XyPoint};
pub use history::{CompareQuery, ComparisonSeries, RunComparison, SimulationResponse, SimulationRun};
pub use news::{NewsArticle, TickerNews};
pub use report::{
    CaptureWarning, Page, PageLayout, PaginatedReport, PlacedBlock, RasterizedImage,
    ReportDocument, ReportSection, SectionContent, SectionKind,
};
pub use simulation::{
    CumulativePoint, PortfolioMetrics, RiskLevel, SimulationRequest, SimulationResult,
    StockMetrics, Trend, TRADING_DAYS_PER_YEAR,
};
