use serde::{Deserialize, Serialize};

/// An instrument singled out by an extreme value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentExtreme {
    pub ticker: String,
    pub value: f64,
}

/// Structured values behind an interpretation statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterpretationDetail {
    NpvRange {
        min_npv: f64,
        max_npv: f64,
        mean_npv: f64,
        years: u32,
    },
    BreakEven {
        /// Fraction in [0, 1]
        break_even_probability: f64,
        risk_probability: f64,
        var_95: f64,
    },
    RiskReturnExtremes {
        /// Daily historical volatility of the most volatile instrument
        most_volatile: InstrumentExtreme,
        /// Annualized predicted return of the best instrument
        highest_return: InstrumentExtreme,
    },
}

/// A descriptive statement about the simulation results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interpretation {
    pub text: String,
    #[serde(flatten)]
    pub detail: InterpretationDetail,
}

/// Severity level of a suggestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,      // advisory, nothing to act on yet
    Warning,   // worth reviewing
    High,      // instrument-level breach
    Critical,  // portfolio-level breach
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Which rule produced a suggestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    PortfolioHighRisk,
    PortfolioModerateRisk,
    PortfolioLowRisk,
    PortfolioLowSharpe,
    InstrumentHighRisk,
    InstrumentLowSharpe,
    NegativeSentiment,
}

impl SuggestionKind {
    pub fn severity(&self) -> Severity {
        match self {
            SuggestionKind::PortfolioHighRisk => Severity::Critical,
            SuggestionKind::InstrumentHighRisk => Severity::High,
            SuggestionKind::PortfolioModerateRisk
            | SuggestionKind::PortfolioLowSharpe
            | SuggestionKind::InstrumentLowSharpe
            | SuggestionKind::NegativeSentiment => Severity::Warning,
            SuggestionKind::PortfolioLowRisk => Severity::Info,
        }
    }
}

/// An actionable warning derived from a threshold breach
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub severity: Severity,
    /// Instrument the suggestion is about, if any
    pub ticker: Option<String>,
    pub text: String,
}

/// Three-way investment decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Go,
    ProceedWithCaution,
    NoGo,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Go => "Go",
            Decision::ProceedWithCaution => "Proceed with Caution",
            Decision::NoGo => "No-Go",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub decision: Decision,
    pub reason: String,
    pub investment_decision: String,
}

/// Everything the engine derives from one simulation snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub interpretations: Vec<Interpretation>,
    pub suggestions: Vec<Suggestion>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisQuery {
    /// Re-fetch sentiment from the news service instead of using the run's scores
    #[serde(default)]
    pub refresh_sentiment: bool,
}
