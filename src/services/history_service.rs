use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ComparisonSeries, RunComparison, SimulationRun};

pub const COMPARISON_METRICS: [&str; 4] = ["Mean NPV", "Risk Probability (%)", "VaR (95%)", "Sharpe Ratio"];

/// Ordered run history. Kept in memory and, when a path is configured,
/// mirrored to a JSON file after every change.
#[derive(Clone, Default)]
pub struct SimulationHistory {
    runs: Arc<RwLock<Vec<SimulationRun>>>,
    path: Option<PathBuf>,
    /// Serializes file writes so the newest snapshot always lands last
    write_lock: Arc<Mutex<()>>,
}

impl SimulationHistory {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the history file, starting empty if it is missing or unreadable
    pub fn load(path: Option<PathBuf>) -> Self {
        let runs = match path.as_deref() {
            Some(p) if p.exists() => read_runs(p).unwrap_or_else(|e| {
                warn!("Could not read run history from {}: {}", p.display(), e);
                Vec::new()
            }),
            _ => Vec::new(),
        };

        info!("📚 Loaded {} simulation runs", runs.len());
        Self {
            runs: Arc::new(RwLock::new(runs)),
            path,
            write_lock: Arc::default(),
        }
    }

    /// Returns the new run's position
    pub async fn append(&self, run: SimulationRun) -> usize {
        let index = {
            let mut runs = self.runs.write();
            runs.push(run);
            runs.len() - 1
        };
        self.persist().await;
        index
    }

    pub async fn delete(&self, index: usize) -> Result<SimulationRun, AppError> {
        let removed = {
            let mut runs = self.runs.write();
            if index >= runs.len() {
                return Err(AppError::NotFound);
            }
            runs.remove(index)
        };
        self.persist().await;
        Ok(removed)
    }

    pub fn list(&self) -> Vec<SimulationRun> {
        self.runs.read().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<SimulationRun> {
        self.runs.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.runs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.read().is_empty()
    }

    /// Side-by-side key metrics of two runs, addressed by position
    pub fn compare(&self, first: usize, second: usize) -> Result<RunComparison, AppError> {
        let runs = self.runs.read();
        let series = [first, second]
            .into_iter()
            .map(|index| -> Result<ComparisonSeries, AppError> {
                let run = runs.get(index).ok_or(AppError::NotFound)?;
                let portfolio = &run.results.portfolio;
                Ok(ComparisonSeries {
                    label: format!("Simulation {}", index + 1),
                    run_id: run.id,
                    initial_investment: run.params.initial_investment,
                    tickers: run.params.tickers.clone(),
                    weights: run.params.weights.clone(),
                    values: vec![
                        portfolio.mean_npv,
                        portfolio.risk_prob * 100.0,
                        portfolio.var_95,
                        portfolio.sharpe_ratio,
                    ],
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(RunComparison {
            metrics: COMPARISON_METRICS.iter().map(|m| m.to_string()).collect(),
            series,
        })
    }

    /// Write the current snapshot on the blocking pool
    async fn persist(&self) {
        let Some(path) = self.path.clone() else {
            return;
        };

        let history = self.clone();
        let written = tokio::task::spawn_blocking(move || {
            let _guard = history.write_lock.lock();
            let snapshot = history.list();
            write_runs(&path, &snapshot).map_err(|e| (path, e))
        })
        .await;

        match written {
            Ok(Ok(())) => {}
            Ok(Err((path, e))) => error!("Failed to save run history to {}: {}", path.display(), e),
            Err(e) => error!("Run history writer task failed: {}", e),
        }
    }
}

fn read_runs(path: &Path) -> anyhow::Result<Vec<SimulationRun>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_runs(path: &Path, runs: &[SimulationRun]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(runs)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
