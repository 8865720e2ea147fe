use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::external::news_provider::NewsProvider;
use crate::external::simulation_provider::SimulationProvider;
use crate::models::SimulationRun;
use crate::services::chart_surface::ChartSurfaceRegistry;
use crate::services::history_service::SimulationHistory;
use crate::services::report_compositor::ExportRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub simulation_provider: Arc<dyn SimulationProvider>,
    pub news_provider: Arc<dyn NewsProvider>,
    pub history: SimulationHistory,
    pub chart_surfaces: ChartSurfaceRegistry,
    pub exports: ExportRegistry,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        simulation_provider: Arc<dyn SimulationProvider>,
        news_provider: Arc<dyn NewsProvider>,
        history: SimulationHistory,
    ) -> Self {
        Self {
            config: Arc::new(config),
            simulation_provider,
            news_provider,
            history,
            chart_surfaces: ChartSurfaceRegistry::new(),
            exports: ExportRegistry::new(),
        }
    }

    pub fn run(&self, id: Uuid) -> Result<SimulationRun, AppError> {
        self.history.get(id).ok_or(AppError::NotFound)
    }
}
