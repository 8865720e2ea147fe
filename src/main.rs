use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use riskwise_backend::app;
use riskwise_backend::config::AppConfig;
use riskwise_backend::external::news_provider::HttpNewsProvider;
use riskwise_backend::external::simulation_provider::HttpSimulationProvider;
use riskwise_backend::logging::{init_logging, LoggingConfig};
use riskwise_backend::services::history_service::SimulationHistory;
use riskwise_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("📊 Simulation backend: {}", config.simulation_api_url);
    tracing::info!("📰 News backend: {}", config.news_api_url);

    let simulation_provider = HttpSimulationProvider::new(&config.simulation_api_url, config.upstream_timeout)
        .context("Failed to create simulation client")?;
    let news_provider = HttpNewsProvider::new(&config.news_api_url, config.upstream_timeout)
        .context("Failed to create news client")?;
    let history = SimulationHistory::load(config.history_path.clone());

    let addr = config.bind_addr;
    let state = AppState::new(config, Arc::new(simulation_provider), Arc::new(news_provider), history);
    let app = app::create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 RiskWise backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
