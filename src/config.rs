use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the service, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Base URL of the simulation backend (`/api/simulate` is appended)
    pub simulation_api_url: String,
    /// Base URL of the news backend (`/api/news` is appended)
    pub news_api_url: String,
    pub upstream_timeout: Duration,
    /// How long a chart capture waits for its surface to be uploaded
    pub chart_capture_timeout: Duration,
    pub history_path: Option<PathBuf>,
    pub cors_allow_any: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            simulation_api_url: "http://127.0.0.1:5000".to_string(),
            news_api_url: "http://127.0.0.1:5000".to_string(),
            upstream_timeout: Duration::from_secs(120),
            chart_capture_timeout: Duration::from_millis(2000),
            history_path: None,
            cors_allow_any: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| format!("Invalid BIND_ADDR '{}': {}", raw, e))?,
            Err(_) => defaults.bind_addr,
        };

        let simulation_api_url = std::env::var("SIMULATION_API_URL")
            .unwrap_or(defaults.simulation_api_url);
        let news_api_url = std::env::var("NEWS_API_URL")
            .unwrap_or_else(|_| simulation_api_url.clone());

        let upstream_timeout = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.upstream_timeout);

        let chart_capture_timeout = std::env::var("CHART_CAPTURE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.chart_capture_timeout);

        let config = Self {
            bind_addr,
            simulation_api_url,
            news_api_url,
            upstream_timeout,
            chart_capture_timeout,
            history_path: std::env::var("HISTORY_PATH").ok().map(PathBuf::from),
            cors_allow_any: std::env::var("CORS_ALLOW_ANY")
                .ok()
                .and_then(|s| s.parse::<bool>().ok())
                .unwrap_or(defaults.cors_allow_any),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, raw) in [
            ("SIMULATION_API_URL", &self.simulation_api_url),
            ("NEWS_API_URL", &self.news_api_url),
        ] {
            let parsed = url::Url::parse(raw).map_err(|e| format!("Invalid {} '{}': {}", name, raw, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("{} must use http or https, got '{}'", name, parsed.scheme()));
            }
        }
        if self.upstream_timeout.is_zero() {
            return Err("UPSTREAM_TIMEOUT_SECS must be positive".to_string());
        }
        Ok(())
    }
}
