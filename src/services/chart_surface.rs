use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::models::RasterizedImage;

/// Finds the rendered surface for a chart section and rasterizes it.
///
/// `None` means the surface could not be located (never rendered, or not
/// paintable before the capture deadline).
#[async_trait]
pub trait ChartSurfaceLocator: Send + Sync {
    async fn locate(&self, section_id: &str) -> Option<RasterizedImage>;
}

/// Chart images uploaded by the presentation layer, keyed by run and section.
#[derive(Clone, Default)]
pub struct ChartSurfaceRegistry {
    surfaces: Arc<DashMap<(Uuid, String), RasterizedImage>>,
    updated: Arc<Notify>,
}

impl ChartSurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the latest frame of a surface and wake pending captures
    pub fn register(&self, run_id: Uuid, section_id: &str, image: RasterizedImage) {
        debug!(
            "Registered chart surface {}/{} ({}x{})",
            run_id, section_id, image.width_px, image.height_px
        );
        self.surfaces.insert((run_id, section_id.to_string()), image);
        self.updated.notify_waiters();
    }

    pub fn get(&self, run_id: Uuid, section_id: &str) -> Option<RasterizedImage> {
        self.surfaces
            .get(&(run_id, section_id.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Drop every surface belonging to a run
    pub fn clear_run(&self, run_id: Uuid) {
        self.surfaces.retain(|(id, _), _| *id != run_id);
    }

    /// Locator bound to one run, waiting up to `timeout` for each surface
    pub fn for_run(&self, run_id: Uuid, timeout: Duration) -> RunChartSurfaces {
        RunChartSurfaces {
            registry: self.clone(),
            run_id,
            timeout,
        }
    }
}

pub struct RunChartSurfaces {
    registry: ChartSurfaceRegistry,
    run_id: Uuid,
    timeout: Duration,
}

#[async_trait]
impl ChartSurfaceLocator for RunChartSurfaces {
    async fn locate(&self, section_id: &str) -> Option<RasterizedImage> {
        let deadline = Instant::now() + self.timeout;

        loop {
            // Subscribe before looking so an upload between the two is not missed
            let notified = self.registry.updated.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(image) = self.registry.get(self.run_id, section_id) {
                return Some(image);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                debug!("Chart surface {}/{} not available in time", self.run_id, section_id);
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> RasterizedImage {
        RasterizedImage::png(800, 400, vec![0x89, 0x50, 0x4e, 0x47])
    }

    #[tokio::test]
    async fn test_locate_registered_surface() {
        let registry = ChartSurfaceRegistry::new();
        let run_id = Uuid::new_v4();
        registry.register(run_id, "portfolio-npv", image());

        let locator = registry.for_run(run_id, Duration::from_millis(10));
        assert_eq!(locator.locate("portfolio-npv").await, Some(image()));
    }

    #[tokio::test]
    async fn test_locate_waits_for_late_upload() {
        let registry = ChartSurfaceRegistry::new();
        let run_id = Uuid::new_v4();
        let locator = registry.for_run(run_id, Duration::from_secs(5));

        let uploader = registry.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            uploader.register(run_id, "AAPL-price", image());
        });

        assert!(locator.locate("AAPL-price").await.is_some());
    }

    #[tokio::test]
    async fn test_locate_missing_surface_times_out() {
        let registry = ChartSurfaceRegistry::new();
        let run_id = Uuid::new_v4();
        registry.register(Uuid::new_v4(), "risk-return", image());

        let locator = registry.for_run(run_id, Duration::from_millis(20));
        assert!(locator.locate("risk-return").await.is_none());
    }

    #[test]
    fn test_clear_run_only_touches_that_run() {
        let registry = ChartSurfaceRegistry::new();
        let keep = Uuid::new_v4();
        let gone = Uuid::new_v4();
        registry.register(keep, "risk-return", image());
        registry.register(gone, "risk-return", image());

        registry.clear_run(gone);

        assert!(registry.get(keep, "risk-return").is_some());
        assert!(registry.get(gone, "risk-return").is_none());
    }
}
