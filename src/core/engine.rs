use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives the feed pipeline through its three stages with progress logging
/// and optional process monitoring.
pub struct FeedEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FeedEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Building personalized feed...");

        let inputs = self.pipeline.extract().await?;
        tracing::info!(
            "Fetched {} events ({} followed churches, location: {})",
            inputs.events.len(),
            inputs.followed_church_ids.len(),
            inputs
                .user_location
                .as_ref()
                .map(|loc| loc.display_address.as_str())
                .unwrap_or("none")
        );
        self.monitor.log_stats("extract");

        let feed = self.pipeline.transform(inputs).await?;
        tracing::info!("Ranked {} events", feed.event_count);
        self.monitor.log_stats("transform");

        let output_path = self.pipeline.load(feed).await?;
        tracing::info!("Feed saved to: {}", output_path);
        self.monitor.log_stats("load");

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        Ok(output_path)
    }
}
