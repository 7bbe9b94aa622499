use crate::core::{AnalysisReport, InventoryTable, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Result of a full run: where the exports went and what was computed.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: String,
    pub report: AnalysisReport,
}

pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting inventory analysis...");
        self.monitor.log_stats("Start");

        // Extract
        let table = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} rows, {} columns from {}",
            table.rows.len(),
            table.headers.len(),
            table.source_name
        );
        self.monitor.log_stats("Extract");

        // Transform
        let report = self.pipeline.transform(table).await?;
        tracing::info!(
            "🔄 Analysed {} materials: {} price forecasts, {} replenishment events",
            report.histories.len(),
            report.forecasts.len(),
            report.replenishments.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            output_path,
            report,
        })
    }

    /// Extract only, for dry runs.
    pub async fn inspect(&self) -> Result<InventoryTable> {
        self.pipeline.extract().await
    }
}
