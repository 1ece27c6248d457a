use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline through extract, transform and load.
pub struct FootprintEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FootprintEngine<P> {
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
        tracing::info!("🚀 Starting footprint process...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📥 Loading mission data...");
        let data = self.pipeline.extract().await?;
        tracing::info!(
            "Mission {} ({}): {} photo positions",
            data.mission.id,
            data.mission.local,
            data.points.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("📐 Building footprint polygon...");
        let footprint = self.pipeline.transform(data).await?;
        tracing::info!(
            "Footprint: {} vertices, area {:.10}",
            footprint.polygon.vertices().len(),
            footprint.polygon.area()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing shapefile...");
        let output_path = self.pipeline.load(footprint).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Footprint, MissionData};
    use crate::domain::model::{Crs, Mission, Point, Polygon};
    use crate::utils::error::FootprintError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<MissionData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reference = Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])?;
            Ok(MissionData {
                mission: Mission {
                    id: 1,
                    local: "Lisboa".to_string(),
                },
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)],
                reference,
            })
        }

        async fn transform(&self, data: MissionData) -> Result<Footprint> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(FootprintError::empty_geometry("no area"));
            }
            Ok(Footprint {
                polygon: data.reference,
                id: 1,
                crs: Crs::Wgs84,
                mission_id: data.mission.id,
            })
        }

        async fn load(&self, footprint: Footprint) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("out/mission_{}_polygon.shp", footprint.mission_id))
        }
    }

    #[tokio::test]
    async fn test_run_calls_all_phases() {
        let engine = FootprintEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });

        let output = engine.run().await.unwrap();
        assert_eq!(output, "out/mission_1_polygon.shp");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_at_failed_phase() {
        let engine = FootprintEngine::new_with_monitoring(
            CountingPipeline {
                calls: AtomicUsize::new(0),
                fail_transform: true,
            },
            false,
        );

        assert!(matches!(
            engine.run().await,
            Err(FootprintError::EmptyGeometry { .. })
        ));
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
