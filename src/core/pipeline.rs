use crate::core::{
    ConfigProvider, EmptyIntersectionPolicy, Footprint, MissionData, MissionSource, Pipeline,
    Storage,
};
use crate::domain::model::Crs;
use crate::domain::ports::GeometryEngine;
use crate::geometry::{self, engine_for, ClipKind};
use crate::shapefile::{ShapefileBundle, ShapefileWriter};
use crate::utils::error::{FootprintError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Builds the footprint of one mission and stores it as a shapefile.
pub struct FootprintPipeline<S: Storage, C: ConfigProvider, M: MissionSource> {
    storage: S,
    config: C,
    source: M,
    mission_id: i64,
    engine: Box<dyn GeometryEngine>,
    writer: ShapefileWriter,
}

impl<S: Storage, C: ConfigProvider, M: MissionSource> FootprintPipeline<S, C, M> {
    pub fn new(storage: S, config: C, source: M, mission_id: i64) -> Self {
        let engine = engine_for(config.engine());
        Self {
            storage,
            config,
            source,
            mission_id,
            engine,
            writer: ShapefileWriter::new(),
        }
    }

    /// 替換 shapefile 寫入器 (例如固定 .dbf 日期)
    pub fn with_writer(mut self, writer: ShapefileWriter) -> Self {
        self.writer = writer;
        self
    }

    fn archive(stem: &str, bundle: &ShapefileBundle) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for (ext, bytes) in bundle.parts() {
            zip.start_file::<_, ()>(format!("{}.{}", stem, ext), FileOptions::default())?;
            zip.write_all(bytes)?;
        }

        // 完成並取回底層 Vec<u8>
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, M: MissionSource> Pipeline for FootprintPipeline<S, C, M> {
    async fn extract(&self) -> Result<MissionData> {
        let mission = self
            .source
            .list_missions()?
            .into_iter()
            .find(|m| m.id == self.mission_id)
            .ok_or(FootprintError::MissionNotFound {
                mission_id: self.mission_id,
            })?;

        let points = self.source.mission_points(self.mission_id)?;
        tracing::info!("Coordinates: {} photo positions", points.len());

        let reference = self.source.reference_area(self.mission_id)?;
        tracing::info!(
            "District: {} (reference area with {} vertices)",
            mission.local,
            reference.vertices().len()
        );

        Ok(MissionData {
            mission,
            points,
            reference,
        })
    }

    async fn transform(&self, data: MissionData) -> Result<Footprint> {
        let hull = geometry::build_hull_with(self.engine.as_ref(), &data.points)?;
        tracing::info!("Photo polygon: created ({} vertices)", hull.vertices().len());

        let outcome = geometry::clip_with_outcome(self.engine.as_ref(), &hull, &data.reference);
        match (&outcome.kind, self.config.empty_intersection_policy()) {
            (ClipKind::Fallback, EmptyIntersectionPolicy::Error) => {
                return Err(FootprintError::OutsideReferenceArea {
                    mission_id: data.mission.id,
                });
            }
            (ClipKind::Fallback, EmptyIntersectionPolicy::Fallback) => {
                tracing::warn!(
                    "⚠️ Mission {} does not overlap {}, using the unclipped photo polygon",
                    data.mission.id,
                    data.mission.local
                );
            }
            (ClipKind::LargestPiece { discarded }, _) => {
                tracing::warn!(
                    "⚠️ Dropped {} smaller piece(s) of the clipped polygon",
                    discarded
                );
            }
            (ClipKind::Clipped, _) => {}
        }

        Ok(Footprint {
            polygon: outcome.polygon,
            id: self.config.feature_id(),
            crs: Crs::Wgs84,
            mission_id: data.mission.id,
        })
    }

    async fn load(&self, footprint: Footprint) -> Result<String> {
        let stem = self.config.output_stem(footprint.mission_id);
        let bundle = self.writer.encode(&footprint.polygon, footprint.id)?;

        for (ext, bytes) in bundle.parts() {
            let name = format!("{}.{}", stem, ext);
            tracing::debug!("Writing {} ({} bytes) to storage", name, bytes.len());
            self.storage.write_file(&name, bytes).await?;
        }

        if self.config.archive_output() {
            let zip_data = Self::archive(&stem, &bundle)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage
                .write_file(&format!("{}.zip", stem), &zip_data)
                .await?;
        }

        let output_path = format!("{}/{}.shp", self.config.output_path(), stem);
        Ok(output_path)
    }
}
