use crate::domain::model::{Mission, Point, Polygon};
use crate::domain::ports::MissionSource;
use crate::utils::error::{FootprintError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// 對應照片座標表的一列
#[derive(Debug, Clone, Deserialize)]
struct PhotoRecord {
    mission_id: i64,
    longitude: f64,
    latitude: f64,
}

/// GeoJSON Polygon geometry.
#[derive(Debug, Clone, Deserialize)]
struct AreaGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    id: i64,
    local: String,
    area: Option<AreaGeometry>,
}

/// Mission source backed by a photo-position CSV and a JSON mission catalog.
#[derive(Debug, Clone, Default)]
pub struct FileMissionSource {
    missions: Vec<CatalogEntry>,
    points: BTreeMap<i64, Vec<Point>>,
}

impl FileMissionSource {
    pub fn open(points_path: impl AsRef<Path>, missions_path: impl AsRef<Path>) -> Result<Self> {
        let points = std::fs::File::open(points_path.as_ref())?;
        let catalog = std::fs::File::open(missions_path.as_ref())?;
        let source = Self::from_readers(points, catalog)?;
        tracing::debug!(
            "Loaded {} missions and photo positions for {} of them",
            source.missions.len(),
            source.points.len()
        );
        Ok(source)
    }

    pub fn from_readers<P: Read, C: Read>(points: P, catalog: C) -> Result<Self> {
        let missions: Vec<CatalogEntry> = serde_json::from_reader(catalog)?;

        let mut by_mission: BTreeMap<i64, Vec<Point>> = BTreeMap::new();
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(points);
        for row in reader.deserialize::<PhotoRecord>() {
            let row = row?;
            by_mission
                .entry(row.mission_id)
                .or_default()
                .push(Point::new(row.longitude, row.latitude));
        }

        Ok(Self {
            missions,
            points: by_mission,
        })
    }

    fn entry(&self, mission_id: i64) -> Result<&CatalogEntry> {
        self.missions
            .iter()
            .find(|m| m.id == mission_id)
            .ok_or(FootprintError::MissionNotFound { mission_id })
    }
}

impl MissionSource for FileMissionSource {
    fn list_missions(&self) -> Result<Vec<Mission>> {
        if self.missions.is_empty() {
            return Err(FootprintError::SourceError {
                message: "the mission catalog is empty".to_string(),
            });
        }
        Ok(self
            .missions
            .iter()
            .map(|m| Mission {
                id: m.id,
                local: m.local.clone(),
            })
            .collect())
    }

    fn mission_points(&self, mission_id: i64) -> Result<Vec<Point>> {
        self.entry(mission_id)?;
        match self.points.get(&mission_id) {
            Some(points) if !points.is_empty() => Ok(points.clone()),
            _ => Err(FootprintError::insufficient_data(format!(
                "no photo coordinates found for mission {}",
                mission_id
            ))),
        }
    }

    fn reference_area(&self, mission_id: i64) -> Result<Polygon> {
        let entry = self.entry(mission_id)?;
        let area = entry.area.as_ref().ok_or_else(|| FootprintError::SourceError {
            message: format!("mission {} ({}) has no reference area", mission_id, entry.local),
        })?;

        if area.kind != "Polygon" {
            return Err(FootprintError::invalid_geometry(format!(
                "reference area of mission {} is a {}, expected Polygon",
                mission_id, area.kind
            )));
        }
        match area.coordinates.as_slice() {
            [exterior] => Polygon::from_ring(
                exterior.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
            ),
            [] => Err(FootprintError::invalid_geometry(format!(
                "reference area of mission {} has no rings",
                mission_id
            ))),
            _ => Err(FootprintError::invalid_geometry(format!(
                "reference area of mission {} has interior rings, which are not supported",
                mission_id
            ))),
        }
    }
}
