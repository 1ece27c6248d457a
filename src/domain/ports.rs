use crate::domain::model::{Footprint, Mission, MissionData, Point, Polygon, AREA_EPSILON};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EngineKind {
    #[default]
    Geo,
    Planar,
}

/// 交集為空時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyIntersectionPolicy {
    /// 回傳未裁切的凸包
    #[default]
    Fallback,
    /// 視為錯誤
    Error,
}

pub trait ConfigProvider: Send + Sync {
    fn points_path(&self) -> &str;
    fn missions_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn feature_id(&self) -> i32;
    fn engine(&self) -> EngineKind;
    fn empty_intersection_policy(&self) -> EmptyIntersectionPolicy;
    fn archive_output(&self) -> bool;

    /// 輸出檔名 (不含副檔名)
    fn output_stem(&self, mission_id: i64) -> String {
        format!("mission_{}_polygon", mission_id)
    }
}

/// Source of mission records, photo positions and reference areas.
pub trait MissionSource: Send + Sync {
    fn list_missions(&self) -> Result<Vec<Mission>>;
    fn mission_points(&self, mission_id: i64) -> Result<Vec<Point>>;
    fn reference_area(&self, mission_id: i64) -> Result<Polygon>;
}

/// Swappable geometry backend.
///
/// Implementations return raw rings; validation and canonical ordering are
/// done by the hull builder and the clipper.
pub trait GeometryEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Convex hull vertices of `points` as an open ring. Degenerate inputs may
    /// yield fewer than three vertices.
    fn convex_hull(&self, points: &[Point]) -> Vec<Point>;

    /// Intersection of two polygons as a list of open rings.
    fn intersection(&self, subject: &Polygon, clip: &Polygon) -> Vec<Vec<Point>>;

    fn is_empty(&self, ring: &[Point]) -> bool {
        ring.len() < 3 || crate::domain::model::signed_area(ring).abs() <= AREA_EPSILON
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<MissionData>;
    async fn transform(&self, data: MissionData) -> Result<Footprint>;
    async fn load(&self, footprint: Footprint) -> Result<String>;
}
