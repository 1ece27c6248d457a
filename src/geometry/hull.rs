use crate::domain::model::{Point, Polygon};
use crate::domain::ports::GeometryEngine;
use crate::geometry::engine::GeoEngine;
use crate::utils::error::{FootprintError, Result};

/// 以預設引擎建立凸包
pub fn build_hull(points: &[Point]) -> Result<Polygon> {
    build_hull_with(&GeoEngine, points)
}

/// Convex hull of `points` as a counter-clockwise ring without redundant
/// vertices, starting at the lexicographically smallest vertex.
///
/// Zero-area hulls (identical or collinear points) are rejected with
/// `EmptyGeometry`.
pub fn build_hull_with(engine: &dyn GeometryEngine, points: &[Point]) -> Result<Polygon> {
    if points.is_empty() {
        return Err(FootprintError::insufficient_data(
            "at least one point is required to build a hull",
        ));
    }

    if let Some(p) = points.iter().find(|p| !p.is_finite()) {
        return Err(FootprintError::invalid_geometry(format!(
            "non-finite coordinate ({}, {})",
            p.x, p.y
        )));
    }

    let mut distinct = points.to_vec();
    distinct.sort_by(|a, b| a.lex_cmp(b));
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(FootprintError::empty_geometry(format!(
            "{} distinct point(s) cannot enclose an area",
            distinct.len()
        )));
    }

    let ring = engine.convex_hull(&distinct);
    tracing::debug!(
        "{} engine produced a hull of {} vertices from {} points",
        engine.name(),
        ring.len(),
        points.len()
    );

    if engine.is_empty(&ring) {
        return Err(FootprintError::empty_geometry(
            "all points are collinear, the hull has no area",
        ));
    }

    Polygon::from_ring(ring)
        .map_err(|_| FootprintError::empty_geometry("the hull has fewer than 3 vertices"))?
        .canonical()
}
