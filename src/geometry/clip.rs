use crate::domain::model::Polygon;
use crate::domain::ports::GeometryEngine;
use crate::geometry::engine::GeoEngine;

/// What the clipper did with the hull.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipKind {
    /// The hull overlapped the reference in a single piece.
    Clipped,
    /// No overlap; the hull is returned unchanged.
    Fallback,
    /// The overlap split into several pieces; only the largest is kept.
    LargestPiece { discarded: usize },
}

#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub polygon: Polygon,
    pub kind: ClipKind,
}

impl ClipOutcome {
    pub fn is_fallback(&self) -> bool {
        self.kind == ClipKind::Fallback
    }
}

pub fn clip(hull: &Polygon, reference: &Polygon) -> Polygon {
    clip_with(&GeoEngine, hull, reference)
}

pub fn clip_with(engine: &dyn GeometryEngine, hull: &Polygon, reference: &Polygon) -> Polygon {
    clip_with_outcome(engine, hull, reference).polygon
}

/// Intersects `hull` with `reference`.
///
/// An intersection without area yields the original hull untouched, so the
/// result is not guaranteed to lie inside `reference`.
pub fn clip_with_outcome(
    engine: &dyn GeometryEngine,
    hull: &Polygon,
    reference: &Polygon,
) -> ClipOutcome {
    // hull 為凸多邊形，作為裁切視窗；reference 可為凹多邊形
    let mut pieces: Vec<Polygon> = engine
        .intersection(reference, hull)
        .into_iter()
        .filter(|ring| !engine.is_empty(ring))
        .filter_map(|ring| Polygon::from_ring(ring).ok())
        .filter_map(|polygon| polygon.canonical().ok())
        .collect();

    if pieces.is_empty() {
        tracing::info!("Intersection with the reference area is empty, keeping the unclipped hull");
        return ClipOutcome {
            polygon: hull.clone(),
            kind: ClipKind::Fallback,
        };
    }

    let discarded = pieces.len() - 1;
    pieces.sort_by(|a, b| b.area().total_cmp(&a.area()));
    let polygon = pieces.swap_remove(0);

    let kind = if discarded == 0 {
        ClipKind::Clipped
    } else {
        tracing::warn!(
            "Intersection split into {} pieces, keeping the largest ({:.3e} sq. deg)",
            discarded + 1,
            polygon.area()
        );
        ClipKind::LargestPiece { discarded }
    };

    tracing::debug!(
        "Clipped hull of {} vertices to {} vertices",
        hull.vertices().len(),
        polygon.vertices().len()
    );

    ClipOutcome { polygon, kind }
}
