//! Geometry backends behind [`GeometryEngine`].
//!
//! `GeoEngine` delegates to the `geo` crate and handles any simple reference
//! polygon. `PlanarEngine` uses Andrew's monotone chain for the hull and
//! Sutherland-Hodgman for clipping convex rings, with the convex hull as the
//! clip window. Non-convex references are handed to `GeoEngine`.

use crate::domain::model::{cross, Point, Polygon, AREA_EPSILON};
use crate::domain::ports::{EngineKind, GeometryEngine};
use geo::{BooleanOps, ConvexHull, LineString, MultiPoint};

pub fn engine_for(kind: EngineKind) -> Box<dyn GeometryEngine> {
    match kind {
        EngineKind::Geo => Box::new(GeoEngine),
        EngineKind::Planar => Box::new(PlanarEngine),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoEngine;

impl GeoEngine {
    fn to_geo(polygon: &Polygon) -> geo::Polygon<f64> {
        let coords: Vec<(f64, f64)> = polygon.closed_ring().iter().map(|p| (p.x, p.y)).collect();
        geo::Polygon::new(LineString::from(coords), vec![])
    }

    fn open_ring(ring: &LineString<f64>) -> Vec<Point> {
        let mut points: Vec<Point> = ring.coords().map(|c| Point::new(c.x, c.y)).collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }
}

impl GeometryEngine for GeoEngine {
    fn name(&self) -> &'static str {
        "geo"
    }

    fn convex_hull(&self, points: &[Point]) -> Vec<Point> {
        let multi: MultiPoint<f64> = points
            .iter()
            .map(|p| geo::Point::new(p.x, p.y))
            .collect();
        Self::open_ring(multi.convex_hull().exterior())
    }

    fn intersection(&self, subject: &Polygon, clip: &Polygon) -> Vec<Vec<Point>> {
        let result = Self::to_geo(subject).intersection(&Self::to_geo(clip));
        result
            .into_iter()
            .map(|piece| Self::open_ring(piece.exterior()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarEngine;

impl PlanarEngine {
    /// Clips `subject` against one directed edge `a -> b` of a
    /// counter-clockwise window (one Sutherland-Hodgman step).
    fn clip_edge(subject: &[Point], a: &Point, b: &Point) -> Vec<Point> {
        let mut output = Vec::with_capacity(subject.len() + 1);
        let n = subject.len();

        for i in 0..n {
            let current = &subject[i];
            let next = &subject[(i + 1) % n];
            let s_cur = cross(a, b, current);
            let s_next = cross(a, b, next);

            match (s_cur >= 0.0, s_next >= 0.0) {
                (true, true) => output.push(*next),
                (true, false) => output.push(Self::crossing(current, next, s_cur, s_next)),
                (false, true) => {
                    output.push(Self::crossing(current, next, s_cur, s_next));
                    output.push(*next);
                }
                (false, false) => {}
            }
        }

        output
    }

    fn crossing(p: &Point, q: &Point, s_p: f64, s_q: f64) -> Point {
        let t = s_p / (s_p - s_q);
        Point::new(p.x + t * (q.x - p.x), p.y + t * (q.y - p.y))
    }
}

/// 凸且簡單：每個轉角同向，且總轉角剛好一圈
fn is_convex(polygon: &Polygon) -> bool {
    let ring = polygon.counter_clockwise();
    let v = ring.vertices();
    let n = v.len();

    let mut turning = 0.0;
    for i in 0..n {
        let a = &v[i];
        let b = &v[(i + 1) % n];
        let c = &v[(i + 2) % n];
        let turn = cross(a, b, c);
        if turn < -AREA_EPSILON {
            return false;
        }
        let dot = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
        turning += turn.atan2(dot);
    }

    (turning - std::f64::consts::TAU).abs() < 1e-6
}

impl GeometryEngine for PlanarEngine {
    fn name(&self) -> &'static str {
        "planar"
    }

    fn convex_hull(&self, points: &[Point]) -> Vec<Point> {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.lex_cmp(b));
        sorted.dedup();

        if sorted.len() < 3 {
            return sorted;
        }

        let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
        for p in &sorted {
            while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
                lower.pop();
            }
            lower.push(*p);
        }

        let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
        for p in sorted.iter().rev() {
            while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
                upper.pop();
            }
            upper.push(*p);
        }

        lower.pop();
        upper.pop();
        lower.extend(upper);
        lower
    }

    /// Sutherland-Hodgman when both rings are convex. A non-convex ring can
    /// split the overlap into several pieces, which this clipper would join
    /// with zero-width edges, so those inputs go through `GeoEngine`.
    fn intersection(&self, subject: &Polygon, clip: &Polygon) -> Vec<Vec<Point>> {
        if !is_convex(subject) || !is_convex(clip) {
            tracing::debug!("Non-convex input, intersecting with the geo engine");
            return GeoEngine.intersection(subject, clip);
        }

        let window = clip.counter_clockwise();
        let edges = window.vertices();
        let mut output = subject.vertices().to_vec();

        for i in 0..edges.len() {
            let a = &edges[i];
            let b = &edges[(i + 1) % edges.len()];
            output = Self::clip_edge(&output, a, b);
            if output.is_empty() {
                return Vec::new();
            }
        }

        vec![output]
    }
}
