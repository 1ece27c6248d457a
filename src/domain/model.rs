use crate::utils::error::{FootprintError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 面積低於此值 (平方度) 視為零面積
pub const AREA_EPSILON: f64 = 1e-12;

/// 經緯度座標 (x = longitude, y = latitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Lexicographic (x, then y) ordering.
    pub fn lex_cmp(&self, other: &Point) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Cross product of (a - o) x (b - o); positive when o -> a -> b turns left.
pub fn cross(o: &Point, a: &Point, b: &Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Shoelace signed area of an open ring; positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, p) in ring.iter().enumerate() {
        let q = &ring[(i + 1) % ring.len()];
        twice += p.x * q.y - q.x * p.y;
    }
    twice / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// 單一外環多邊形，以開放環儲存 (首點不重複)
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Builds a polygon from a ring that may or may not repeat its first vertex.
    ///
    /// Consecutive duplicates are collapsed. Fails when a coordinate is not
    /// finite or fewer than three distinct vertices remain.
    pub fn from_ring(ring: Vec<Point>) -> Result<Self> {
        if let Some(p) = ring.iter().find(|p| !p.is_finite()) {
            return Err(FootprintError::invalid_geometry(format!(
                "non-finite coordinate ({}, {})",
                p.x, p.y
            )));
        }

        let mut vertices: Vec<Point> = Vec::with_capacity(ring.len());
        for p in ring {
            if vertices.last() != Some(&p) {
                vertices.push(p);
            }
        }
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 {
            return Err(FootprintError::invalid_geometry(format!(
                "a polygon ring needs at least 3 distinct vertices, got {}",
                vertices.len()
            )));
        }

        Ok(Self { vertices })
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::from_ring(coords.iter().copied().map(Point::from).collect())
    }

    /// Open ring, without the closing vertex.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Ring with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<Point> {
        let mut ring = self.vertices.clone();
        ring.push(self.vertices[0]);
        ring
    }

    pub fn signed_area(&self) -> f64 {
        signed_area(&self.vertices)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for p in &self.vertices {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        bbox
    }

    /// Reverses the winding while keeping the starting vertex in place.
    pub fn reversed(&self) -> Self {
        let mut vertices = Vec::with_capacity(self.vertices.len());
        vertices.push(self.vertices[0]);
        vertices.extend(self.vertices[1..].iter().rev().copied());
        Self { vertices }
    }

    pub fn counter_clockwise(&self) -> Self {
        if self.signed_area() < 0.0 {
            self.reversed()
        } else {
            self.clone()
        }
    }

    /// Drops collinear vertices, orients the ring counter-clockwise and starts
    /// it at the lexicographically smallest vertex.
    ///
    /// Fails with `EmptyGeometry` when the ring has no area left.
    pub fn canonical(&self) -> Result<Self> {
        let mut vertices = self.counter_clockwise().vertices;

        let mut changed = true;
        while changed && vertices.len() >= 3 {
            changed = false;
            let n = vertices.len();
            for i in 0..n {
                let prev = vertices[(i + n - 1) % n];
                let next = vertices[(i + 1) % n];
                if is_collinear(&prev, &vertices[i], &next) {
                    vertices.remove(i);
                    changed = true;
                    break;
                }
            }
        }

        if vertices.len() < 3 || signed_area(&vertices).abs() <= AREA_EPSILON {
            return Err(FootprintError::empty_geometry(
                "ring collapses to zero area",
            ));
        }

        let start = vertices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.lex_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        vertices.rotate_left(start);

        Ok(Self { vertices })
    }

    /// Point-in-polygon test that counts points on the boundary as inside.
    pub fn contains_point(&self, p: &Point, tolerance: f64) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            if distance_to_segment(p, a, b) <= tolerance {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Same ring up to the starting vertex, compared with a tolerance.
    pub fn same_ring(&self, other: &Polygon, tolerance: f64) -> bool {
        let n = self.vertices.len();
        if n != other.vertices.len() {
            return false;
        }
        (0..n).any(|offset| {
            (0..n).all(|i| {
                let a = &self.vertices[i];
                let b = &other.vertices[(i + offset) % n];
                (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
            })
        })
    }
}

fn is_collinear(prev: &Point, p: &Point, next: &Point) -> bool {
    let scale = ((p.x - prev.x).hypot(p.y - prev.y)) * ((next.x - p.x).hypot(next.y - p.y));
    cross(prev, p, next).abs() <= 1e-12 * scale.max(f64::MIN_POSITIVE)
}

fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    (p.x - cx).hypot(p.y - cy)
}

/// 座標參考系統；目前僅支援 WGS84 (EPSG:4326)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    #[default]
    Wgs84,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
        }
    }
}

/// 裁切後的任務多邊形及其屬性
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub polygon: Polygon,
    pub id: i32,
    pub crs: Crs,
    pub mission_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: i64,
    pub local: String,
}

/// extract 階段的輸出
#[derive(Debug, Clone)]
pub struct MissionData {
    pub mission: Mission,
    pub points: Vec<Point>,
    pub reference: Polygon,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_coords(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]).unwrap()
    }

    #[test]
    fn test_from_ring_strips_closing_vertex_and_duplicates() {
        let polygon = Polygon::from_coords(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(polygon.vertices().len(), 3);
        assert_eq!(polygon.closed_ring().len(), 4);
        assert_eq!(polygon.closed_ring()[0], polygon.closed_ring()[3]);
    }

    #[test]
    fn test_from_ring_rejects_degenerate_input() {
        assert!(Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).is_err());
        assert!(Polygon::from_coords(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)]).is_err());
    }

    #[test]
    fn test_reversed_keeps_start_vertex() {
        let polygon = square();
        let reversed = polygon.reversed();
        assert_eq!(reversed.vertices()[0], Point::new(0.0, 0.0));
        assert_eq!(reversed.vertices()[1], Point::new(0.0, 2.0));
        assert!(!reversed.is_ccw());
        assert_eq!(reversed.reversed(), polygon);
    }

    #[test]
    fn test_canonical_drops_collinear_and_rotates() {
        let polygon = Polygon::from_coords(&[
            (2.0, 2.0),
            (0.0, 2.0),
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
        ])
        .unwrap();
        let canonical = polygon.canonical().unwrap();
        assert_eq!(canonical, square());
    }

    #[test]
    fn test_canonical_rejects_flat_ring() {
        let flat = Polygon::from_coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]).unwrap();
        assert!(matches!(
            flat.canonical(),
            Err(FootprintError::EmptyGeometry { .. })
        ));
    }

    #[test]
    fn test_contains_point_includes_boundary() {
        let polygon = square();
        assert!(polygon.contains_point(&Point::new(1.0, 1.0), 1e-9));
        assert!(polygon.contains_point(&Point::new(2.0, 1.0), 1e-9));
        assert!(polygon.contains_point(&Point::new(0.0, 0.0), 1e-9));
        assert!(!polygon.contains_point(&Point::new(2.5, 1.0), 1e-9));
    }

    #[test]
    fn test_same_ring_ignores_rotation() {
        let rotated =
            Polygon::from_coords(&[(2.0, 2.0), (0.0, 2.0), (0.0, 0.0), (2.0, 0.0)]).unwrap();
        assert!(square().same_ring(&rotated, 1e-9));
        assert!(!square().same_ring(&rotated.reversed(), 1e-9));
    }

    #[test]
    fn test_bounding_box() {
        let bbox = square().bounding_box();
        assert_eq!(bbox.min_x, 0.0);
        assert_eq!(bbox.max_y, 2.0);
    }
}
