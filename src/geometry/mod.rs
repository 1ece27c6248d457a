//! Hull building and reference-area clipping.

pub mod clip;
pub mod engine;
pub mod hull;

pub use clip::{clip, clip_with, clip_with_outcome, ClipKind, ClipOutcome};
pub use engine::{engine_for, GeoEngine, PlanarEngine};
pub use hull::{build_hull, build_hull_with};
