pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod geometry;
pub mod shapefile;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::FileMissionSource;
pub use core::{etl::FootprintEngine, pipeline::FootprintPipeline};
pub use domain::model::{Footprint, Mission, Point, Polygon};
pub use geometry::{build_hull, clip};
pub use shapefile::{read_shapefile, write_shapefile, ShapefileWriter};
pub use utils::error::{FootprintError, Result};
