pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, EmptyIntersectionPolicy, EngineKind};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "survey-footprint")]
#[command(about = "Build a clipped mission footprint polygon and save it as a shapefile")]
pub struct CliConfig {
    /// CSV of photo positions (mission_id,longitude,latitude)
    #[arg(long, default_value = "./data/photos.csv")]
    pub points: String,

    /// JSON mission catalog with reference areas
    #[arg(long, default_value = "./data/missions.json")]
    pub missions: String,

    /// Mission to process; prompts when omitted
    #[arg(long)]
    pub mission_id: Option<i64>,

    #[arg(long, default_value = "./ShapeFiles")]
    pub output_path: String,

    /// Value written to the `id` attribute
    #[arg(long, default_value = "1")]
    pub feature_id: i32,

    #[arg(long, value_enum, default_value = "geo")]
    pub engine: EngineKind,

    #[arg(long, help = "Fail instead of keeping the unclipped hull when it misses the reference area")]
    pub strict: bool,

    #[arg(long, help = "Also bundle the shapefile into a .zip archive")]
    pub archive: bool,

    #[arg(long, help = "List missions and exit")]
    pub list: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn points_path(&self) -> &str {
        &self.points
    }

    fn missions_path(&self) -> &str {
        &self.missions
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn feature_id(&self) -> i32 {
        self.feature_id
    }

    fn engine(&self) -> EngineKind {
        self.engine
    }

    fn empty_intersection_policy(&self) -> EmptyIntersectionPolicy {
        if self.strict {
            EmptyIntersectionPolicy::Error
        } else {
            EmptyIntersectionPolicy::Fallback
        }
    }

    fn archive_output(&self) -> bool {
        self.archive
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("points", &self.points)?;
        validation::validate_path("missions", &self.missions)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extensions("points", std::slice::from_ref(&self.points), &["csv"])?;
        validation::validate_file_extensions(
            "missions",
            std::slice::from_ref(&self.missions),
            &["json", "geojson"],
        )?;
        Ok(())
    }
}
