pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Footprint, MissionData};
pub use crate::domain::ports::{
    ConfigProvider, EmptyIntersectionPolicy, EngineKind, MissionSource, Pipeline, Storage,
};
pub use crate::utils::error::Result;
