// Adapters layer: concrete implementations for external systems (mission data, storage).

pub mod file_source;

pub use file_source::FileMissionSource;
