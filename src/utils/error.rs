use thiserror::Error;

#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    #[error("Empty geometry: {message}")]
    EmptyGeometry { message: String },

    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("Footprint of mission {mission_id} lies outside its reference area")]
    OutsideReferenceArea { mission_id: i64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Shapefile format error in {file}: {message}")]
    FormatError { file: String, message: String },

    #[error("Mission {mission_id} not found")]
    MissionNotFound { mission_id: i64 },

    #[error("Mission source error: {message}")]
    SourceError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Geometry,
    Io,
    Format,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FootprintError {
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    pub fn empty_geometry(message: impl Into<String>) -> Self {
        Self::EmptyGeometry {
            message: message.into(),
        }
    }

    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    pub fn format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FormatError {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientData { .. }
            | Self::MissionNotFound { .. }
            | Self::SourceError { .. }
            | Self::CsvError(_)
            | Self::SerializationError(_) => ErrorCategory::Input,
            Self::EmptyGeometry { .. }
            | Self::InvalidGeometry { .. }
            | Self::OutsideReferenceArea { .. } => ErrorCategory::Geometry,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Io,
            Self::FormatError { .. } => ErrorCategory::Format,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 同一輸入重試沒有意義，但換一個輸出路徑可能成功
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Geometry | ErrorCategory::Format => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => {
                "Check that the mission has photo coordinates recorded"
            }
            Self::EmptyGeometry { .. } => {
                "The photo positions are identical or collinear; at least three non-collinear positions are needed"
            }
            Self::InvalidGeometry { .. } => {
                "Check the reference area and coordinates for degenerate or unclosed rings"
            }
            Self::OutsideReferenceArea { .. } => {
                "Verify the mission locality, or allow the unclipped footprint with the fallback policy"
            }
            Self::IoError(_) | Self::ZipError(_) => {
                "Check that the output folder exists and is writable, then retry with a fresh path"
            }
            Self::CsvError(_) => "Check the points file has the header mission_id,longitude,latitude",
            Self::SerializationError(_) => "Check the missions catalog is valid JSON",
            Self::FormatError { .. } => "The shapefile set is incomplete or inconsistent; write it again",
            Self::MissionNotFound { .. } => "Use --list to see the available mission ids",
            Self::SourceError { .. } => "Check the missions catalog contains at least one mission",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file or command line flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not read mission data: {}", self),
            ErrorCategory::Geometry => format!("Could not build the mission polygon: {}", self),
            ErrorCategory::Io => format!("Could not write the output files: {}", self),
            ErrorCategory::Format => format!("Shapefile is not readable: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FootprintError>;
