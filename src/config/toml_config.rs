use crate::core::{ConfigProvider, EmptyIntersectionPolicy, EngineKind};
use crate::utils::error::{FootprintError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub geometry: Option<GeometryConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub points_file: String,
    pub missions_file: String,
    pub mission_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub engine: Option<EngineKind>,
    pub on_empty_intersection: Option<EmptyIntersectionPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub feature_id: Option<i32>,
    pub archive: Option<bool>,
    /// 檔名樣板，`{mission_id}` 會被替換
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FootprintError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FootprintError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FootprintError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("source.points_file", &self.source.points_file)?;
        validation::validate_path("source.missions_file", &self.source.missions_file)?;
        validation::validate_file_extensions(
            "source.points_file",
            std::slice::from_ref(&self.source.points_file),
            &["csv"],
        )?;
        validation::validate_file_extensions(
            "source.missions_file",
            std::slice::from_ref(&self.source.missions_file),
            &["json", "geojson"],
        )?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(template) = &self.load.filename {
            validation::validate_non_empty_string("load.filename", template)?;
            if template.contains('/') || template.contains('\\') {
                return Err(FootprintError::InvalidConfigValueError {
                    field: "load.filename".to_string(),
                    value: template.clone(),
                    reason: "File name must not contain path separators".to_string(),
                });
            }
        }

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            let valid_formats = ["text", "json"];
            if !valid_formats.contains(&format) {
                return Err(FootprintError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn points_path(&self) -> &str {
        &self.source.points_file
    }

    fn missions_path(&self) -> &str {
        &self.source.missions_file
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn feature_id(&self) -> i32 {
        self.load.feature_id.unwrap_or(1)
    }

    fn engine(&self) -> EngineKind {
        self.geometry
            .as_ref()
            .and_then(|g| g.engine)
            .unwrap_or_default()
    }

    fn empty_intersection_policy(&self) -> EmptyIntersectionPolicy {
        self.geometry
            .as_ref()
            .and_then(|g| g.on_empty_intersection)
            .unwrap_or_default()
    }

    fn archive_output(&self) -> bool {
        self.load.archive.unwrap_or(false)
    }

    fn output_stem(&self, mission_id: i64) -> String {
        match &self.load.filename {
            Some(template) => template.replace("{mission_id}", &mission_id.to_string()),
            None => format!("mission_{}_polygon", mission_id),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "footprint"
description = "Mission footprints"
version = "1.0.0"

[source]
points_file = "./data/photos.csv"
missions_file = "./data/missions.json"
mission_id = 3

[geometry]
engine = "planar"
on_empty_intersection = "error"

[load]
output_path = "./ShapeFiles"
feature_id = 9
archive = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "footprint");
        assert_eq!(config.source.mission_id, Some(3));
        assert_eq!(config.engine(), EngineKind::Planar);
        assert_eq!(config.empty_intersection_policy(), EmptyIntersectionPolicy::Error);
        assert_eq!(config.feature_id(), 9);
        assert!(config.archive_output());
        assert_eq!(config.output_stem(3), "mission_3_polygon");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_are_missing() {
        let toml_content = r#"
[pipeline]
name = "minimal"
description = "minimal"
version = "1.0"

[source]
points_file = "photos.csv"
missions_file = "missions.json"

[load]
output_path = "./out"
filename = "footprint_{mission_id}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.engine(), EngineKind::Geo);
        assert_eq!(config.empty_intersection_policy(), EmptyIntersectionPolicy::Fallback);
        assert_eq!(config.feature_id(), 1);
        assert!(!config.archive_output());
        assert!(!config.monitoring_enabled());
        assert_eq!(config.output_stem(12), "footprint_12");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FOOTPRINT_TEST_DATA_DIR", "/srv/survey");

        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
points_file = "${FOOTPRINT_TEST_DATA_DIR}/photos.csv"
missions_file = "${FOOTPRINT_TEST_DATA_DIR}/missions.json"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.points_file, "/srv/survey/photos.csv");

        std::env::remove_var("FOOTPRINT_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
points_file = "photos.txt"
missions_file = "missions.json"

[load]
output_path = "./output"

[monitoring]
enabled = true
log_format = "xml"
"#;

        let mut config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        config.source.points_file = "photos.csv".to_string();
        assert!(matches!(
            config.validate(),
            Err(FootprintError::InvalidConfigValueError { ref field, .. }) if field == "monitoring.log_format"
        ));
    }

    #[test]
    fn test_unknown_engine_is_rejected() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
points_file = "photos.csv"
missions_file = "missions.json"

[geometry]
engine = "gdal"

[load]
output_path = "./output"
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(FootprintError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
description = "File test"
version = "1.0"

[source]
points_file = "photos.csv"
missions_file = "missions.json"

[load]
output_path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}
