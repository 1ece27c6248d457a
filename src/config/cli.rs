use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        // 與原流程相同：輸出資料夾不存在時自動建立
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_folders() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("ShapeFiles");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_file("mission_1_polygon.prj", b"GEOGCS").await.unwrap();

        assert!(base.join("mission_1_polygon.prj").exists());
        assert_eq!(std::fs::read(base.join("mission_1_polygon.prj")).unwrap(), b"GEOGCS");
    }
}
