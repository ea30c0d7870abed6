use fs_err as fs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Config '{0}' not found")]
    NotFound(String),
    #[error("Invalid config name '{0}'")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Named JSON blobs in one directory: `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn open_default() -> Self {
        Self::new(crate::dirs::default_data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|p| p.is_file())
    }

    pub fn read_config<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn read_value(&self, name: &str) -> Result<serde_json::Value, StoreError> {
        self.read_config(name)
    }

    /// Writes through a temporary file so a crash never leaves a truncated blob.
    pub fn write_config<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(data)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
