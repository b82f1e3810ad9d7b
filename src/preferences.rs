//! Persisted user preferences

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Counter value used when nothing has been saved yet
pub const DEFAULT_COUNT: i64 = 150;

fn default_count() -> i64 {
    DEFAULT_COUNT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default = "default_count")]
    saved_cnt: i64,
}

/// Preferences stored as a small TOML file
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
}

impl Preferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved counter value, or [`DEFAULT_COUNT`] if none was saved
    pub fn saved_count(&self) -> Result<i64> {
        if !self.path.exists() {
            return Ok(DEFAULT_COUNT);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: PreferenceFile = toml::from_str(&contents)
            .map_err(|e| Error::Preferences(format!("{}: {}", self.path.display(), e)))?;
        Ok(file.saved_cnt)
    }

    pub fn save_count(&self, count: i64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string_pretty(&PreferenceFile { saved_cnt: count })
            .map_err(|e| Error::Preferences(e.to_string()))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
