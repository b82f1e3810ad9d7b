use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::contract::DATABASE_NAME;
use crate::provider::UpdatePolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WinnieConfig {
    /// Directory holding the database and preferences
    pub data_dir: Option<String>,
    /// Database file; defaults to `<data_dir>/History.db`
    pub database: Option<String>,
    /// Preferences file; defaults to `<data_dir>/prefs.toml`
    pub preferences: Option<String>,
    pub update_policy: Option<UpdatePolicy>,
}

impl WinnieConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => PathBuf::from(path),
            None => default_database_path_in(&self.data_dir()),
        }
    }

    pub fn preferences_path(&self) -> PathBuf {
        match &self.preferences {
            Some(path) => PathBuf::from(path),
            None => self.data_dir().join("prefs.toml"),
        }
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy.unwrap_or_default()
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("winnie.toml")
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(".winnie")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(DATABASE_NAME)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<WinnieConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: WinnieConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &WinnieConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WinnieConfig::default();
        assert_eq!(config.database_path(), PathBuf::from(".winnie").join("History.db"));
        assert_eq!(config.preferences_path(), PathBuf::from(".winnie").join("prefs.toml"));
        assert_eq!(config.update_policy(), UpdatePolicy::FailOnZero);
    }

    #[test]
    fn test_load_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winnie.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());

        std::fs::write(&path, "data_dir = \"/tmp/w\"\nupdate_policy = \"allow_zero\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/w/History.db"));
        assert_eq!(config.update_policy(), UpdatePolicy::AllowZero);

        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &WinnieConfig::default(), true).unwrap();
        let config = load_config(Some(&path)).unwrap().unwrap();
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("a").join("b").join("History.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
