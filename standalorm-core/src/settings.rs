//! Settings record and its persistence.
//!
//! The record lives in a TOML file (`orm-settings.toml`) with two tables:
//!
//! ```toml
//! [config]
//! app = "db"
//! db_name = "default"
//!
//! [databases.default]
//! ENGINE = "django.db.backends.sqlite3"
//! NAME = "db.sqlite3"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{OrmError, Result};
use crate::profile::ConnectionProfile;

/// Reserved connection name; always present, never removable
pub const DEFAULT_CONNECTION: &str = "default";
pub const DEFAULT_APP: &str = "db";
pub const SETTINGS_FILE_NAME: &str = "orm-settings.toml";

/// Active app and connection pointers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveConfig {
    pub app: String,
    pub db_name: String,
}

/// Full persisted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub config: ActiveConfig,
    #[serde(default)]
    pub databases: BTreeMap<String, ConnectionProfile>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        let mut databases = BTreeMap::new();
        databases.insert(
            DEFAULT_CONNECTION.to_string(),
            ConnectionProfile::sqlite("db.sqlite3"),
        );
        Self {
            config: ActiveConfig {
                app: DEFAULT_APP.to_string(),
                db_name: DEFAULT_CONNECTION.to_string(),
            },
            databases,
        }
    }
}

impl SettingsRecord {
    /// Stored key matching `name` case-insensitively
    pub fn find(&self, name: &str) -> Option<&str> {
        let folded = name.to_lowercase();
        self.databases
            .keys()
            .find(|key| key.to_lowercase() == folded)
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Connection names, optionally without the reserved `default`
    pub fn names(&self, include_default: bool) -> Vec<String> {
        self.databases
            .keys()
            .filter(|key| include_default || !is_default(key))
            .cloned()
            .collect()
    }

    pub fn active_name(&self) -> &str {
        &self.config.db_name
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.config.db_name.to_lowercase() == name.to_lowercase()
    }

    /// Profile of the active connection
    pub fn active_profile(&self) -> Result<(&str, &ConnectionProfile)> {
        let key = self
            .find(&self.config.db_name)
            .ok_or_else(|| OrmError::unknown_connection(self.config.db_name.clone()))?;
        Ok((key, &self.databases[key]))
    }

    fn ensure_default(&mut self) {
        if !self.contains(DEFAULT_CONNECTION) {
            self.databases.insert(
                DEFAULT_CONNECTION.to_string(),
                ConnectionProfile::sqlite("db.sqlite3"),
            );
        }
    }
}

pub fn is_default(name: &str) -> bool {
    name.eq_ignore_ascii_case(DEFAULT_CONNECTION)
}

/// Where the settings record is read from and written to
pub trait SettingsStore {
    fn load(&self) -> Result<SettingsRecord>;
    fn save(&mut self, record: &SettingsRecord) -> Result<()>;
}

/// TOML file on disk
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: ~/.standalorm/orm-settings.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".standalorm")
            .join(SETTINGS_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlFileStore {
    /// Missing file yields the default record; a malformed one is an error
    fn load(&self) -> Result<SettingsRecord> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "settings file not found, using defaults");
            return Ok(SettingsRecord::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut record: SettingsRecord =
            toml::from_str(&content).map_err(|source| OrmError::SettingsParse {
                path: self.path.clone(),
                source,
            })?;
        record.ensure_default();

        debug!(
            path = %self.path.display(),
            connections = record.databases.len(),
            "loaded settings"
        );
        Ok(record)
    }

    fn save(&mut self, record: &SettingsRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_str = toml::to_string_pretty(record)?;
        fs::write(&self.path, toml_str)?;

        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}

/// In-memory store for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: SettingsRecord,
    saves: usize,
}

impl MemoryStore {
    pub fn new(record: SettingsRecord) -> Self {
        Self { record, saves: 0 }
    }

    /// Last record handed to `save`, or the seed record
    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<SettingsRecord> {
        Ok(self.record.clone())
    }

    fn save(&mut self, record: &SettingsRecord) -> Result<()> {
        self.record = record.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{DatabaseKind, SQLITE_ENGINE};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = TomlFileStore::new(dir.path().join("orm-settings.toml"));

        let record = store.load().unwrap();
        assert_eq!(record.config.app, "db");
        assert_eq!(record.active_name(), "default");
        assert_eq!(record.names(true), vec!["default".to_string()]);
        assert!(record.names(false).is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = TomlFileStore::new(dir.path().join("nested").join("orm-settings.toml"));

        let mut record = SettingsRecord::default();
        record.databases.insert(
            "oracle-prod".into(),
            ConnectionProfile::from_env_var("ORACLE_URL").with_threaded(true),
        );
        record.config.db_name = "oracle-prod".into();
        store.save(&record).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, record);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("[config]"));
        assert!(text.contains("[databases.oracle-prod.OPTIONS]"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orm-settings.toml");
        fs::write(&path, "[config\napp = ").unwrap();

        let err = TomlFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, OrmError::SettingsParse { .. }));
    }

    #[test]
    fn test_load_restores_missing_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orm-settings.toml");
        fs::write(
            &path,
            "[config]\napp = \"db\"\ndb_name = \"default\"\n\n[databases.dev]\nENGINE = \"django.db.backends.sqlite3\"\nNAME = \"dev.sqlite3\"\n",
        )
        .unwrap();

        let record = TomlFileStore::new(&path).load().unwrap();
        assert!(record.contains("default"));
        assert_eq!(record.databases["dev"].kind(), Some(DatabaseKind::Sqlite));
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let mut record = SettingsRecord::default();
        record
            .databases
            .insert("Legacy".into(), ConnectionProfile::sqlite("legacy.sqlite3"));

        assert_eq!(record.find("legacy"), Some("Legacy"));
        assert_eq!(record.find("LEGACY"), Some("Legacy"));
        assert_eq!(record.find("DEFAULT"), Some("default"));
        assert_eq!(record.find("missing"), None);
    }

    #[test]
    fn test_active_profile_lookup() {
        let mut record = SettingsRecord::default();
        let (name, profile) = record.active_profile().unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.engine.as_deref(), Some(SQLITE_ENGINE));

        record.config.db_name = "gone".into();
        assert!(matches!(
            record.active_profile(),
            Err(OrmError::UnknownConnection { .. })
        ));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::default();
        let mut record = store.load().unwrap();
        record.config.app = "inventory".into();
        store.save(&record).unwrap();

        assert_eq!(store.saves(), 1);
        assert_eq!(store.record().config.app, "inventory");
    }
}
