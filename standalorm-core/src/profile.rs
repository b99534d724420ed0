//! Connection profiles and the database kinds they describe.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OrmError;

pub const ORACLE_ENGINE: &str = "django.db.backends.oracle";
pub const POSTGRESQL_ENGINE: &str = "django.db.backends.postgresql_psycopg2";
pub const SQLITE_ENGINE: &str = "django.db.backends.sqlite3";

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    Oracle,
    Postgresql,
    Sqlite,
}

impl DatabaseKind {
    pub const ALL: [DatabaseKind; 3] = [
        DatabaseKind::Oracle,
        DatabaseKind::Postgresql,
        DatabaseKind::Sqlite,
    ];

    /// Display label used in menus and messages
    pub fn label(self) -> &'static str {
        match self {
            DatabaseKind::Oracle => "Oracle",
            DatabaseKind::Postgresql => "PostgreSQL",
            DatabaseKind::Sqlite => "SQLite",
        }
    }

    /// Framework backend string stored under `ENGINE`
    pub fn engine(self) -> &'static str {
        match self {
            DatabaseKind::Oracle => ORACLE_ENGINE,
            DatabaseKind::Postgresql => POSTGRESQL_ENGINE,
            DatabaseKind::Sqlite => SQLITE_ENGINE,
        }
    }

    /// Whether credentials can come from a URI environment variable
    pub fn supports_env(self) -> bool {
        !matches!(self, DatabaseKind::Sqlite)
    }

    /// Kinds offered in the `db add` menu
    pub fn choices(use_env: bool) -> Vec<DatabaseKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| !use_env || kind.supports_env())
            .collect()
    }

    pub fn from_engine(engine: &str) -> Option<DatabaseKind> {
        Self::ALL.into_iter().find(|kind| kind.engine() == engine)
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DatabaseKind {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oracle" => Ok(DatabaseKind::Oracle),
            "postgresql" | "postgres" => Ok(DatabaseKind::Postgresql),
            "sqlite" | "sqlite3" => Ok(DatabaseKind::Sqlite),
            _ => Err(OrmError::UnsupportedDatabase {
                token: s.to_string(),
            }),
        }
    }
}

/// Connection fields for Oracle/PostgreSQL when configured directly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
}

/// One named database connection as stored in the settings file.
///
/// `ENGINE` is kept apart from the other keys so edits can never touch it;
/// everything else lives in `fields`, including keys added by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    #[serde(rename = "ENGINE", default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(flatten)]
    pub fields: toml::Table,
}

impl ConnectionProfile {
    /// Profile that resolves its URI from an environment variable at startup
    pub fn from_env_var(var: impl Into<String>) -> Self {
        let mut fields = toml::Table::new();
        fields.insert("USE_ENV".into(), toml::Value::Boolean(true));
        fields.insert("ENV_VAR".into(), toml::Value::String(var.into()));
        Self {
            engine: None,
            fields,
        }
    }

    pub fn direct(kind: DatabaseKind, creds: Credentials) -> Self {
        let mut fields = toml::Table::new();
        for (key, value) in [
            ("NAME", creds.name),
            ("USER", creds.user),
            ("PASSWORD", creds.password),
            ("HOST", creds.host),
            ("PORT", creds.port),
        ] {
            fields.insert(key.into(), toml::Value::String(value));
        }
        Self {
            engine: Some(kind.engine().to_string()),
            fields,
        }
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        let mut fields = toml::Table::new();
        fields.insert("NAME".into(), toml::Value::String(path.into()));
        Self {
            engine: Some(SQLITE_ENGINE.to_string()),
            fields,
        }
    }

    /// Attach `OPTIONS.threaded`, keeping any other options
    pub fn with_threaded(mut self, threaded: bool) -> Self {
        let options = self
            .fields
            .entry("OPTIONS")
            .or_insert(toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(table) = options {
            table.insert("threaded".into(), toml::Value::Boolean(threaded));
        } else {
            let mut table = toml::Table::new();
            table.insert("threaded".into(), toml::Value::Boolean(threaded));
            *options = toml::Value::Table(table);
        }
        self
    }

    pub fn kind(&self) -> Option<DatabaseKind> {
        self.engine.as_deref().and_then(DatabaseKind::from_engine)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    pub fn uses_env(&self) -> bool {
        self.fields
            .get("USE_ENV")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn env_var(&self) -> Option<&str> {
        self.get_str("ENV_VAR")
    }

    pub fn threaded(&self) -> Option<bool> {
        self.fields
            .get("OPTIONS")
            .and_then(|v| v.get("threaded"))
            .and_then(|v| v.as_bool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing_is_case_insensitive() {
        assert_eq!("Oracle".parse::<DatabaseKind>().unwrap(), DatabaseKind::Oracle);
        assert_eq!(
            "POSTGRESQL".parse::<DatabaseKind>().unwrap(),
            DatabaseKind::Postgresql
        );
        assert_eq!("postgres".parse::<DatabaseKind>().unwrap(), DatabaseKind::Postgresql);
        assert_eq!("sqlite3".parse::<DatabaseKind>().unwrap(), DatabaseKind::Sqlite);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "mysql".parse::<DatabaseKind>().unwrap_err();
        assert!(matches!(err, OrmError::UnsupportedDatabase { ref token } if token == "mysql"));
    }

    #[test]
    fn test_env_choices_exclude_sqlite() {
        assert_eq!(DatabaseKind::choices(false).len(), 3);
        assert_eq!(
            DatabaseKind::choices(true),
            vec![DatabaseKind::Oracle, DatabaseKind::Postgresql]
        );
    }

    #[test]
    fn test_oracle_profile_carries_threaded_option() {
        let profile = ConnectionProfile::direct(
            DatabaseKind::Oracle,
            Credentials {
                name: "orcl".into(),
                ..Default::default()
            },
        )
        .with_threaded(true);

        assert_eq!(profile.engine.as_deref(), Some(ORACLE_ENGINE));
        assert_eq!(profile.get_str("NAME"), Some("orcl"));
        assert_eq!(profile.threaded(), Some(true));
        assert_eq!(profile.kind(), Some(DatabaseKind::Oracle));
    }

    #[test]
    fn test_env_profile_has_no_engine() {
        let profile = ConnectionProfile::from_env_var("DATABASE_URL").with_threaded(false);
        assert!(profile.engine.is_none());
        assert!(profile.uses_env());
        assert_eq!(profile.env_var(), Some("DATABASE_URL"));
        assert_eq!(profile.threaded(), Some(false));
    }

    #[test]
    fn test_profile_toml_layout() {
        let profile = ConnectionProfile::sqlite("db/prod.sqlite3");
        let text = toml::to_string(&profile).unwrap();
        assert!(text.contains("ENGINE = \"django.db.backends.sqlite3\""));
        assert!(text.contains("NAME = \"db/prod.sqlite3\""));

        let parsed: ConnectionProfile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, profile);
        assert!(!parsed.fields.contains_key("ENGINE"));
    }
}
