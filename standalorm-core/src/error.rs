/// Structured error types for standalorm-core.
///
/// Uses `thiserror` so the CLI can tell precondition failures (reported, exit 0)
/// apart from environment and format failures (reported, process aborts).
/// The binary crate wraps these in `anyhow` at its edges.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::profile::DatabaseKind;

/// Operation a candidate list was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Switch,
    Edit,
    Remove,
}

impl Action {
    pub fn verb(self) -> &'static str {
        match self {
            Action::Switch => "switch to",
            Action::Edit => "edit",
            Action::Remove => "remove",
        }
    }
}

/// Main error type for standalorm-core operations
#[derive(Error, Debug)]
pub enum OrmError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Settings file exists but is not a valid settings record
    #[error("Failed to parse settings file {path:?}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Settings record could not be rendered as TOML
    #[error("Failed to serialize settings: {source}")]
    SettingsSerialize {
        #[from]
        source: toml::ser::Error,
    },

    /// Framework settings could not be rendered as JSON
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Edited connection text is not valid TOML
    #[error("Your changes couldn't be saved. Please try again.\n({source})")]
    ProfileFormat { source: toml::de::Error },

    /// No connection is eligible for the requested action
    #[error("There are currently no database connections you can {}.", action.verb())]
    NoCandidates { action: Action },

    /// Named connection does not exist
    #[error("There's no database connection with that name.")]
    UnknownConnection { name: String },

    /// Database token did not name a supported backend
    #[error("'{token}' is not a valid database. Supported databases are Oracle, PostgreSQL and SQLite.")]
    UnsupportedDatabase { token: String },

    /// Environment-variable mode requested for a backend that cannot use it
    #[error("{kind} connections can't be configured with an environment variable. Use Oracle or PostgreSQL.")]
    EnvModeUnsupported { kind: DatabaseKind },

    /// Database driver library missing from the framework's environment
    #[error("Using {kind} databases requires {library}, which standalorm was unable to find in your environment. Install {library} and try again.\n\n    pip install {library}")]
    DriverMissing {
        kind: DatabaseKind,
        library: &'static str,
    },

    /// Environment-mode connection points at an unset variable
    #[error("Environment variable '{name}' is not set (required by the active database connection)")]
    MissingEnvVar { name: String },

    /// Connection URI could not be understood
    #[error("Invalid database URI in '{var}': {reason}")]
    InvalidUri { var: String, reason: String },

    /// Python interpreter not found
    #[error("Could not find a Python interpreter (tried {tried}). Set STANDALORM_PYTHON.")]
    InterpreterNotFound { tried: String },

    /// Child process (editor, manage.py) failed
    #[error("{program} exited with code {code}")]
    ChildFailed { program: String, code: i32 },

    /// App name cannot be imported as a Python package
    #[error("'{name}' is not a valid app name. Use a Python identifier such as 'db' or 'inventory'.")]
    InvalidAppName { name: String },

    /// App directory already present
    #[error("App directory {path:?} already exists. Use --no-create to point at an existing app.")]
    AppExists { path: PathBuf },

    /// Interactive prompt failed
    #[error("Prompt failed: {reason}")]
    Prompt { reason: String },

    /// User aborted a prompt (Ctrl+C / Esc)
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for standalorm-core operations
pub type Result<T> = std::result::Result<T, OrmError>;

impl OrmError {
    /// Create a prompt error
    pub fn prompt(reason: impl Into<String>) -> Self {
        Self::Prompt {
            reason: reason.into(),
        }
    }

    /// Create an unknown connection error
    pub fn unknown_connection(name: impl Into<String>) -> Self {
        Self::UnknownConnection { name: name.into() }
    }

    /// Create an invalid URI error
    pub fn invalid_uri(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Failures the user is told about without aborting the process.
    ///
    /// State is never mutated before one of these is returned.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            OrmError::NoCandidates { .. }
                | OrmError::UnknownConnection { .. }
                | OrmError::UnsupportedDatabase { .. }
                | OrmError::EnvModeUnsupported { .. }
                | OrmError::InvalidAppName { .. }
        )
    }
}
