//! Child processes run against the framework: `manage.py` migration commands
//! and the driver import probe.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::bridge::FrameworkSettings;
use crate::builders::DriverProbe;
use crate::error::{OrmError, Result};

/// Environment variable the framework settings module reads the project root from
pub const USER_ROOT_ENV: &str = "USER_ROOT";
/// Environment variable carrying the resolved settings as JSON
pub const SETTINGS_JSON_ENV: &str = "STANDALORM_SETTINGS_JSON";

const PYTHON_CANDIDATES: [&str; 2] = ["python3", "python"];

/// Python files the library root must hold, written on first use
pub const GLUE_FILES: [(&str, &str); 3] = [
    ("manage.py", include_str!("../python/manage.py")),
    ("settings.py", include_str!("../python/settings.py")),
    ("orm_init.py", include_str!("../python/orm_init.py")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageAction {
    MakeMigrations,
    Migrate,
}

impl ManageAction {
    pub fn as_arg(self) -> &'static str {
        match self {
            ManageAction::MakeMigrations => "makemigrations",
            ManageAction::Migrate => "migrate",
        }
    }
}

/// Python interpreter plus the directory holding `manage.py` and `settings.py`
#[derive(Debug, Clone)]
pub struct FrameworkRunner {
    python: PathBuf,
    lib_root: PathBuf,
}

impl FrameworkRunner {
    pub fn new(python: impl Into<PathBuf>, lib_root: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            lib_root: lib_root.into(),
        }
    }

    /// Use `python` if given, else the first of `python3`/`python` on PATH
    pub fn locate(python: Option<&str>, lib_root: impl Into<PathBuf>) -> Result<Self> {
        let interpreter = match python {
            Some(explicit) => PathBuf::from(explicit),
            None => PYTHON_CANDIDATES
                .iter()
                .find_map(|candidate| which::which(candidate).ok())
                .ok_or_else(|| OrmError::InterpreterNotFound {
                    tried: PYTHON_CANDIDATES.join(", "),
                })?,
        };
        debug!(python = %interpreter.display(), "using python interpreter");
        Ok(Self::new(interpreter, lib_root))
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn lib_root(&self) -> &Path {
        &self.lib_root
    }

    pub fn manage_py(&self) -> PathBuf {
        self.lib_root.join("manage.py")
    }

    pub fn settings_py(&self) -> PathBuf {
        self.lib_root.join("settings.py")
    }

    pub fn orm_init_py(&self) -> PathBuf {
        self.lib_root.join("orm_init.py")
    }

    /// Write any missing glue file into the library root
    pub fn ensure_glue(&self) -> Result<Vec<PathBuf>> {
        install_glue(&self.lib_root)
    }

    /// `python manage.py <action> <app>` run from the library root
    pub fn manage_command(
        &self,
        action: ManageAction,
        app: &str,
        user_root: &Path,
        settings: &FrameworkSettings,
    ) -> Result<Command> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("manage.py")
            .arg(action.as_arg())
            .arg(app)
            .current_dir(&self.lib_root)
            .env(USER_ROOT_ENV, user_root)
            .env("PYTHONPATH", user_root)
            .env(SETTINGS_JSON_ENV, settings.to_json(false)?);
        Ok(cmd)
    }

    /// Run a migration command and wait for it
    pub fn run(
        &self,
        action: ManageAction,
        app: &str,
        user_root: &Path,
        settings: &FrameworkSettings,
    ) -> Result<()> {
        self.ensure_glue()?;
        let mut cmd = self.manage_command(action, app, user_root, settings)?;
        info!(action = action.as_arg(), %app, "running manage.py");

        let status = cmd.status()?;
        if !status.success() {
            return Err(OrmError::ChildFailed {
                program: format!("manage.py {}", action.as_arg()),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

/// Write any of `GLUE_FILES` missing from `lib_root`.
///
/// Existing files are left alone so local edits survive. Returns the paths
/// that were written.
pub fn install_glue(lib_root: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(lib_root)?;

    let mut written = Vec::new();
    for (file_name, contents) in GLUE_FILES {
        let path = lib_root.join(file_name);
        if path.exists() {
            continue;
        }
        fs::write(&path, contents)?;
        info!(path = %path.display(), "installed framework glue");
        written.push(path);
    }
    Ok(written)
}

impl DriverProbe for FrameworkRunner {
    /// Whether `import <library>` succeeds in the framework's interpreter
    fn has_driver(&self, library: &str) -> Result<bool> {
        let status = Command::new(&self.python)
            .arg("-c")
            .arg(format!("import {}", library))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        let found = match status {
            Ok(status) => status.success(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(OrmError::InterpreterNotFound {
                    tried: self.python.display().to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        debug!(%library, found, "probed database driver");
        Ok(found)
    }
}
