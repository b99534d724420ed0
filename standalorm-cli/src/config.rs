//! Where standalorm finds its settings file, framework glue and interpreter.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use standalorm_core::{Context, FrameworkRunner, TomlFileStore};
use tracing::debug;

/// Location flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Settings file (default: ~/.standalorm/orm-settings.toml)
    #[arg(long, global = true, env = "STANDALORM_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Directory holding manage.py and settings.py (default: the settings file's directory)
    #[arg(long, global = true, env = "STANDALORM_LIB_ROOT", value_name = "DIR")]
    pub lib_root: Option<PathBuf>,

    /// Python interpreter used for migrations and driver checks
    #[arg(long, global = true, env = "STANDALORM_PYTHON", value_name = "PATH")]
    pub python: Option<String>,
}

/// Resolved locations for one invocation
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub settings_path: PathBuf,
    pub lib_root: PathBuf,
    pub user_root: PathBuf,
    pub python: Option<String>,
}

impl CliConfig {
    /// Resolve against the current working directory, which is the user root
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let user_root =
            std::env::current_dir().context("Could not determine the current directory")?;
        Ok(Self::resolve_in(args, user_root))
    }

    fn resolve_in(args: &GlobalArgs, user_root: PathBuf) -> Self {
        let settings_path = args
            .settings
            .clone()
            .unwrap_or_else(TomlFileStore::default_path);
        let lib_root = args
            .lib_root
            .clone()
            .unwrap_or_else(|| parent_dir(&settings_path));

        debug!(
            settings = %settings_path.display(),
            lib_root = %lib_root.display(),
            user_root = %user_root.display(),
            "resolved locations"
        );

        Self {
            settings_path,
            lib_root,
            user_root,
            python: args.python.clone(),
        }
    }

    /// Load the settings record into a fresh context
    pub fn open_context(&self) -> Result<Context<TomlFileStore>> {
        let store = TomlFileStore::new(&self.settings_path);
        Context::load(store, &self.user_root).with_context(|| {
            format!(
                "Failed to load settings from {}",
                self.settings_path.display()
            )
        })
    }

    pub fn runner(&self) -> Result<FrameworkRunner> {
        Ok(FrameworkRunner::locate(
            self.python.as_deref(),
            &self.lib_root,
        )?)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
