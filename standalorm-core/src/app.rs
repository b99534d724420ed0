//! App scaffolding for `startapp`.

use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::error::{OrmError, Result};
use crate::manager::Context;
use crate::settings::SettingsStore;

pub const MODELS_TEMPLATE: &str = r#""""
Define your models here, then run `standalorm makemigrations` and `standalorm migrate`.

In your script, before importing this module:

    from orm_init import orm_init
    orm_init(__file__)
"""

from django.db import models


# class Example(models.Model):
#     name = models.CharField(max_length=100)
"#;

const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// An app is a package directly under the project root, so its name must be
/// an importable identifier: one path component, no separators or dots.
pub fn is_valid_app_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !PYTHON_KEYWORDS.contains(&name)
}

/// Point the settings at `app_name`, creating the app package unless told not to.
///
/// Returns the app directory. The directory must not exist yet when `create`
/// is set; nothing is persisted if creating it fails.
pub fn start_app<S: SettingsStore>(
    ctx: &mut Context<S>,
    app_name: &str,
    create: bool,
) -> Result<PathBuf> {
    if !is_valid_app_name(app_name) {
        return Err(OrmError::InvalidAppName {
            name: app_name.to_string(),
        });
    }
    let app_path = ctx.user_root().join(app_name);

    if create {
        if app_path.exists() {
            return Err(OrmError::AppExists { path: app_path });
        }
        fs::create_dir_all(&app_path)?;
        fs::write(app_path.join("__init__.py"), "")?;
        fs::write(app_path.join("models.py"), MODELS_TEMPLATE)?;
    }

    ctx.record_mut().config.app = app_name.to_string();
    ctx.commit()?;

    info!(app = %app_name, created = create, "started app");
    Ok(app_path)
}
