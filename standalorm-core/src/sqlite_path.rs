//! SQLite database path validation.
//!
//! A path is accepted when it is syntactically valid for the host platform,
//! ends with `.sqlite3`, and lands inside the project root once joined onto it.
//! The file itself does not need to exist; the framework creates it on the
//! first migration.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const SQLITE_EXTENSION: &str = ".sqlite3";

const WINDOWS_RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];
const WINDOWS_INVALID_CHARS: [char; 6] = ['<', '>', '"', '|', '?', '*'];
const MAX_COMPONENT_LEN: usize = 255;

/// Path syntax rules to check against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Union of every other platform's rules
    Universal,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Universal
        }
    }

    fn max_path_len(self) -> usize {
        match self {
            Platform::Linux => 4096,
            Platform::MacOs => 1024,
            Platform::Windows | Platform::Universal => 260,
        }
    }

    fn windows_rules(self) -> bool {
        matches!(self, Platform::Windows | Platform::Universal)
    }

    fn forbids_colon(self) -> bool {
        matches!(self, Platform::MacOs | Platform::Universal)
    }
}

/// Why a path was refused; each variant re-prompts with its own message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathRejection {
    #[error("That's not a valid filepath ({0}).")]
    InvalidSyntax(String),

    #[error("That's not a valid SQLite3 database path (SQLite3 databases have the file extension .sqlite3).")]
    WrongExtension,

    #[error("The path must be relative to {}.", .0.display())]
    OutsideRoot(PathBuf),
}

/// Validate with the host platform's rules
pub fn validate_sqlite_path(input: &str, root: &Path) -> Result<(), PathRejection> {
    validate_sqlite_path_for(Platform::current(), input, root)
}

pub fn validate_sqlite_path_for(
    platform: Platform,
    input: &str,
    root: &Path,
) -> Result<(), PathRejection> {
    check_syntax(platform, input).map_err(PathRejection::InvalidSyntax)?;

    if !input.ends_with(SQLITE_EXTENSION) {
        return Err(PathRejection::WrongExtension);
    }

    if !resolves_under(root, Path::new(input)) {
        return Err(PathRejection::OutsideRoot(root.to_path_buf()));
    }

    Ok(())
}

/// Lexically resolve `path` against `root` and test containment.
///
/// No filesystem access, so neither side needs to exist.
pub fn resolves_under(root: &Path, path: &Path) -> bool {
    let root = normalize(root);
    normalize(&root.join(path)).starts_with(&root)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn check_syntax(platform: Platform, input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        return Err("empty path".into());
    }
    if input.contains('\0') {
        return Err("contains a null character".into());
    }
    if input.len() > platform.max_path_len() {
        return Err(format!(
            "longer than {} characters",
            platform.max_path_len()
        ));
    }

    let mut body = input;
    if platform.windows_rules() {
        if let Some(c) = input.chars().find(|c| c.is_control()) {
            return Err(format!("contains control character {:?}", c));
        }
        if let Some(c) = input.chars().find(|c| WINDOWS_INVALID_CHARS.contains(c)) {
            return Err(format!("contains invalid character '{}'", c));
        }
        // drive letter is the only place a colon may appear
        let bytes = input.as_bytes();
        if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            body = &input[2..];
        }
    }

    if body.contains(':') && (platform.windows_rules() || platform.forbids_colon()) {
        return Err("contains invalid character ':'".into());
    }

    let separators: &[char] = if platform.windows_rules() {
        &['/', '\\']
    } else {
        &['/']
    };

    for part in body.split(separators).filter(|p| !p.is_empty()) {
        if part.len() > MAX_COMPONENT_LEN {
            return Err(format!(
                "component longer than {} characters",
                MAX_COMPONENT_LEN
            ));
        }
        if platform.windows_rules() && part != "." && part != ".." {
            if part.ends_with(' ') || part.ends_with('.') {
                return Err(format!("'{}' ends with a space or period", part));
            }
            let stem = part.split('.').next().unwrap_or(part).trim_end();
            if WINDOWS_RESERVED
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(stem))
            {
                return Err(format!("'{}' is a reserved name", part));
            }
        }
    }

    Ok(())
}
