//! External text editor round trip for `db edit`.

use std::env;
use std::fs;
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

use crate::error::{OrmError, Result};

pub const EDIT_HEADER: &str =
    "# (standalorm) Make your changes, then close the editor. DO NOT EDIT THIS LINE.";

/// Lets the user change a block of text
pub trait ProfileEditor {
    fn edit(&mut self, contents: &str) -> Result<String>;
}

/// Text shown to the user: header line, blank line, then the fields as TOML
pub fn render_for_edit(fields: &toml::Table) -> Result<String> {
    let body = toml::to_string_pretty(fields)?;
    Ok(format!("{}\n\n{}", EDIT_HEADER, body))
}

/// Parse edited text, ignoring the first (header) line
pub fn parse_edited(text: &str) -> Result<toml::Table> {
    let body = match text.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    toml::from_str(body).map_err(|source| OrmError::ProfileFormat { source })
}

/// Opens `$VISUAL` / `$EDITOR` on a temp file and waits for it to exit
#[derive(Debug, Clone)]
pub struct SystemEditor {
    program: String,
    args: Vec<String>,
}

impl SystemEditor {
    pub fn from_env() -> Self {
        let configured = env::var("VISUAL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()));

        configured
            .as_deref()
            .and_then(Self::parse)
            .unwrap_or_else(|| Self {
                program: default_editor().to_string(),
                args: Vec::new(),
            })
    }

    /// Split a command line such as `code --wait` into program and args
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = shlex::split(command)?.into_iter();
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[cfg(windows)]
fn default_editor() -> &'static str {
    "notepad"
}

#[cfg(not(windows))]
fn default_editor() -> &'static str {
    "vi"
}

impl ProfileEditor for SystemEditor {
    fn edit(&mut self, contents: &str) -> Result<String> {
        // removed, with the file, when `dir` drops
        let dir = TempDir::new()?;
        let path = dir.path().join(format!("{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, contents)?;

        debug!(editor = %self.program, path = %path.display(), "launching editor");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .status()?;

        if !status.success() {
            return Err(OrmError::ChildFailed {
                program: self.program.clone(),
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(fs::read_to_string(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_and_parse_skip_header() {
        let mut fields = toml::Table::new();
        fields.insert("NAME".into(), toml::Value::String("prod".into()));
        fields.insert("PORT".into(), toml::Value::String("5432".into()));

        let text = render_for_edit(&fields).unwrap();
        assert!(text.starts_with(EDIT_HEADER));
        assert!(text.contains("NAME = \"prod\""));

        assert_eq!(parse_edited(&text).unwrap(), fields);
    }

    #[test]
    fn test_header_line_is_ignored_even_when_mangled() {
        let parsed = parse_edited("this is [not toml\nNAME = \"x\"\n").unwrap();
        assert_eq!(parsed["NAME"].as_str(), Some("x"));
    }

    #[test]
    fn test_invalid_body_is_format_error() {
        let err = parse_edited(&format!("{}\n\nNAME = \n", EDIT_HEADER)).unwrap_err();
        assert!(matches!(err, OrmError::ProfileFormat { .. }));
    }

    #[test]
    fn test_editor_command_splitting() {
        let editor = SystemEditor::parse("code --wait").unwrap();
        assert_eq!(editor.program(), "code");
        assert_eq!(editor.args, vec!["--wait".to_string()]);

        assert!(SystemEditor::parse("").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_editor_round_trip() {
        // `true` leaves the file untouched and exits 0
        let mut editor = SystemEditor::parse("true").unwrap();
        let out = editor.edit("hello\n").unwrap();
        assert_eq!(out, "hello\n");

        let mut failing = SystemEditor::parse("false").unwrap();
        assert!(matches!(
            failing.edit("hello\n"),
            Err(OrmError::ChildFailed { .. })
        ));
    }
}
