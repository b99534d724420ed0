//! Terminal prompts backed by `inquire`
//!
//! Ctrl+C or Esc in any prompt aborts the whole command with
//! `OrmError::Cancelled`; nothing is persisted past that point.

use inquire::error::InquireError;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use standalorm_core::{OrmError, Prompter, Result};

use crate::ui;

#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn text(&mut self, message: &str) -> Result<String> {
        Text::new(message).prompt().map_err(prompt_error)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        Password::new(message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Hidden)
            .prompt()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::new(message)
            .with_default(default)
            .prompt()
            .map_err(prompt_error)
    }

    fn select(&mut self, message: &str, options: &[String]) -> Result<String> {
        Select::new(message, options.to_vec())
            .with_help_message("↑↓ to move, enter to select")
            .prompt()
            .map_err(prompt_error)
    }

    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn warn(&mut self, line: &str) {
        ui::warning(line);
    }
}

fn prompt_error(err: InquireError) -> OrmError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => OrmError::Cancelled,
        other => OrmError::prompt(other.to_string()),
    }
}
