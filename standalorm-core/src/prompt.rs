//! Interactive input source.
//!
//! Builders and profile operations never read the terminal directly; they ask a
//! [`Prompter`]. The CLI backs it with `inquire`, tests with [`ScriptedPrompter`].

use std::collections::VecDeque;

use crate::error::{OrmError, Result};

pub trait Prompter {
    /// Free-form line of input; empty string when the user just hits Enter
    fn text(&mut self, message: &str) -> Result<String>;

    /// Non-echoing input
    fn password(&mut self, message: &str) -> Result<String>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// One of `options`, returned verbatim
    fn select(&mut self, message: &str, options: &[String]) -> Result<String>;

    /// Informational output between prompts
    fn say(&mut self, line: &str);

    /// Validation feedback before a re-prompt
    fn warn(&mut self, line: &str);
}

/// Replays canned answers in order and records everything said.
///
/// Running out of answers is an error, so a validation loop that never
/// accepts its input fails the test instead of hanging it.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub said: Vec<String>,
    pub warnings: Vec<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<String> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| OrmError::prompt(format!("no scripted answer for '{}'", message)))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, message: &str) -> Result<String> {
        self.next(message)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        self.next(message)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next(message)?;
        match answer.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" | "true" => Ok(true),
            "n" | "no" | "false" => Ok(false),
            other => Err(OrmError::prompt(format!("'{}' is not a yes/no answer", other))),
        }
    }

    fn select(&mut self, message: &str, options: &[String]) -> Result<String> {
        let answer = self.next(message)?;
        options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(answer.trim()))
            .cloned()
            .ok_or_else(|| OrmError::prompt(format!("'{}' is not one of {:?}", answer, options)))
    }

    fn say(&mut self, line: &str) {
        self.said.push(line.to_string());
    }

    fn warn(&mut self, line: &str) {
        self.warnings.push(line.to_string());
    }
}
