//! Status output helpers for the standalorm CLI
//!
//! Color is applied only when stdout is a terminal and `NO_COLOR` is unset,
//! so piped output and test harnesses see plain text.

use std::io::IsTerminal;
use std::sync::OnceLock;

use crossterm::style::{style, Color, Stylize};

/// Global color state
static COLOR: OnceLock<bool> = OnceLock::new();

/// Decide once whether to emit ANSI colors
pub fn init_color() {
    let enabled = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    COLOR.set(enabled).ok();
}

fn color_enabled() -> bool {
    *COLOR.get().unwrap_or(&false)
}

fn paint(text: &str, color: Color) -> String {
    if color_enabled() {
        style(text).with(color).to_string()
    } else {
        text.to_string()
    }
}

/// Connection or app name inside a message
pub fn highlight(text: &str) -> String {
    paint(text, Color::Cyan)
}

/// Completed action
pub fn success(msg: &str) {
    println!("\n{}\n", msg);
}

/// Request that could not be carried out; nothing was changed
pub fn failure(msg: &str) {
    println!("\n{}\n", paint(msg, Color::Red));
}

/// Re-prompt notice while collecting input
pub fn warning(msg: &str) {
    println!("\n{}", paint(msg, Color::Yellow));
}

/// Fatal error, reported before exiting non-zero
pub fn fatal(msg: &str) {
    let text = if std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
        style(msg).with(Color::Red).to_string()
    } else {
        msg.to_string()
    };
    eprintln!("\n{}\n", text);
}
