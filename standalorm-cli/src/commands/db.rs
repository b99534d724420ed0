//! Database connection commands
//!
//! Commands: add, switch, edit, remove, ls

use anyhow::Result;
use clap::{Parser, Subcommand};
use standalorm_core::{
    list_connections, DatabaseKind, DriverProbe, FrameworkRunner, ProfileManager, SystemEditor,
};
use std::path::Path;
use tracing::debug;

use crate::config::CliConfig;
use crate::prompt::InquirePrompter;
use crate::ui;

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Add a new database connection
    Add(AddArgs),
    /// Switch the active database connection
    Switch(NameArgs),
    /// Edit an existing database connection in $EDITOR
    Edit(NameArgs),
    /// Remove an existing database connection
    Remove(NameArgs),
    /// List database connections
    Ls(LsArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Database to connect to: oracle, postgresql or sqlite (asked if omitted)
    #[arg(value_name = "DATABASE")]
    kind: Option<String>,

    /// Read the connection URI from an environment variable (Oracle and PostgreSQL only)
    #[arg(long = "env", short = 'e')]
    use_env: bool,
}

#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Name of the database connection (asked if omitted)
    name: Option<String>,
}

#[derive(Parser, Debug)]
pub struct LsArgs {
    /// Show only the active connection
    #[arg(long, short = 'c')]
    current: bool,
}

pub fn run_db(args: DbArgs, config: &CliConfig) -> Result<()> {
    match args.command {
        DbCommands::Add(args) => run_add(args, config),
        DbCommands::Switch(args) => run_switch(args, config),
        DbCommands::Edit(args) => run_edit(args, config),
        DbCommands::Remove(args) => run_remove(args, config),
        DbCommands::Ls(args) => run_ls(args, config),
    }
}

/// Locates the interpreter only when a driver check is actually needed
struct InterpreterProbe<'a> {
    python: Option<&'a str>,
    lib_root: &'a Path,
}

impl<'a> InterpreterProbe<'a> {
    fn new(config: &'a CliConfig) -> Self {
        Self {
            python: config.python.as_deref(),
            lib_root: &config.lib_root,
        }
    }
}

impl DriverProbe for InterpreterProbe<'_> {
    fn has_driver(&self, library: &str) -> standalorm_core::Result<bool> {
        FrameworkRunner::locate(self.python, self.lib_root)?.has_driver(library)
    }
}

fn run_add(args: AddArgs, config: &CliConfig) -> Result<()> {
    let kind = args
        .kind
        .as_deref()
        .map(str::parse::<DatabaseKind>)
        .transpose()?;

    let mut ctx = config.open_context()?;
    let probe = InterpreterProbe::new(config);
    let mut prompter = InquirePrompter;

    let name = ProfileManager::new(&mut ctx, &mut prompter).add(kind, args.use_env, &probe)?;

    ui::success(&format!(
        "Database connection {} added. Use `standalorm db switch {}` to make it active.",
        ui::highlight(&name),
        name
    ));
    Ok(())
}

fn run_switch(args: NameArgs, config: &CliConfig) -> Result<()> {
    let mut ctx = config.open_context()?;
    let mut prompter = InquirePrompter;

    let name = ProfileManager::new(&mut ctx, &mut prompter).switch(args.name.as_deref())?;

    ui::success(&format!("Switched to database connection {}.", ui::highlight(&name)));
    Ok(())
}

fn run_edit(args: NameArgs, config: &CliConfig) -> Result<()> {
    let mut ctx = config.open_context()?;
    let mut prompter = InquirePrompter;
    let mut editor = SystemEditor::from_env();
    debug!(editor = editor.program(), "editing connection");

    let name =
        ProfileManager::new(&mut ctx, &mut prompter).edit(args.name.as_deref(), &mut editor)?;

    ui::success(&format!("Database connection {} updated.", ui::highlight(&name)));
    Ok(())
}

fn run_remove(args: NameArgs, config: &CliConfig) -> Result<()> {
    let mut ctx = config.open_context()?;
    let mut prompter = InquirePrompter;

    let removed = ProfileManager::new(&mut ctx, &mut prompter).remove(args.name.as_deref())?;

    let mut message = format!("Database connection {} removed.", ui::highlight(&removed.name));
    if removed.was_active {
        message.push_str(" The default connection is now active.");
    }
    ui::success(&message);
    Ok(())
}

fn run_ls(args: LsArgs, config: &CliConfig) -> Result<()> {
    let ctx = config.open_context()?;
    let names = list_connections(ctx.record(), args.current);

    println!();
    for name in names {
        println!("* {}", name);
    }
    println!();
    Ok(())
}
