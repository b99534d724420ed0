//! standalorm CLI - use the Django ORM from standalone Python scripts
//!
//! Provides:
//! - Named database connections (`db` subcommand: add, switch, edit, remove, ls)
//! - App scaffolding and migrations (`startapp`, `makemigrations`, `migrate`)
//! - Framework settings export for the Python side (`settings`)

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use standalorm_core::{ManageAction, OrmError};

mod commands;
mod config;
mod prompt;
mod tracing_setup;
mod ui;

use config::{CliConfig, GlobalArgs};

#[derive(Parser, Debug)]
#[command(
    name = "standalorm",
    author,
    version,
    about = "Use the Django ORM in standalone scripts",
    long_about = "Manage named database connections, scaffold a models app and run \
                  migrations without setting up a full Django project."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version and copyright information
    About(commands::about::AboutArgs),
    /// Create the app that holds your models and make it the active app
    Startapp(commands::app::StartappArgs),
    /// Create migrations for changes to your models
    Makemigrations,
    /// Apply migrations to the active database
    Migrate,
    /// Show how to enable Django support in PyCharm
    Pycharm,
    /// Manage database connections (add, switch, edit, remove, ls)
    Db(commands::db::DbArgs),
    /// Print the framework settings for the active connection as JSON
    Settings(commands::settings::SettingsArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_color();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}

/// Precondition failures are reported and count as a clean exit; nothing was changed
fn report(err: anyhow::Error) -> ExitCode {
    match err.downcast_ref::<OrmError>() {
        Some(orm) if orm.is_precondition() => {
            ui::failure(&orm.to_string());
            ExitCode::SUCCESS
        }
        _ => {
            ui::fatal(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = || CliConfig::resolve(&cli.global);

    match cli.command {
        Commands::About(args) => commands::run_about(args),
        Commands::Completions(args) => run_completions(args),
        Commands::Startapp(args) => commands::run_startapp(args, &config()?),
        Commands::Makemigrations => commands::run_manage(ManageAction::MakeMigrations, &config()?),
        Commands::Migrate => commands::run_manage(ManageAction::Migrate, &config()?),
        Commands::Pycharm => commands::run_pycharm(&config()?),
        Commands::Db(args) => commands::run_db(args, &config()?),
        Commands::Settings(args) => commands::run_settings(args, &config()?),
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
