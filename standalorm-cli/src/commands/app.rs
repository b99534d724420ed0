//! App and migration commands
//!
//! Commands: startapp, makemigrations, migrate, pycharm

use anyhow::Result;
use clap::Parser;
use standalorm_core::app::start_app;
use standalorm_core::settings::DEFAULT_APP;
use standalorm_core::framework::install_glue;
use standalorm_core::{framework_settings, ManageAction};

use crate::config::CliConfig;
use crate::ui;

#[derive(Parser, Debug)]
pub struct StartappArgs {
    /// Name of the app holding your models
    #[arg(default_value = DEFAULT_APP)]
    app_name: String,

    /// Point at an existing app instead of creating its directory
    #[arg(long, short = 'n')]
    no_create: bool,
}

pub fn run_startapp(args: StartappArgs, config: &CliConfig) -> Result<()> {
    let mut ctx = config.open_context()?;
    let path = start_app(&mut ctx, &args.app_name, !args.no_create)?;
    install_glue(&config.lib_root)?;

    if args.no_create {
        ui::success(&format!("Using app {}.", ui::highlight(&args.app_name)));
    } else {
        ui::success(&format!(
            "Created app {} at {}. Define your models in models.py, then run `standalorm makemigrations`.\n\
             Scripts import `orm_init` from {}, so add it to PYTHONPATH.",
            ui::highlight(&args.app_name),
            path.display(),
            config.lib_root.display()
        ));
    }
    Ok(())
}

/// Run `manage.py makemigrations|migrate` for the configured app
pub fn run_manage(action: ManageAction, config: &CliConfig) -> Result<()> {
    let ctx = config.open_context()?;
    let settings = framework_settings(ctx.record(), ctx.user_root(), |key| {
        std::env::var(key).ok()
    })?;
    let runner = config.runner()?;

    println!();
    runner.run(action, &ctx.record().config.app, ctx.user_root(), &settings)?;
    println!();
    Ok(())
}

pub fn run_pycharm(config: &CliConfig) -> Result<()> {
    let runner = config.runner()?;
    runner.ensure_glue()?;

    println!(
        "\nTo get code completion for your models in PyCharm Professional:\n\n\
         1. Open Settings > Languages & Frameworks > Django and check \"Enable Django Support\".\n\
         2. Set \"Django project root\" to:\n       {}\n\
         3. Set \"Settings\" to:\n       {}\n\
         4. Set \"Manage script\" to:\n       {}\n",
        runner.lib_root().display(),
        runner.settings_py().display(),
        runner.manage_py().display()
    );
    Ok(())
}
