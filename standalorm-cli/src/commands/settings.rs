use anyhow::Result;
use clap::Parser;
use standalorm_core::framework_settings;

use crate::config::CliConfig;

#[derive(Parser, Debug)]
pub struct SettingsArgs {
    /// Indent the JSON output
    #[arg(long, short = 'p')]
    pretty: bool,
}

/// Print the framework settings derived from the active connection
pub fn run_settings(args: SettingsArgs, config: &CliConfig) -> Result<()> {
    let ctx = config.open_context()?;
    let settings = framework_settings(ctx.record(), ctx.user_root(), |key| {
        std::env::var(key).ok()
    })?;

    println!("{}", settings.to_json(args.pretty)?);
    Ok(())
}
