use anyhow::Result;
use clap::Parser;

const LICENSE_TEXT: &str = include_str!("../../../LICENSE-MIT");

#[derive(Parser, Debug)]
pub struct AboutArgs {
    /// Print the full license text
    #[arg(long, short = 'l')]
    license: bool,
}

pub fn run_about(args: AboutArgs) -> Result<()> {
    if args.license {
        println!("\n{}", LICENSE_TEXT);
    } else {
        println!(
            "\nstandalorm {}\nUse the Django ORM in standalone scripts.\n\n\
             Copyright (c) 2026 Standalorm Contributors.\n\
             Licensed under MIT OR Apache-2.0. Run `standalorm about --license` for details.\n",
            env!("CARGO_PKG_VERSION")
        );
    }
    Ok(())
}
