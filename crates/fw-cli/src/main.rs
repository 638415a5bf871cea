//! Firmware component CLI
//!
//! The command-line interface for inspecting component descriptors and
//! validating a firmware build's component graph.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::ProjectContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {e}", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        // No command provided - show help hint
        println!("{} Firmware component tool", "fw".green().bold());
        println!();
        println!("Run {} for available commands.", "fw --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let ctx = ProjectContext::load(cli.config.as_deref(), &cwd)?;
    execute_command(&ctx, command)
}

fn execute_command(ctx: &ProjectContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Check {
            components,
            sdk_version,
            json,
        } => commands::run_check(ctx, &components, sdk_version.as_deref(), json),
        Commands::List { json } => commands::run_list(ctx, json),
        Commands::Show { name, json } => commands::run_show(ctx, &name, json),
    }
}
