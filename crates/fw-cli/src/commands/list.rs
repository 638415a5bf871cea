//! List command implementation

use colored::Colorize;

use crate::context::ProjectContext;
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &ProjectContext, json: bool) -> Result<()> {
    if json {
        let all: Vec<_> = ctx.registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("{}", "Registered Components".bold());
    println!();

    for descriptor in ctx.registry.iter() {
        let deps: Vec<&str> = descriptor
            .dependencies()
            .iter()
            .map(String::as_str)
            .collect();
        let floor = descriptor
            .min_platform_version()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<16} owners: {}  deps: {}  platform: {}",
            descriptor.name().green(),
            descriptor.owners().join(", ").cyan(),
            if deps.is_empty() {
                "-".dimmed().to_string()
            } else {
                deps.join(", ")
            },
            floor
        );
    }

    println!();
    println!(
        "{} {} components registered. Use {} to validate a build.",
        "Total:".dimmed(),
        ctx.registry.len(),
        "fw check".cyan()
    );

    Ok(())
}
