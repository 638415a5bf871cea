//! Check command implementation

use colored::Colorize;
use fw_component::{Platform, Resolver};

use crate::context::ProjectContext;
use crate::error::{CliError, Result};

/// Run the check command
///
/// Resolves `components` (or the configured ones) against the configured
/// platform, optionally overriding its version.
pub fn run_check(
    ctx: &ProjectContext,
    components: &[String],
    sdk_version: Option<&str>,
    json: bool,
) -> Result<()> {
    let platform = match sdk_version {
        Some(v) => Platform::parse(&ctx.config.platform.framework, v)?,
        None => ctx.config.platform.clone(),
    };

    let requested = if components.is_empty() {
        ctx.config.build.components.as_slice()
    } else {
        components
    };
    if requested.is_empty() {
        return Err(CliError::user(format!(
            "no components requested; list them in [build].components of {} or pass them as arguments",
            ctx.config_path.display()
        )));
    }

    let build = Resolver::new(&ctx.registry).resolve(requested, &platform)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&build)?);
        return Ok(());
    }

    println!(
        "{} {} component(s) for {}",
        "Resolved".green().bold(),
        build.order.len(),
        platform.to_string().cyan()
    );
    println!();
    for (i, descriptor) in build.order.iter().enumerate() {
        let floor = descriptor
            .min_platform_version()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "any".to_string());
        println!(
            "  {:>2}. {:<16} {}",
            i + 1,
            descriptor.name().green(),
            format!("(platform {floor})").dimmed()
        );
    }

    Ok(())
}
