//! Show command implementation

use fw_component::{ComponentManifest, Error};

use crate::context::ProjectContext;
use crate::error::Result;

/// Run the show command
///
/// Prints the descriptor in `component.toml` form, or as JSON.
pub fn run_show(ctx: &ProjectContext, name: &str, json: bool) -> Result<()> {
    let descriptor = ctx
        .registry
        .get(name)
        .ok_or_else(|| Error::UnknownComponent(name.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
    } else {
        let manifest = ComponentManifest::from(descriptor);
        print!("{}", manifest.to_toml()?);
    }
    Ok(())
}
