//! Project context detection
//!
//! Locates `firmware.toml` from any directory inside a project and builds
//! the component registry it describes. This lets commands work from
//! anywhere below the project root.

use std::path::{Path, PathBuf};

use fw_component::{BuildConfig, CONFIG_FILENAME, ComponentRegistry};

use crate::error::{CliError, Result};

/// Configuration and registry for one invocation.
#[derive(Debug)]
pub struct ProjectContext {
    pub config_path: PathBuf,
    pub config: BuildConfig,
    pub registry: ComponentRegistry,
}

impl ProjectContext {
    /// Load the project from an explicit config path, or by searching
    /// upward from `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => find_config(cwd).ok_or_else(|| {
                CliError::user(format!(
                    "no {CONFIG_FILENAME} found in {} or any parent directory",
                    cwd.display()
                ))
            })?,
        };
        tracing::debug!(path = %config_path.display(), "loading build configuration");

        let config = BuildConfig::load(&config_path)?;
        let mut registry = config.registry()?;
        // Project component directories take precedence over the bundled shim
        if !registry.contains(fw_wifi_udp::COMPONENT_NAME) {
            registry.register(fw_wifi_udp::descriptor()?);
        }

        Ok(Self {
            config_path,
            config,
            registry,
        })
    }
}

/// Walk up from `start` looking for `firmware.toml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}
