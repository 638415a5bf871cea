//! Project build configuration from `firmware.toml`.
//!
//! ```toml
//! [platform]
//! framework = "esp-idf"
//! version = "4.4.2"
//!
//! [build]
//! components = ["wifi_udp"]
//! component_dirs = ["components"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::registry::ComponentRegistry;

/// Canonical project configuration filename.
pub const CONFIG_FILENAME: &str = "firmware.toml";

/// Parsed `firmware.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub platform: Platform,
    #[serde(default)]
    pub build: BuildSection,
}

/// The `[build]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Components requested for the firmware image.
    #[serde(default)]
    pub components: Vec<String>,
    /// Directories searched for component subdirectories, relative to the
    /// configuration file.
    #[serde(default)]
    pub component_dirs: Vec<PathBuf>,
}

impl BuildConfig {
    /// Parse a build configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a build configuration from disk.
    ///
    /// Relative `component_dirs` are rebased onto the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let mut config = Self::parse(&std::fs::read_to_string(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for dir in &mut config.build.component_dirs {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(config)
    }

    /// Build a registry holding the builtins plus every component found in
    /// the configured directories.
    pub fn registry(&self) -> Result<ComponentRegistry> {
        let mut registry = ComponentRegistry::with_builtins()?;
        for dir in &self.build.component_dirs {
            let count = registry.extend_from_dir(dir)?;
            tracing::debug!(dir = %dir.display(), count, "loaded component directory");
        }
        Ok(registry)
    }
}
