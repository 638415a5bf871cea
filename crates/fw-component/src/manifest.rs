//! Component manifest parsing for `component.toml` files.
//!
//! Each component directory carries exactly one manifest named
//! [`MANIFEST_FILENAME`](crate::MANIFEST_FILENAME). The manifest is the
//! on-disk form of a [`ComponentDescriptor`].
//!
//! # Example TOML
//!
//! ```toml
//! [component]
//! name = "wifi_udp"
//! description = "WiFiUDP-compatible UDP sockets for ESP-IDF builds"
//! codeowners = ["@bkbartk"]
//! dependencies = ["wifi"]
//! min_platform_version = ">=4.4.0"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::MANIFEST_FILENAME;
use crate::descriptor::ComponentDescriptor;
use crate::error::{Error, Result};

/// Complete component manifest loaded from `component.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentManifest {
    pub component: ComponentSection,
}

/// The `[component]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSection {
    /// Component identifier (e.g., "wifi_udp").
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner handles (e.g., "@bkbartk").
    #[serde(default)]
    pub codeowners: Vec<String>,
    /// Components that must be present and initialised first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Platform SDK floor (e.g., ">=4.4.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_platform_version: Option<String>,
}

impl ComponentManifest {
    /// Parse a component manifest from a TOML string.
    ///
    /// The manifest is validated by converting it to a descriptor, so a
    /// manifest that parses here always yields a descriptor.
    pub fn from_toml(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        manifest.to_descriptor()?;
        Ok(manifest)
    }

    /// Read and parse a component manifest from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize the manifest back to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ManifestSerialize(e.to_string()))
    }

    /// Build the validated descriptor this manifest declares.
    pub fn to_descriptor(&self) -> Result<ComponentDescriptor> {
        let section = &self.component;
        let mut builder = ComponentDescriptor::builder(&section.name)
            .owners(section.codeowners.iter().cloned())
            .dependencies(section.dependencies.iter().cloned());
        if let Some(ref description) = section.description {
            builder = builder.description(description);
        }
        if let Some(ref floor) = section.min_platform_version {
            builder = builder.min_platform_version(floor);
        }
        builder.build()
    }
}

impl From<&ComponentDescriptor> for ComponentManifest {
    fn from(d: &ComponentDescriptor) -> Self {
        Self {
            component: ComponentSection {
                name: d.name().to_string(),
                description: d.description().map(str::to_string),
                codeowners: d.owners().to_vec(),
                dependencies: d.dependencies().iter().cloned().collect(),
                min_platform_version: d.min_platform_version().map(|c| c.to_string()),
            },
        }
    }
}

/// Load one descriptor from a component directory.
///
/// The manifest's declared name must match the directory name.
pub fn load_component_dir(dir: &Path) -> Result<ComponentDescriptor> {
    let path = dir.join(MANIFEST_FILENAME);
    let descriptor = ComponentManifest::from_path(&path)?.to_descriptor()?;

    if let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) {
        if dir_name != descriptor.name() {
            return Err(Error::NameMismatch {
                path,
                declared: descriptor.name().to_string(),
                expected: dir_name.to_string(),
            });
        }
    }

    Ok(descriptor)
}

/// Discover every component under `root`.
///
/// Each immediate subdirectory holding a `component.toml` is loaded;
/// subdirectories without one are skipped. Results are sorted by directory
/// name so discovery order never depends on the filesystem.
pub fn discover(root: &Path) -> Result<Vec<ComponentDescriptor>> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() && path.join(MANIFEST_FILENAME).is_file() {
            dirs.push(path);
        } else if path.is_dir() {
            tracing::debug!(dir = %path.display(), "skipping directory without component manifest");
        }
    }
    dirs.sort();

    let mut found = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let descriptor = load_component_dir(&dir)?;
        tracing::debug!(component = descriptor.name(), dir = %dir.display(), "discovered component");
        found.push(descriptor);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WIFI_UDP: &str = r#"
[component]
name = "wifi_udp"
codeowners = ["@bkbartk"]
dependencies = ["wifi"]
min_platform_version = ">=4.4.0"
"#;

    #[test]
    fn test_parse_full_manifest() {
        let m = ComponentManifest::from_toml(WIFI_UDP).unwrap();
        assert_eq!(m.component.name, "wifi_udp");
        assert_eq!(m.component.codeowners, vec!["@bkbartk"]);
        assert_eq!(m.component.dependencies, vec!["wifi"]);
        assert_eq!(m.component.min_platform_version.as_deref(), Some(">=4.4.0"));
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let m = ComponentManifest::from_toml("[component]\nname = \"wifi\"\n").unwrap();
        let d = m.to_descriptor().unwrap();
        assert!(d.owners().is_empty());
        assert!(d.dependencies().is_empty());
        assert!(d.min_platform_version().is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = "[component]\nname = \"x\"\nauto_load = [\"y\"]\n";
        assert!(matches!(
            ComponentManifest::from_toml(toml),
            Err(Error::ManifestParse(_))
        ));
    }

    #[test]
    fn test_missing_name_rejected() {
        assert!(ComponentManifest::from_toml("[component]\ncodeowners = []\n").is_err());
    }

    #[test]
    fn test_self_dependency_rejected_at_load() {
        let toml = "[component]\nname = \"wifi_udp\"\ndependencies = [\"wifi_udp\"]\n";
        assert!(matches!(
            ComponentManifest::from_toml(toml),
            Err(Error::SelfDependency(_))
        ));
    }

    #[test]
    fn test_bad_floor_rejected_at_load() {
        let toml = "[component]\nname = \"x\"\nmin_platform_version = \"soon\"\n";
        assert!(matches!(
            ComponentManifest::from_toml(toml),
            Err(Error::VersionConstraintParse { .. })
        ));
    }

    #[test]
    fn test_descriptor_to_manifest_round_trip() {
        let d = ComponentManifest::from_toml(WIFI_UDP)
            .unwrap()
            .to_descriptor()
            .unwrap();
        let text = ComponentManifest::from(&d).to_toml().unwrap();
        let back = ComponentManifest::from_toml(&text)
            .unwrap()
            .to_descriptor()
            .unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn test_from_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ComponentManifest::from_path(&dir.path().join(MANIFEST_FILENAME)).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound(_)));
    }

    #[test]
    fn test_load_component_dir_name_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let comp = dir.path().join("udp");
        std::fs::create_dir(&comp).unwrap();
        std::fs::write(comp.join(MANIFEST_FILENAME), WIFI_UDP).unwrap();

        let err = load_component_dir(&comp).unwrap_err();
        assert!(matches!(err, Error::NameMismatch { ref declared, .. } if declared == "wifi_udp"));
    }
}
