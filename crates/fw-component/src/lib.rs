//! Component descriptors for firmware builds.
//!
//! This crate provides descriptor records, `component.toml` manifest
//! parsing, platform version constraints, a component registry, and the
//! resolver that orders and validates a build's components.

pub mod config;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod registry;
pub mod resolve;
pub mod version;

/// The canonical filename for component manifest files.
///
/// Every component directory carries one file with this name so the build
/// framework can discover it.
pub const MANIFEST_FILENAME: &str = "component.toml";

pub use config::{BuildConfig, CONFIG_FILENAME};
pub use descriptor::{ComponentDescriptor, DescriptorBuilder};
pub use error::{Error, Result};
pub use manifest::{ComponentManifest, discover};
pub use platform::Platform;
pub use registry::ComponentRegistry;
pub use resolve::{ResolvedBuild, Resolver};
pub use version::VersionConstraint;
