//! Registry mapping component identifiers to descriptors.
//!
//! Registration is explicit: descriptors come from factory functions or from
//! [`discover`](crate::manifest::discover), and the registry holds the only
//! mapping the resolver consults.

use std::collections::HashMap;
use std::path::Path;

use crate::descriptor::ComponentDescriptor;
use crate::error::Result;
use crate::manifest::discover;

/// Registry of known components.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: HashMap<String, ComponentDescriptor>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry populated with the components the build framework
    /// itself provides (`network`, `wifi`).
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for descriptor in builtins()? {
            registry.register(descriptor);
        }
        Ok(registry)
    }

    /// Register a descriptor, returning the one it replaced if any.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Option<ComponentDescriptor> {
        let name = descriptor.name().to_string();
        let previous = self.entries.insert(name.clone(), descriptor);
        if previous.is_some() {
            tracing::warn!(component = %name, "replacing previously registered component");
        } else {
            tracing::debug!(component = %name, "registered component");
        }
        previous
    }

    /// Discover and register every component under `dir`.
    ///
    /// Returns the number of components registered.
    pub fn extend_from_dir(&mut self, dir: &Path) -> Result<usize> {
        let found = discover(dir)?;
        let count = found.len();
        for descriptor in found {
            self.register(descriptor);
        }
        Ok(count)
    }

    /// Look up a component by name.
    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.entries.get(name)
    }

    /// List all registered component names (sorted).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterate over descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        let mut all: Vec<&ComponentDescriptor> = self.entries.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all.into_iter()
    }

    /// Check if a component is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Components supplied by the build framework rather than by component
/// directories.
fn builtins() -> Result<Vec<ComponentDescriptor>> {
    let network = ComponentDescriptor::builder("network")
        .description("IP networking core")
        .owner("@esphome/core")
        .build()?;
    let wifi = ComponentDescriptor::builder("wifi")
        .description("WiFi station and access point support")
        .owner("@esphome/core")
        .dependency("network")
        .build()?;

    Ok(vec![network, wifi])
}
