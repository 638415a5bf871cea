//! Build-configuration resolution.
//!
//! Given the components a firmware build asks for and the target platform,
//! [`Resolver::resolve`] computes the transitive dependency closure, checks
//! every component's platform floor, and orders the closure
//! dependencies-first. Any failure aborts before a build step runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::dependency::DependencyGraph;
use crate::descriptor::ComponentDescriptor;
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::registry::ComponentRegistry;

/// The outcome of a successful resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBuild {
    pub platform: Platform,
    /// Components in initialisation order: every component appears after
    /// all of its dependencies.
    pub order: Vec<ComponentDescriptor>,
}

impl ResolvedBuild {
    /// Names in initialisation order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(ComponentDescriptor::name).collect()
    }
}

/// Resolves requested components against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `requested` for `platform`.
    ///
    /// Components are visited in sorted order so the first error reported
    /// is the same on every run.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownComponent`] if a requested component is not registered
    /// - [`Error::UnresolvedDependency`] naming the first missing dependency
    /// - [`Error::IncompatiblePlatform`] for the first component whose floor
    ///   the platform does not meet
    /// - [`Error::DependencyCycle`] if the closure is cyclic
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
        platform: &Platform,
    ) -> Result<ResolvedBuild> {
        let closure = self.closure(requested)?;
        tracing::debug!(components = closure.len(), "computed dependency closure");

        for descriptor in &closure {
            check_platform(descriptor, platform)?;
        }

        let graph = DependencyGraph::from_descriptors(closure.iter().copied());
        let order = graph
            .topological_sort()?
            .into_iter()
            .filter_map(|name| self.registry.get(&name).cloned())
            .collect::<Vec<_>>();

        tracing::info!(
            platform = %platform,
            order = ?order.iter().map(ComponentDescriptor::name).collect::<Vec<_>>(),
            "resolved build"
        );

        Ok(ResolvedBuild {
            platform: platform.clone(),
            order,
        })
    }

    /// Check that every dependency declared anywhere in the registry exists.
    ///
    /// Returns the first missing `(component, dependency)` pair as an
    /// [`Error::UnresolvedDependency`].
    pub fn validate_registry(&self) -> Result<()> {
        let graph = DependencyGraph::from_descriptors(self.registry.iter());
        match graph.missing_dependencies().first() {
            Some(&(component, dependency)) => Err(Error::UnresolvedDependency {
                component: component.to_string(),
                dependency: dependency.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Transitive closure of `requested`, sorted by name.
    fn closure<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<&'a ComponentDescriptor>> {
        let mut roots: Vec<&str> = requested.iter().map(AsRef::as_ref).collect();
        roots.sort_unstable();
        roots.dedup();

        // Pending components keyed by name; the smallest name is checked next.
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut pending: BTreeMap<&str, &'a ComponentDescriptor> = BTreeMap::new();
        for name in roots {
            let descriptor = self
                .registry
                .get(name)
                .ok_or_else(|| Error::UnknownComponent(name.to_string()))?;
            if seen.insert(descriptor.name()) {
                pending.insert(descriptor.name(), descriptor);
            }
        }

        let mut closure = Vec::new();
        while let Some((_, descriptor)) = pending.pop_first() {
            for dep in descriptor.dependencies() {
                let found = self.registry.get(dep).ok_or_else(|| {
                    Error::UnresolvedDependency {
                        component: descriptor.name().to_string(),
                        dependency: dep.clone(),
                    }
                })?;
                if seen.insert(found.name()) {
                    pending.insert(found.name(), found);
                }
            }
            closure.push(descriptor);
        }

        closure.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(closure)
    }
}

/// Check one component's platform floor against `platform`.
pub fn check_platform(descriptor: &ComponentDescriptor, platform: &Platform) -> Result<()> {
    match descriptor.min_platform_version() {
        Some(floor) if !floor.satisfies_version(&platform.version) => {
            Err(Error::IncompatiblePlatform {
                component: descriptor.name().to_string(),
                framework: platform.framework.clone(),
                required: floor.to_string(),
                actual: platform.version.to_string(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn udp() -> ComponentDescriptor {
        ComponentDescriptor::builder("wifi_udp")
            .owner("@bkbartk")
            .dependency("wifi")
            .min_platform_version(">=4.4.0")
            .build()
            .unwrap()
    }

    fn platform(version: &str) -> Platform {
        Platform::parse("esp-idf", version).unwrap()
    }

    #[test]
    fn test_resolve_orders_dependencies_first() {
        let mut registry = ComponentRegistry::with_builtins().unwrap();
        registry.register(udp());

        let build = Resolver::new(&registry)
            .resolve(&["wifi_udp"], &platform("4.4.0"))
            .unwrap();
        assert_eq!(build.names(), vec!["network", "wifi", "wifi_udp"]);
    }

    #[test]
    fn test_unknown_requested_component() {
        let registry = ComponentRegistry::with_builtins().unwrap();
        let err = Resolver::new(&registry)
            .resolve(&["mqtt"], &platform("5.0.0"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownComponent(ref n) if n == "mqtt"));
    }

    #[test]
    fn test_missing_dependency_named_exactly() {
        let mut registry = ComponentRegistry::new();
        registry.register(udp());

        let err = Resolver::new(&registry)
            .resolve(&["wifi_udp"], &platform("5.0.0"))
            .unwrap_err();
        match err {
            Error::UnresolvedDependency {
                component,
                dependency,
            } => {
                assert_eq!(component, "wifi_udp");
                assert_eq!(dependency, "wifi");
            }
            other => panic!("expected UnresolvedDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_platform_below_floor_rejected() {
        let mut registry = ComponentRegistry::with_builtins().unwrap();
        registry.register(udp());

        let err = Resolver::new(&registry)
            .resolve(&["wifi_udp"], &platform("4.3.0"))
            .unwrap_err();
        match err {
            Error::IncompatiblePlatform {
                component,
                required,
                actual,
                ..
            } => {
                assert_eq!(component, "wifi_udp");
                assert_eq!(required, ">=4.4.0");
                assert_eq!(actual, "4.3.0");
            }
            other => panic!("expected IncompatiblePlatform, got {other:?}"),
        }
    }

    #[test]
    fn test_platform_at_or_above_floor_passes() {
        let mut registry = ComponentRegistry::with_builtins().unwrap();
        registry.register(udp());
        let resolver = Resolver::new(&registry);

        for v in ["4.4.0", "5.0.0"] {
            assert!(resolver.resolve(&["wifi_udp"], &platform(v)).is_ok(), "{v}");
        }
    }

    #[test]
    fn test_transitive_floor_checked() {
        let mut registry = ComponentRegistry::with_builtins().unwrap();
        registry.register(udp());
        registry.register(
            ComponentDescriptor::builder("ntp_client")
                .dependency("wifi_udp")
                .build()
                .unwrap(),
        );

        let err = Resolver::new(&registry)
            .resolve(&["ntp_client"], &platform("4.3.0"))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatiblePlatform { ref component, .. } if component == "wifi_udp"));
    }

    #[test]
    fn test_cycle_reported() {
        let mut registry = ComponentRegistry::new();
        for (name, dep) in [("a", "b"), ("b", "a")] {
            registry.register(
                ComponentDescriptor::builder(name)
                    .dependency(dep)
                    .build()
                    .unwrap(),
            );
        }
        let err = Resolver::new(&registry)
            .resolve(&["a"], &platform("5.0.0"))
            .unwrap_err();
        assert!(matches!(err, Error::DependencyCycle { .. }));
    }

    #[test]
    fn test_first_missing_dependency_in_name_order() {
        let mut registry = ComponentRegistry::new();
        for (name, dep) in [("alpha", "missing_x"), ("beta", "missing_y")] {
            registry.register(
                ComponentDescriptor::builder(name)
                    .dependency(dep)
                    .build()
                    .unwrap(),
            );
        }

        for requested in [["alpha", "beta"], ["beta", "alpha"]] {
            let err = Resolver::new(&registry)
                .resolve(&requested, &platform("5.0.0"))
                .unwrap_err();
            match err {
                Error::UnresolvedDependency {
                    component,
                    dependency,
                } => {
                    assert_eq!(component, "alpha");
                    assert_eq!(dependency, "missing_x");
                }
                other => panic!("expected UnresolvedDependency, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_registry() {
        let mut registry = ComponentRegistry::new();
        registry.register(udp());
        let err = Resolver::new(&registry).validate_registry().unwrap_err();
        assert!(err.is_resolution_failure());

        let mut complete = ComponentRegistry::with_builtins().unwrap();
        complete.register(udp());
        assert!(Resolver::new(&complete).validate_registry().is_ok());
    }
}
