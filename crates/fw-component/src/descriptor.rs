//! The immutable registration record for one firmware component.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::version::VersionConstraint;

/// Registration record for one pluggable firmware component.
///
/// Fields are private: a descriptor is validated once at construction and
/// read-only afterwards. Cloning yields an independent, equal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDescriptor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "codeowners")]
    owners: Vec<String>,
    dependencies: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_platform_version: Option<VersionConstraint>,
}

impl ComponentDescriptor {
    /// Start building a descriptor for the component `name`.
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            description: None,
            owners: Vec::new(),
            dependencies: Vec::new(),
            min_platform_version: None,
        }
    }

    /// Component identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional human-readable description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Owner handles, in declaration order.
    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// Components that must be resolved and initialised before this one.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Minimum platform version, if the component declares one.
    pub fn min_platform_version(&self) -> Option<&VersionConstraint> {
        self.min_platform_version.as_ref()
    }

    /// Whether `version` meets this component's platform floor.
    ///
    /// Components without a floor accept every version.
    pub fn supports_platform(&self, version: &semver::Version) -> bool {
        self.min_platform_version
            .as_ref()
            .is_none_or(|c| c.satisfies_version(version))
    }
}

/// Builder for [`ComponentDescriptor`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    description: Option<String>,
    owners: Vec<String>,
    dependencies: Vec<String>,
    min_platform_version: Option<String>,
}

impl DescriptorBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owners.push(owner.into());
        self
    }

    pub fn owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners.extend(owners.into_iter().map(Into::into));
        self
    }

    pub fn dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Set the platform floor from a constraint string such as `">=4.4.0"`.
    pub fn min_platform_version(mut self, constraint: impl Into<String>) -> Self {
        self.min_platform_version = Some(constraint.into());
        self
    }

    /// Validate and produce the descriptor.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if the name or a dependency name is not a
    ///   valid component identifier
    /// - [`Error::SelfDependency`] if the component depends on itself
    /// - [`Error::VersionConstraintParse`] if the platform floor is malformed
    pub fn build(self) -> Result<ComponentDescriptor> {
        validate_name(&self.name)?;

        let mut dependencies = BTreeSet::new();
        for dep in self.dependencies {
            validate_name(&dep)?;
            if dep == self.name {
                return Err(Error::SelfDependency(self.name));
            }
            dependencies.insert(dep);
        }

        let min_platform_version = self
            .min_platform_version
            .as_deref()
            .map(VersionConstraint::parse)
            .transpose()?;

        Ok(ComponentDescriptor {
            name: self.name,
            description: self.description,
            owners: self.owners,
            dependencies,
            min_platform_version,
        })
    }
}

/// Check that `name` is a valid component identifier.
///
/// Identifiers are non-empty and use ASCII alphanumerics and underscores,
/// so they double as directory names and C identifiers.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "component name must not be empty".to_string(),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "component name must contain only alphanumeric characters or underscores"
                .to_string(),
        });
    }
    Ok(())
}
