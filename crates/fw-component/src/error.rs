use std::path::PathBuf;

/// Errors that can occur while loading, registering, or resolving components.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse a component manifest or build configuration TOML.
    #[error("failed to parse TOML: {0}")]
    ManifestParse(#[from] toml::de::Error),

    /// Component manifest file not found at the expected path.
    #[error("component manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Build configuration file not found.
    #[error("build configuration not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Failed to serialize a component manifest.
    #[error("failed to serialize component manifest: {0}")]
    ManifestSerialize(String),

    /// Manifest name does not match the directory it was discovered in.
    #[error("component manifest at {path} declares '{declared}', expected '{expected}'")]
    NameMismatch {
        path: PathBuf,
        declared: String,
        expected: String,
    },

    /// Invalid component identifier.
    #[error("invalid component name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A component lists itself as a dependency.
    #[error("component '{0}' cannot depend on itself")]
    SelfDependency(String),

    /// Invalid version string.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Invalid version constraint.
    #[error("invalid version constraint '{constraint}': {reason}")]
    VersionConstraintParse { constraint: String, reason: String },

    /// A requested component is not registered.
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// A declared dependency is absent from the component graph.
    #[error("component '{component}' depends on '{dependency}', which is not registered")]
    UnresolvedDependency {
        component: String,
        dependency: String,
    },

    /// The target platform version is below a component's floor.
    #[error(
        "component '{component}' requires {framework} {required}, but the target is {framework} {actual}"
    )]
    IncompatiblePlatform {
        component: String,
        framework: String,
        required: String,
        actual: String,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle between: {}", participants.join(", "))]
    DependencyCycle { participants: Vec<String> },

    /// I/O error reading component files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is one of the two build-configuration failures
    /// raised by resolution against a concrete target.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedDependency { .. } | Error::IncompatiblePlatform { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
