//! The target platform a build is configured against.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::version::parse_version;

/// Framework name used when none is configured.
pub const DEFAULT_FRAMEWORK: &str = "esp-idf";

/// Target SDK: a framework name and its concrete version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default = "default_framework")]
    pub framework: String,
    #[serde(with = "version_string")]
    pub version: Version,
}

impl Platform {
    pub fn new(framework: impl Into<String>, version: Version) -> Self {
        Self {
            framework: framework.into(),
            version,
        }
    }

    /// Parse a platform from a framework name and a version string such as
    /// `"v4.4.2"` or `"5.1"`.
    pub fn parse(framework: impl Into<String>, version: &str) -> Result<Self> {
        Ok(Self::new(framework, parse_version(version)?))
    }
}

fn default_framework() -> String {
    DEFAULT_FRAMEWORK.to_string()
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.framework, self.version)
    }
}

/// Serde adapter accepting the relaxed version forms of [`parse_version`].
mod version_string {
    use semver::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Version, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Version, D::Error> {
        let raw = String::deserialize(d)?;
        crate::version::parse_version(&raw).map_err(serde::de::Error::custom)
    }
}
