//! Platform version parsing and minimum-version constraints.
//!
//! Versions follow SemVer 2.0 with two relaxations common to SDK version
//! strings: a leading `v` is accepted (`v4.4.2`) and a missing patch
//! component defaults to `0` (`4.4` → `4.4.0`).
//!
//! Comparison uses SemVer precedence: `(major, minor, patch)` compared
//! lexicographically, then pre-release, where a pre-release sorts *before*
//! its release (`4.4.0-rc1 < 4.4.0`). Build metadata is ignored.
//!
//! # Examples
//!
//! ```
//! use fw_component::version::VersionConstraint;
//!
//! let floor = VersionConstraint::parse(">=4.4.0").unwrap();
//! assert!(floor.satisfies("4.4.0"));
//! assert!(floor.satisfies("v5.1"));
//! assert!(!floor.satisfies("4.3.0"));
//! assert!(!floor.satisfies("4.4.0-rc1"));
//!
//! let range = VersionConstraint::parse(">=4.4,<5.0").unwrap();
//! assert_eq!(range.to_string(), ">=4.4.0,<5.0.0");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `>=`
    Gte,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `<`
    Lt,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Gte => ">=",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Lt => "<",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

/// A single version specifier: an operator paired with a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specifier {
    op: CompareOp,
    version: Version,
}

impl Specifier {
    /// The comparison operator.
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// The version operand.
    pub fn version(&self) -> &Version {
        &self.version
    }

    fn matches(&self, candidate: &Version) -> bool {
        let ord = compare(candidate, &self.version);
        match self.op {
            CompareOp::Gte => ord != Ordering::Less,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Lte => ord != Ordering::Greater,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.version)
    }
}

/// Compare two versions by SemVer precedence, ignoring build metadata.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// A parsed version constraint that can be checked against concrete versions.
///
/// Comma-separated specifiers must all match. `Display` renders the
/// canonical form (every version written as a full triple), so parsing the
/// rendered string yields an equal constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionConstraint {
    specifiers: Vec<Specifier>,
}

impl VersionConstraint {
    /// Parse a version constraint string.
    ///
    /// Accepts `>=4.4.0`, `>=4.4`, `>=v4.4.0`, `>=4.4,<5`, `==4.4.2`,
    /// `!=4.3.0` and a bare version (meaning `==`).
    pub fn parse(constraint: &str) -> Result<Self> {
        let mut specifiers = Vec::new();

        for part in constraint.split(',').map(str::trim) {
            if part.is_empty() {
                continue;
            }
            specifiers.push(parse_specifier(part)?);
        }

        if specifiers.is_empty() {
            return Err(Error::VersionConstraintParse {
                constraint: constraint.to_string(),
                reason: "empty constraint".to_string(),
            });
        }

        Ok(Self { specifiers })
    }

    /// Check if a version string satisfies this constraint.
    ///
    /// Returns `false` if the version string cannot be parsed.
    pub fn satisfies(&self, version: &str) -> bool {
        match parse_version(version) {
            Ok(v) => self.satisfies_version(&v),
            Err(_) => false,
        }
    }

    /// Check if a `semver::Version` satisfies this constraint.
    pub fn satisfies_version(&self, version: &Version) -> bool {
        self.specifiers.iter().all(|spec| spec.matches(version))
    }

    /// The individual specifiers, in declaration order.
    pub fn specifiers(&self) -> &[Specifier] {
        &self.specifiers
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specifiers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionConstraint {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<VersionConstraint> for String {
    fn from(c: VersionConstraint) -> Self {
        c.to_string()
    }
}

/// Parse a single specifier like `>=4.4` or `<5.0.0`.
fn parse_specifier(s: &str) -> Result<Specifier> {
    let (op, version_str) = if let Some(rest) = s.strip_prefix(">=") {
        (CompareOp::Gte, rest)
    } else if let Some(rest) = s.strip_prefix("<=") {
        (CompareOp::Lte, rest)
    } else if let Some(rest) = s.strip_prefix("!=") {
        (CompareOp::Ne, rest)
    } else if let Some(rest) = s.strip_prefix("==") {
        (CompareOp::Eq, rest)
    } else if let Some(rest) = s.strip_prefix('>') {
        (CompareOp::Gt, rest)
    } else if let Some(rest) = s.strip_prefix('<') {
        (CompareOp::Lt, rest)
    } else {
        // Bare version implies ==
        (CompareOp::Eq, s)
    };

    let version_str = version_str.trim();
    let version = parse_version(version_str).map_err(|_| Error::VersionConstraintParse {
        constraint: s.to_string(),
        reason: format!("invalid version: {version_str}"),
    })?;

    Ok(Specifier { op, version })
}

/// Parse a platform version string into a `semver::Version`.
///
/// - `"4.4.2"` -> `4.4.2`
/// - `"v4.4"` -> `4.4.0`
/// - `"4"` -> error
pub fn parse_version(s: &str) -> Result<Version> {
    let trimmed = s.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(v) = Version::parse(bare) {
        return Ok(v);
    }

    // major.minor with optional pre-release/build: insert the patch before them
    let split_at = bare.find(['-', '+']).unwrap_or(bare.len());
    let (core, suffix) = bare.split_at(split_at);
    let with_patch = format!("{core}.0{suffix}");
    Version::parse(&with_patch).map_err(|e| Error::InvalidVersion {
        version: s.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // --- VersionConstraint::parse ---

    #[test]
    fn test_parse_gte() {
        let c = VersionConstraint::parse(">=4.4.0").unwrap();
        assert_eq!(c.specifiers().len(), 1);
        assert_eq!(c.specifiers()[0].op(), CompareOp::Gte);
        assert_eq!(c.specifiers()[0].version(), &Version::new(4, 4, 0));
    }

    #[test]
    fn test_parse_compound() {
        let c = VersionConstraint::parse(">=4.4, <5.0").unwrap();
        assert_eq!(c.specifiers().len(), 2);
    }

    #[test]
    fn test_parse_bare_version_means_eq() {
        let c = VersionConstraint::parse("4.4.2").unwrap();
        assert_eq!(c.specifiers()[0].op(), CompareOp::Eq);
        assert_eq!(c.to_string(), "==4.4.2");
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert!(VersionConstraint::parse("").is_err());
        assert!(VersionConstraint::parse(" , ").is_err());
    }

    #[test]
    fn test_parse_garbage_rejected() {
        let err = VersionConstraint::parse(">=abc").unwrap_err();
        assert!(matches!(err, Error::VersionConstraintParse { .. }));
    }

    #[test]
    fn test_parse_single_component_rejected() {
        assert!(VersionConstraint::parse(">=4").is_err());
    }

    // --- satisfies ---

    #[test]
    fn test_satisfies_floor() {
        let c = VersionConstraint::parse(">=4.4.0").unwrap();
        assert!(c.satisfies("4.4.0"));
        assert!(c.satisfies("4.4.7"));
        assert!(c.satisfies("4.10.0"));
        assert!(c.satisfies("5.0.0"));
        assert!(!c.satisfies("4.3.0"));
        assert!(!c.satisfies("4.3.99"));
        assert!(!c.satisfies("3.9.9"));
    }

    #[test]
    fn test_satisfies_compound() {
        let c = VersionConstraint::parse(">=4.4,<5.0").unwrap();
        assert!(c.satisfies("4.4.0"));
        assert!(c.satisfies("4.4.6"));
        assert!(!c.satisfies("5.0.0"));
    }

    #[test]
    fn test_satisfies_ne() {
        let c = VersionConstraint::parse("!=4.3.0").unwrap();
        assert!(c.satisfies("4.4.0"));
        assert!(!c.satisfies("4.3.0"));
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        let c = VersionConstraint::parse(">=4.4.0").unwrap();
        assert!(!c.satisfies("4.4.0-rc1"));
        assert!(c.satisfies("4.4.1-beta"));
    }

    #[test]
    fn test_build_metadata_ignored() {
        let c = VersionConstraint::parse("==4.4.0").unwrap();
        assert!(c.satisfies("4.4.0+esp32"));
    }

    #[test]
    fn test_satisfies_v_prefix_and_two_part() {
        let c = VersionConstraint::parse(">=v4.4").unwrap();
        assert!(c.satisfies("v4.4.2"));
        assert!(c.satisfies("5.1"));
    }

    #[test]
    fn test_satisfies_invalid_version_returns_false() {
        let c = VersionConstraint::parse(">=4.4.0").unwrap();
        assert!(!c.satisfies("not-a-version"));
    }

    // --- parse_version ---

    #[test]
    fn test_parse_version_forms() {
        assert_eq!(parse_version("4.4.2").unwrap(), Version::new(4, 4, 2));
        assert_eq!(parse_version("v4.4").unwrap(), Version::new(4, 4, 0));
        assert_eq!(parse_version("  5.0  ").unwrap(), Version::new(5, 0, 0));
        assert_eq!(
            parse_version("5.1-dev").unwrap(),
            Version::parse("5.1.0-dev").unwrap()
        );
    }

    #[test]
    fn test_parse_version_rejects_garbage() {
        let err = parse_version("latest").unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    // --- Display / round trip ---

    #[test]
    fn test_display_is_canonical() {
        let c = VersionConstraint::parse(">= 4.4 , <v5.0").unwrap();
        assert_eq!(c.to_string(), ">=4.4.0,<5.0.0");
    }

    #[test]
    fn test_display_round_trip() {
        let c = VersionConstraint::parse(">=4.4").unwrap();
        let again = VersionConstraint::parse(&c.to_string()).unwrap();
        assert_eq!(c, again);
        assert_eq!(c.to_string(), again.to_string());
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            floor: VersionConstraint,
        }
        let h: Holder = toml::from_str("floor = \">=4.4\"").unwrap();
        assert_eq!(h.floor.to_string(), ">=4.4.0");
        let out = toml::to_string(&h).unwrap();
        assert_eq!(out.trim(), "floor = \">=4.4.0\"");
    }

    #[test]
    fn test_serde_rejects_invalid() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Holder {
            floor: VersionConstraint,
        }
        assert!(toml::from_str::<Holder>("floor = \">=x\"").is_err());
    }
}
