use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version format: '{0}'")]
    InvalidFormat(String),
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Semantic version of the plugin API a module was built against
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion(Version);

impl ApiVersion {
    /// Creates a new API version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Caret compatibility: a module built against `other` runs on a host
    /// at `self` when `^other` matches `self` (same major, or same minor
    /// while the major is 0).
    pub fn is_compatible_with(&self, other: &ApiVersion) -> bool {
        match VersionReq::parse(&format!("^{}", other.0)) {
            Ok(req) => req.matches(&self.0),
            Err(_) => false,
        }
    }

    pub fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.split('.').count() != 3 {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }
        Version::parse(s)
            .map(ApiVersion)
            .map_err(|e| VersionError::ParseError(e.to_string()))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a plugin's self-declared version string.
///
/// Plugin versions are informational; callers log a warning on failure and
/// keep the plugin.
pub fn parse_plugin_version(version: &str) -> Result<Version, VersionError> {
    Version::parse(version).map_err(|e| VersionError::ParseError(format!("'{}': {}", version, e)))
}
