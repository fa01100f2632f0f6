//! Version gating for plans.
//!
//! A plan may declare `version_range = ">=0.1.0, <0.3.0"` in its metadata;
//! it is then only resolved by wq versions inside that range.

use semver::{Version, VersionReq};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    InvalidVersion { value: String, source: String },
    InvalidRequirement { value: String, source: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidVersion { value, source } => {
                write!(f, "invalid version '{value}': {source}")
            }
            VersionError::InvalidRequirement { value, source } => {
                write!(f, "invalid version_range '{value}': {source}")
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// A parsed `version_range`. An absent or blank range admits every version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    requirement: Option<VersionReq>,
}

impl VersionRange {
    pub fn parse(range: Option<&str>) -> Result<Self, VersionError> {
        let range = range.map(str::trim).filter(|range| !range.is_empty());
        let requirement = match range {
            None => None,
            Some(range) => Some(VersionReq::parse(range).map_err(|e| {
                VersionError::InvalidRequirement {
                    value: range.to_string(),
                    source: e.to_string(),
                }
            })?),
        };
        Ok(Self { requirement })
    }

    pub fn admits(&self, version: &str) -> Result<bool, VersionError> {
        let Some(requirement) = &self.requirement else {
            return Ok(true);
        };
        let version = Version::parse(version).map_err(|e| VersionError::InvalidVersion {
            value: version.to_string(),
            source: e.to_string(),
        })?;
        Ok(requirement.matches(&version))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requirement {
            Some(requirement) => write!(f, "{requirement}"),
            None => f.write_str("*"),
        }
    }
}

/// Check a version against an optional `version_range` string.
///
/// ```
/// use wq::config::matches_requirement;
///
/// assert!(matches_requirement("0.2.0", Some(">=0.1.0, <0.3.0")).unwrap());
/// assert!(!matches_requirement("0.3.0", Some(">=0.1.0, <0.3.0")).unwrap());
/// assert!(matches_requirement("9.9.9", None).unwrap());
/// ```
pub fn matches_requirement(version: &str, range: Option<&str>) -> Result<bool, VersionError> {
    VersionRange::parse(range)?.admits(version)
}
