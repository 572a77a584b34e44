//! Format versions and the version gate

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::settings::ChainPolicy;

/// Errors from parsing a format version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,

    #[error("invalid component '{component}' in version '{input}'")]
    InvalidComponent { input: String, component: String },

    #[error("too many components in version '{0}' (expected major.minor.patch)")]
    TooManyComponents(String),
}

/// Data format version, `major.minor.patch`
///
/// Missing trailing components parse as zero ("1.4" == "1.4.0").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl FormatVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for FormatVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = [0u16; 3];
        for (i, component) in trimmed.split('.').enumerate() {
            if i >= parts.len() {
                return Err(VersionError::TooManyComponents(s.to_string()));
            }
            parts[i] = component
                .parse()
                .map_err(|_| VersionError::InvalidComponent {
                    input: s.to_string(),
                    component: component.to_string(),
                })?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Decide whether a batch targeting `target` runs under `current`
pub fn should_migrate(current: FormatVersion, target: FormatVersion, policy: ChainPolicy) -> bool {
    match policy {
        ChainPolicy::Exact => current == target,
        ChainPolicy::Cumulative => current >= target,
    }
}
