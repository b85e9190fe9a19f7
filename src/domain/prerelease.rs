//! Pre-release identifier handling for semantic versioning
//!
//! Supports the `<identifier>[.<iteration>]` shape (`rc`, `rc.2`, `beta.0`).
//! According to semver.org: https://semver.org/#spec-item-9

use crate::error::{BumpError, Result};
use std::fmt;

/// Identifier used when `--prerelease` is given without one
pub const DEFAULT_PREID: &str = "rc";

/// Pre-release version with optional iteration number
///
/// # Examples
/// - "alpha" -> PreRelease { identifier: "alpha", iteration: None }
/// - "rc.3" -> PreRelease { identifier: "rc", iteration: Some(3) }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub identifier: String,
    pub iteration: Option<u64>,
}

impl PreRelease {
    pub fn new(identifier: impl Into<String>, iteration: Option<u64>) -> Self {
        PreRelease {
            identifier: identifier.into(),
            iteration,
        }
    }

    /// Validate a user supplied pre-release identifier.
    ///
    /// Identifiers follow semver: non-empty, ASCII alphanumerics and hyphens,
    /// no dots (the dot separates the iteration).
    pub fn validate_identifier(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(BumpError::invalid_version("Empty pre-release identifier"));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(BumpError::invalid_version(format!(
                "Invalid pre-release identifier: '{}'",
                id
            )));
        }
        Ok(())
    }

    /// Parse a pre-release string in the `<identifier>[.<iteration>]` shape.
    ///
    /// Returns `None` for anything else (`rc.1.2`, `1`, ...); callers treat
    /// such pre-releases as foreign and start a fresh sequence.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let identifier = parts.next().filter(|p| !p.is_empty())?;
        if identifier.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let iteration = match parts.next() {
            Some(n) => Some(n.parse::<u64>().ok()?),
            None => None,
        };

        if parts.next().is_some() {
            return None;
        }

        Some(PreRelease::new(identifier, iteration))
    }

    /// Next iteration of this pre-release.
    ///
    /// A missing iteration starts at 0 (`rc` -> `rc.0`), which still sorts
    /// after the bare identifier.
    pub fn increment_iteration(&self) -> Result<Self> {
        let next = match self.iteration {
            Some(n) => n.checked_add(1).ok_or_else(|| {
                BumpError::computation(self.to_string(), "pre-release iteration overflow")
            })?,
            None => 0,
        };

        Ok(PreRelease::new(self.identifier.clone(), Some(next)))
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let Some(iter) = self.iteration {
            write!(f, ".{}", iter)?;
        }
        Ok(())
    }
}
