use crate::domain::prerelease::{PreRelease, DEFAULT_PREID};
use crate::domain::release::next_release;
use crate::error::{BumpError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Requested version bump. Exactly one per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpRequest {
    Patch,
    Minor,
    Major,
    /// Pre-release bump with an optional identifier (defaults to `rc`)
    Prerelease(Option<String>),
    /// Literal target version
    Exact(String),
    /// Release-suffix bump with an optional prefix
    Release(Option<String>),
}

impl fmt::Display for BumpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpRequest::Patch => write!(f, "patch"),
            BumpRequest::Minor => write!(f, "minor"),
            BumpRequest::Major => write!(f, "major"),
            BumpRequest::Prerelease(Some(id)) => write!(f, "prerelease ({})", id),
            BumpRequest::Prerelease(None) => write!(f, "prerelease"),
            BumpRequest::Exact(v) => write!(f, "exact {}", v),
            BumpRequest::Release(Some(p)) => write!(f, "release ({})", p),
            BumpRequest::Release(None) => write!(f, "release"),
        }
    }
}

/// Raw bump selectors as they arrive from the command line.
///
/// Several optional flags where exactly one may be set; `into_mode` turns
/// them into a single [`ReleaseMode`] or fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpSelection {
    pub patch: bool,
    pub minor: bool,
    pub major: bool,
    /// `Some(None)` for `--prerelease` without an identifier
    pub prerelease: Option<Option<String>>,
    pub exact: Option<String>,
    pub release: bool,
    pub tag_only: bool,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseMode {
    Bump(BumpRequest),
    /// Tag the version already in the manifest
    TagOnly,
}

impl BumpSelection {
    /// Number of selectors that are set
    pub fn selected(&self) -> usize {
        [
            self.patch,
            self.minor,
            self.major,
            self.prerelease.is_some(),
            self.exact.is_some(),
            self.release,
            self.tag_only,
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// Collapse the selectors into one mode.
    ///
    /// # Arguments
    /// * `release_prefix` - Prefix for `--release`, already merged from config and CLI
    ///
    /// # Errors
    /// `AmbiguousBumpRequest` when zero or several selectors are set.
    pub fn into_mode(self, release_prefix: Option<String>) -> Result<ReleaseMode> {
        let selected = self.selected();
        if selected != 1 {
            return Err(BumpError::AmbiguousBumpRequest { selected });
        }

        let mode = if self.patch {
            ReleaseMode::Bump(BumpRequest::Patch)
        } else if self.minor {
            ReleaseMode::Bump(BumpRequest::Minor)
        } else if self.major {
            ReleaseMode::Bump(BumpRequest::Major)
        } else if let Some(preid) = self.prerelease {
            ReleaseMode::Bump(BumpRequest::Prerelease(preid))
        } else if let Some(exact) = self.exact {
            ReleaseMode::Bump(BumpRequest::Exact(exact))
        } else if self.release {
            ReleaseMode::Bump(BumpRequest::Release(release_prefix))
        } else {
            ReleaseMode::TagOnly
        };

        Ok(mode)
    }
}

/// Compute the target version for `request` from `current`.
///
/// Pure function. Numeric bumps follow the usual semver increment rules:
/// lower components reset to zero, pre-release and build metadata are
/// dropped, and a pre-release of the bumped target is promoted instead of
/// skipped (`1.3.0-rc.1 --minor` gives `1.3.0`).
///
/// # Errors
/// * `InvalidVersion` - `current` or an exact target is not valid semver
/// * `VersionComputationFailed` - the result would not be greater than `current`
/// * `InvalidReleaseFormat` - see [`next_release`]
pub fn resolve(current: &str, request: &BumpRequest) -> Result<String> {
    match request {
        BumpRequest::Exact(target) => {
            Version::parse(target).map_err(|e| {
                BumpError::invalid_version(format!("'{}' is not valid semver: {}", target, e))
            })?;
            Ok(target.clone())
        }
        BumpRequest::Release(prefix) => next_release(current, prefix.as_deref()),
        _ => {
            let parsed = parse_current(current)?;
            let next = increment(&parsed, request)?;
            if next <= parsed {
                return Err(BumpError::computation(
                    current,
                    format!("{} bump gives {} which is not greater", request, next),
                ));
            }
            Ok(next.to_string())
        }
    }
}

fn parse_current(current: &str) -> Result<Version> {
    Version::parse(current).map_err(|e| {
        BumpError::invalid_version(format!(
            "current version '{}' is not valid semver: {}",
            current, e
        ))
    })
}

fn increment(current: &Version, request: &BumpRequest) -> Result<Version> {
    let overflow = || BumpError::computation(current.to_string(), "version component overflow");
    let mut next = Version::new(current.major, current.minor, current.patch);
    let is_pre = !current.pre.is_empty();

    match request {
        BumpRequest::Major => {
            if !(is_pre && current.minor == 0 && current.patch == 0) {
                next.major = current.major.checked_add(1).ok_or_else(overflow)?;
                next.minor = 0;
                next.patch = 0;
            }
        }
        BumpRequest::Minor => {
            if !(is_pre && current.patch == 0) {
                next.minor = current.minor.checked_add(1).ok_or_else(overflow)?;
                next.patch = 0;
            }
        }
        BumpRequest::Patch => {
            if !is_pre {
                next.patch = current.patch.checked_add(1).ok_or_else(overflow)?;
            }
        }
        BumpRequest::Prerelease(preid) => {
            let id = preid.as_deref().unwrap_or(DEFAULT_PREID);
            PreRelease::validate_identifier(id)?;

            let pre = if is_pre {
                match PreRelease::parse(current.pre.as_str()) {
                    Some(existing) if existing.identifier == id => existing.increment_iteration()?,
                    _ => PreRelease::new(id, Some(0)),
                }
            } else {
                next.patch = current.patch.checked_add(1).ok_or_else(overflow)?;
                PreRelease::new(id, Some(0))
            };

            next.pre = Prerelease::new(&pre.to_string())
                .map_err(|e| BumpError::computation(current.to_string(), e.to_string()))?;
        }
        BumpRequest::Exact(_) | BumpRequest::Release(_) => {
            return Err(BumpError::computation(
                current.to_string(),
                format!("{} is not a semver increment", request),
            ));
        }
    }

    next.build = BuildMetadata::EMPTY;
    Ok(next)
}
