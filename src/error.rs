use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for git-bump operations
#[derive(Error, Debug)]
pub enum BumpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exactly one bump mode must be selected, got {selected}")]
    AmbiguousBumpRequest { selected: usize },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Cannot compute next version from '{current}': {reason}")]
    VersionComputationFailed { current: String, reason: String },

    #[error("Invalid release suffix in '{version}': {reason}")]
    InvalidReleaseFormat { version: String, reason: String },

    #[error("{} has uncommitted changes; commit or stash them first", path.display())]
    UncommittedManifestChanges { path: PathBuf },

    #[error("Branch '{branch}' is {behind} commit(s) behind '{upstream}'; pull before releasing")]
    BranchDiverged {
        branch: String,
        upstream: String,
        behind: u64,
    },

    #[error("Invalid manifest {}: {reason}", path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("`{command}` exited with {}: {}", exit_label(*status), first_line(stderr))]
    GitCommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Tag creation disabled; enable tag.enabled to use --tag-only")]
    TagDisabled,

    #[error("Repository error: {0}")]
    Repository(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-bump
pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BumpError::Config(msg.into())
    }

    /// Create an invalid version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        BumpError::InvalidVersion(msg.into())
    }

    /// Create a version computation error
    pub fn computation(current: impl Into<String>, reason: impl Into<String>) -> Self {
        BumpError::VersionComputationFailed {
            current: current.into(),
            reason: reason.into(),
        }
    }

    /// Create a release suffix error
    pub fn release_format(version: impl Into<String>, reason: impl Into<String>) -> Self {
        BumpError::InvalidReleaseFormat {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create a manifest error for the given path
    pub fn manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BumpError::ManifestInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Full diagnostic text, including captured stderr of failed commands.
    ///
    /// Used by verbose mode; `Display` stays on a single line.
    pub fn detail(&self) -> String {
        match self {
            BumpError::GitCommandFailed {
                command,
                status,
                stderr,
            } => format!(
                "command: {}\nexit: {}\nstderr:\n{}",
                command,
                exit_label(*status),
                stderr.trim_end()
            ),
            other => format!("{:?}", other),
        }
    }
}

fn exit_label(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("(no output)")
}
