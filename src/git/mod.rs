//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the fixed set of git
//! subcommands git-bump issues, allowing for a real implementation that
//! shells out to the `git` executable and a mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Git] trait. The concrete implementations
//! include:
//!
//! - [system::SystemGit]: runs `git` through a [crate::process::CommandRunner]
//! - [mock::MockGit]: an in-memory repository for testing
//!
//! Code in the release pipeline depends on the [Git] trait rather than a
//! concrete implementation.

pub mod mock;
pub mod system;

pub use mock::MockGit;
pub use system::SystemGit;

use std::path::{Path, PathBuf};

use crate::error::{BumpError, Result};

/// Git operations needed by the release pipeline.
///
/// ## Paths
///
/// Paths are relative to the directory the implementation runs git in,
/// as git itself interprets pathspecs.
///
/// ## Dry run
///
/// Implementations do not know about dry-run; the runner underneath
/// [SystemGit] skips mutating commands instead.
pub trait Git {
    /// Porcelain status lines for a single path; empty when clean
    fn status(&self, path: &Path) -> Result<String>;

    /// Paths that differ from HEAD (staged or not), excluding `exclude`
    fn changed_paths(&self, exclude: &Path) -> Result<Vec<String>>;

    /// Current branch name, `None` on a detached HEAD
    fn current_branch(&self) -> Result<Option<String>>;

    /// Configured upstream of `branch` (e.g. `origin/main`), if any
    fn upstream(&self, branch: &str) -> Result<Option<String>>;

    /// Update remote-tracking refs
    fn fetch(&self) -> Result<()>;

    /// Commit hash a revision points to, `None` when it does not exist
    fn resolve_ref(&self, rev: &str) -> Result<Option<String>>;

    /// Best common ancestor of two revisions, `None` for unrelated histories
    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>>;

    /// Number of commits in a revision range (e.g. `HEAD..origin/main`)
    fn count_commits(&self, range: &str) -> Result<u64>;

    /// Stash working-tree changes, leaving the index intact
    fn stash_push(&self, message: &str) -> Result<()>;

    /// Re-apply and drop the most recent stash
    fn stash_pop(&self) -> Result<()>;

    /// Stage a path
    fn add(&self, path: &Path) -> Result<()>;

    /// Commit only `path` with `message`
    fn commit(&self, message: &str, path: &Path) -> Result<()>;

    /// Create a lightweight tag at HEAD
    fn tag(&self, name: &str) -> Result<()>;
}

/// Finds the work tree root of the repository containing `path`.
///
/// # Returns
/// * `Ok(PathBuf)` - The work tree root
/// * `Err` - If `path` is not inside a repository or the repository is bare
pub fn discover_workdir(path: &Path) -> Result<PathBuf> {
    let repo = git2::Repository::discover(path)?;
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| BumpError::config("repository has no working tree"))
}
