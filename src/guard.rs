//! Repository safety checks and the stash scope.
//!
//! The guard refuses to run when the manifest has uncommitted edits, can
//! refuse to release from a branch that is behind its upstream, and sets
//! aside other working-tree changes for the duration of the release.

use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::error::{BumpError, Result};
use crate::git::Git;
use crate::ui::Logger;

/// Repository state derived for one run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryState {
    pub has_uncommitted_manifest_changes: bool,
    pub has_other_uncommitted_changes: bool,
    pub local_commit: Option<String>,
    pub remote_commit: Option<String>,
    pub merge_base_commit: Option<String>,
}

/// Outcome of the remote freshness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Local contains every upstream commit
    UpToDate { upstream: String },
    /// No upstream to compare against; check skipped
    Skipped(BoundaryWarning),
}

/// Safety checks around a single manifest in a single work tree.
pub struct RepositoryGuard<'a, G: Git> {
    git: &'a G,
    manifest: PathBuf,
    log: &'a Logger,
}

impl<'a, G: Git> RepositoryGuard<'a, G> {
    /// # Arguments
    /// * `manifest` - Manifest path relative to the work tree root
    pub fn new(git: &'a G, manifest: impl Into<PathBuf>, log: &'a Logger) -> Self {
        RepositoryGuard {
            git,
            manifest: manifest.into(),
            log,
        }
    }

    /// Fail when the manifest has any uncommitted change.
    pub fn check_manifest_clean(&self) -> Result<()> {
        let status = self.git.status(&self.manifest)?;
        if !status.is_empty() {
            self.log.debug(&format!("manifest status: {}", status));
            return Err(BumpError::UncommittedManifestChanges {
                path: self.manifest.clone(),
            });
        }
        Ok(())
    }

    /// Fail when the upstream has commits the local branch lacks.
    ///
    /// A missing upstream (or a detached HEAD) skips the check.
    pub fn check_remote_up_to_date(&self) -> Result<RemoteStatus> {
        let branch = match self.git.current_branch()? {
            Some(branch) => branch,
            None => return Ok(self.skip(BoundaryWarning::DetachedHead)),
        };

        let upstream = match self.git.upstream(&branch)? {
            Some(upstream) => upstream,
            None => return Ok(self.skip(BoundaryWarning::NoUpstream { branch })),
        };

        self.log.debug(&format!("fetching to compare {} with {}", branch, upstream));
        self.git.fetch()?;

        let state = self.inspect_remote(&upstream)?;
        if state.remote_commit.is_none() {
            return Ok(self.skip(BoundaryWarning::NoUpstream { branch }));
        }

        let behind = self.git.count_commits(&format!("HEAD..{}", upstream))?;
        if behind > 0 {
            return Err(BumpError::BranchDiverged {
                branch,
                upstream,
                behind,
            });
        }

        Ok(RemoteStatus::UpToDate { upstream })
    }

    /// Take a stash of non-manifest changes when there are any.
    ///
    /// The returned scope pops the stash exactly once: explicitly through
    /// [StashScope::restore], or on drop if the scope is abandoned.
    pub fn snapshot(&self, label: &str) -> Result<StashScope<'a, G>> {
        let changed = self.git.changed_paths(&self.manifest)?;
        if changed.is_empty() {
            self.log.debug("working tree clean, no stash needed");
            return Ok(StashScope::empty(self.git, self.log));
        }

        self.log.info(&format!(
            "Stashing {} uncommitted change(s)",
            changed.len()
        ));
        self.git.stash_push(&format!("git-bump: {}", label))?;
        Ok(StashScope {
            git: self.git,
            log: self.log,
            present: true,
        })
    }

    /// Derive the repository state the checks operate on.
    pub fn inspect(&self) -> Result<RepositoryState> {
        let mut state = match self.git.current_branch()? {
            Some(branch) => match self.git.upstream(&branch)? {
                Some(upstream) => self.inspect_remote(&upstream)?,
                None => RepositoryState::default(),
            },
            None => RepositoryState::default(),
        };
        state.has_uncommitted_manifest_changes = !self.git.status(&self.manifest)?.is_empty();
        state.has_other_uncommitted_changes = !self.git.changed_paths(&self.manifest)?.is_empty();
        Ok(state)
    }

    fn inspect_remote(&self, upstream: &str) -> Result<RepositoryState> {
        let local_commit = self.git.resolve_ref("HEAD")?;
        let remote_commit = self.git.resolve_ref(upstream)?;
        let merge_base_commit = match &remote_commit {
            Some(_) => self.git.merge_base("HEAD", upstream)?,
            None => None,
        };

        let state = RepositoryState {
            local_commit,
            remote_commit,
            merge_base_commit,
            ..Default::default()
        };
        self.log.debug(&format!(
            "local {} remote {} merge-base {}",
            state.local_commit.as_deref().unwrap_or("-"),
            state.remote_commit.as_deref().unwrap_or("-"),
            state.merge_base_commit.as_deref().unwrap_or("-")
        ));
        Ok(state)
    }

    fn skip(&self, warning: BoundaryWarning) -> RemoteStatus {
        self.log.boundary(&warning);
        RemoteStatus::Skipped(warning)
    }
}

/// A stash owned by the current run.
///
/// Restores on every exit path: callers should call [StashScope::restore]
/// to observe the result, and dropping an unrestored scope pops it anyway.
pub struct StashScope<'a, G: Git> {
    git: &'a G,
    log: &'a Logger,
    present: bool,
}

impl<'a, G: Git> StashScope<'a, G> {
    fn empty(git: &'a G, log: &'a Logger) -> Self {
        StashScope {
            git,
            log,
            present: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Pop the stash if one was taken.
    pub fn restore(mut self) -> Result<()> {
        self.pop()
    }

    fn pop(&mut self) -> Result<()> {
        if !self.present {
            return Ok(());
        }
        self.present = false;
        self.log.info("Restoring stashed changes");
        self.git.stash_pop()
    }
}

impl<G: Git> Drop for StashScope<'_, G> {
    fn drop(&mut self) {
        if let Err(e) = self.pop() {
            self.log.error(&format!(
                "Failed to restore stashed changes, run `git stash pop` manually: {}",
                e
            ));
        }
    }
}
