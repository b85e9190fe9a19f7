//! Release workflow orchestration
//!
//! Sequences the release as a fixed series of states:
//! resolve the target version, pass the repository guards, set aside
//! unrelated changes, write the manifest, commit, tag, and restore.
//! Any failure before the manifest is written aborts with nothing changed.
//! Failures after it still restore the stash before the run is reported
//! as failed.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{resolve, ReleaseMode};
use crate::error::{BumpError, Result};
use crate::git::Git;
use crate::guard::RepositoryGuard;
use crate::manifest::Manifest;
use crate::ui::{format_dry_run, format_transition, Logger};

/// Everything one invocation needs, constructed once and passed down.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub config: Config,
    pub log: Logger,
    /// Directory the run operates from; the manifest path is relative to it
    pub dir: PathBuf,
}

impl ReleaseContext {
    pub fn new(config: Config, log: Logger, dir: impl Into<PathBuf>) -> Self {
        ReleaseContext {
            config,
            log,
            dir: dir.into(),
        }
    }

    /// Manifest path as given to git (relative to `dir`)
    pub fn manifest_pathspec(&self) -> &Path {
        &self.config.manifest
    }

    /// Manifest path on disk
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(&self.config.manifest)
    }
}

/// States a release run passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Idle,
    ConfigLoaded,
    VersionResolved,
    GuardsPassed,
    Stashed,
    Written,
    Committed,
    Tagged,
    Restored,
    Done,
    Aborted,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseState::Idle => "idle",
            ReleaseState::ConfigLoaded => "config-loaded",
            ReleaseState::VersionResolved => "version-resolved",
            ReleaseState::GuardsPassed => "guards-passed",
            ReleaseState::Stashed => "stashed",
            ReleaseState::Written => "written",
            ReleaseState::Committed => "committed",
            ReleaseState::Tagged => "tagged",
            ReleaseState::Restored => "restored",
            ReleaseState::Done => "done",
            ReleaseState::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// Result of a successful release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseReport {
    /// Version in the manifest before the run
    pub previous: String,
    /// Version the run released
    pub version: String,
    /// Tag name, when tagging is enabled
    pub tag: Option<String>,
    pub committed: bool,
    pub tagged: bool,
    pub stashed: bool,
    /// Nothing was persisted; flags above describe what would have happened
    pub dry_run: bool,
    pub trace: Vec<ReleaseState>,
}

/// Drives one release run against a repository.
pub struct Orchestrator<'a, G: Git> {
    ctx: &'a ReleaseContext,
    git: &'a G,
    trace: Vec<ReleaseState>,
}

impl<'a, G: Git> Orchestrator<'a, G> {
    pub fn new(ctx: &'a ReleaseContext, git: &'a G) -> Self {
        Orchestrator {
            ctx,
            git,
            trace: vec![ReleaseState::Idle],
        }
    }

    /// States visited so far, including `Aborted` after a failure
    pub fn trace(&self) -> &[ReleaseState] {
        &self.trace
    }

    /// Run the release for `mode`.
    ///
    /// # Returns
    /// * `Ok(ReleaseReport)` - The run completed (or was fully simulated)
    /// * `Err` - The first failure; the stash is already restored
    pub fn run(&mut self, mode: &ReleaseMode) -> Result<ReleaseReport> {
        self.enter(ReleaseState::ConfigLoaded);
        let result = match mode {
            ReleaseMode::Bump(request) => {
                self.ctx.log.debug(&format!("bump mode: {}", request));
                self.bump(|current| resolve(current, request))
            }
            ReleaseMode::TagOnly => self.tag_only(),
        };

        match result {
            Ok(mut report) => {
                self.enter(ReleaseState::Done);
                report.trace = self.trace.clone();
                Ok(report)
            }
            Err(e) => {
                self.enter(ReleaseState::Aborted);
                Err(e)
            }
        }
    }

    fn bump(&mut self, compute: impl FnOnce(&str) -> Result<String>) -> Result<ReleaseReport> {
        let ctx = self.ctx;
        let config = &ctx.config;
        let log = &ctx.log;

        let manifest = Manifest::load(ctx.manifest_path())?;
        let previous = manifest.version().to_string();
        let version = compute(&previous)?;
        self.enter(ReleaseState::VersionResolved);
        log.info(&format!(
            "Version {}",
            format_transition(&previous, &version)
        ));

        let guard = RepositoryGuard::new(self.git, ctx.manifest_pathspec(), log);
        guard.check_manifest_clean()?;
        if config.check_remote {
            guard.check_remote_up_to_date()?;
        }
        self.enter(ReleaseState::GuardsPassed);

        let stash = guard.snapshot(&version)?;
        let stashed = stash.is_present();
        if stashed {
            self.enter(ReleaseState::Stashed);
        }

        let mut report = ReleaseReport {
            previous,
            version,
            tag: None,
            committed: false,
            tagged: false,
            stashed,
            dry_run: config.dry_run,
            trace: Vec::new(),
        };

        let published = self.publish(&manifest, &mut report);
        if published.is_err() && stashed {
            log.warn("Release step failed, restoring working tree");
        }

        let restored = stash.restore();
        self.enter(ReleaseState::Restored);

        if let Err(e) = published {
            if let Err(pop) = restored {
                log.error(&format!(
                    "Failed to restore stashed changes, run `git stash pop` manually: {}",
                    pop
                ));
            }
            return Err(e);
        }
        restored?;

        if report.dry_run {
            log.success(&format!("Dry run complete, would release {}", report.version));
        } else {
            log.success(&format!("Released {}", report.version));
        }
        Ok(report)
    }

    /// Write, stage, commit and tag. Runs inside the stash scope.
    fn publish(&mut self, manifest: &Manifest, report: &mut ReleaseReport) -> Result<()> {
        let ctx = self.ctx;
        let config = &ctx.config;
        let log = &ctx.log;
        let pathspec = ctx.manifest_pathspec();

        if config.dry_run {
            log.info(&format_dry_run(&format!(
                "would write version {} to {}",
                report.version,
                manifest.path().display()
            )));
        } else {
            manifest.write(&report.version)?;
            log.debug(&format!("wrote {}", manifest.path().display()));
        }
        self.enter(ReleaseState::Written);

        if !config.commit.enabled && !config.tag.enabled {
            log.boundary(&BoundaryWarning::BothStepsDisabled);
        }

        self.git.add(pathspec)?;

        if config.commit.enabled {
            let message = config.commit_template().render(&report.version);
            self.git.commit(&message, pathspec)?;
            if config.dry_run {
                log.info(&format_dry_run(&format!("would commit \"{}\"", message)));
            } else {
                log.success(&format!("Committed \"{}\"", message));
            }
            report.committed = true;
            self.enter(ReleaseState::Committed);
        }

        if config.tag.enabled {
            let name = config.tag_template().render(&report.version);
            if !config.commit.enabled {
                log.boundary(&BoundaryWarning::TagWithoutCommit { tag: name.clone() });
            }
            report.tag = Some(name.clone());
            self.git.tag(&name)?;
            if config.dry_run {
                log.info(&format_dry_run(&format!("would tag {}", name)));
            } else {
                log.success(&format!("Tagged {}", name));
            }
            report.tagged = true;
            self.enter(ReleaseState::Tagged);
        }

        Ok(())
    }

    /// Tag the version already in the manifest. No stash, write or commit.
    fn tag_only(&mut self) -> Result<ReleaseReport> {
        let ctx = self.ctx;
        let config = &ctx.config;
        let log = &ctx.log;

        if !config.tag.enabled {
            return Err(BumpError::TagDisabled);
        }

        let manifest = Manifest::load(ctx.manifest_path())?;
        let version = manifest.version().to_string();

        let guard = RepositoryGuard::new(self.git, ctx.manifest_pathspec(), log);
        guard.check_manifest_clean()?;
        if config.check_remote {
            guard.check_remote_up_to_date()?;
        }
        self.enter(ReleaseState::GuardsPassed);

        let name = config.tag_template().render(&version);
        self.git.tag(&name)?;
        self.enter(ReleaseState::Tagged);

        if config.dry_run {
            log.success(&format!("Dry run complete, would tag {}", name));
        } else {
            log.success(&format!("Tagged {}", name));
        }

        Ok(ReleaseReport {
            previous: version.clone(),
            version,
            tag: Some(name),
            committed: false,
            tagged: true,
            stashed: false,
            dry_run: config.dry_run,
            trace: Vec::new(),
        })
    }

    fn enter(&mut self, state: ReleaseState) {
        self.ctx.log.debug(&format!("state: {}", state));
        self.trace.push(state);
    }
}
