use std::fs;

use git_bump::cli::{Orchestrator, ReleaseContext, ReleaseState};
use git_bump::config::Config;
use git_bump::domain::{BumpRequest, ReleaseMode};
use git_bump::git::MockGit;
use git_bump::ui::{Level, Logger};
use git_bump::BumpError;
use tempfile::TempDir;

const MANIFEST: &str = "{\n  \"name\": \"demo\",\n  \"version\": \"1.4.2\"\n}\n";

fn workspace(manifest: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), manifest).unwrap();
    dir
}

fn context(dir: &TempDir, config: Config) -> ReleaseContext {
    ReleaseContext::new(config, Logger::memory(true), dir.path())
}

fn read_manifest(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("package.json")).unwrap()
}

#[test]
fn test_minor_release_end_to_end() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new();

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Minor))
        .unwrap();

    assert_eq!(report.previous, "1.4.2");
    assert_eq!(report.version, "1.5.0");
    assert_eq!(report.tag.as_deref(), Some("1.5.0"));
    assert!(report.committed && report.tagged);
    assert!(!report.stashed);
    assert_eq!(
        read_manifest(&dir),
        "{\n  \"name\": \"demo\",\n  \"version\": \"1.5.0\"\n}\n"
    );

    let state = git.state();
    assert_eq!(state.commits, vec!["chore: version 1.5.0"]);
    assert_eq!(state.tags, vec!["1.5.0"]);
    assert_eq!(state.staged, Vec::<String>::new());
    assert!(ctx.log.contains("1.4.2 → 1.5.0"));
}

#[test]
fn test_trace_follows_state_order() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| s.changed = vec!["src/index.js".to_string()]);

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap();

    assert_eq!(
        report.trace,
        vec![
            ReleaseState::Idle,
            ReleaseState::ConfigLoaded,
            ReleaseState::VersionResolved,
            ReleaseState::GuardsPassed,
            ReleaseState::Stashed,
            ReleaseState::Written,
            ReleaseState::Committed,
            ReleaseState::Tagged,
            ReleaseState::Restored,
            ReleaseState::Done,
        ]
    );
    assert_eq!(git.state().stash_depth, 0);
}

#[test]
fn test_prerelease_increments_counter() {
    let dir = workspace("{\n  \"version\": \"2.0.0-rc.1\"\n}\n");
    let ctx = context(&dir, Config::default());
    let git = MockGit::new();

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Prerelease(None)))
        .unwrap();

    assert_eq!(report.version, "2.0.0-rc.2");
    assert_eq!(git.state().tags, vec!["2.0.0-rc.2"]);
}

#[test]
fn test_custom_templates() {
    let dir = workspace(MANIFEST);
    let mut config = Config::default();
    config.commit.message = "release %v".to_string();
    config.tag.name = "v%v".to_string();
    let ctx = context(&dir, config);
    let git = MockGit::new();

    Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Major))
        .unwrap();

    assert_eq!(git.state().commits, vec!["release 2.0.0"]);
    assert_eq!(git.state().tags, vec!["v2.0.0"]);
}

#[test]
fn test_dirty_manifest_aborts_without_changes() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| s.manifest_status = " M package.json".to_string());

    let mut orchestrator = Orchestrator::new(&ctx, &git);
    let err = orchestrator
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap_err();

    assert!(matches!(err, BumpError::UncommittedManifestChanges { .. }));
    assert_eq!(read_manifest(&dir), MANIFEST);
    assert!(git.state().commits.is_empty());
    assert!(git.state().tags.is_empty());
    assert_eq!(orchestrator.trace().last(), Some(&ReleaseState::Aborted));
}

#[test]
fn test_behind_upstream_aborts() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| s.behind = 3);

    let err = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap_err();

    assert!(matches!(err, BumpError::BranchDiverged { behind: 3, .. }));
    assert_eq!(read_manifest(&dir), MANIFEST);
}

#[test]
fn test_remote_check_disabled_skips_fetch() {
    let dir = workspace(MANIFEST);
    let mut config = Config::default();
    config.check_remote = false;
    let ctx = context(&dir, config);
    let git = MockGit::new().with(|s| s.behind = 3);

    Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap();

    assert!(!git.state().calls.contains(&"fetch".to_string()));
}

#[test]
fn test_commit_failure_restores_stash() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| {
        s.changed = vec!["README.md".to_string()];
        s.failing = vec!["commit"];
    });

    let mut orchestrator = Orchestrator::new(&ctx, &git);
    let err = orchestrator
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap_err();

    assert!(matches!(err, BumpError::GitCommandFailed { .. }));
    let state = git.state();
    assert_eq!(state.stash_depth, 0);
    assert!(state.tags.is_empty());
    assert_eq!(
        state.calls.iter().filter(|c| *c == "stash_pop").count(),
        1
    );
    assert!(orchestrator.trace().contains(&ReleaseState::Restored));
    assert!(ctx.log.contains("restoring working tree"));
    // The failure itself is reported once, by the caller
    assert!(ctx
        .log
        .records()
        .iter()
        .all(|record| record.level != Level::Error));
}

#[test]
fn test_failed_restore_after_commit_failure_is_reported() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| {
        s.changed = vec!["README.md".to_string()];
        s.failing = vec!["commit", "stash_pop"];
    });

    let err = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap_err();

    assert!(err.to_string().contains("commit"));
    assert_eq!(git.state().stash_depth, 1);
    let errors: Vec<_> = ctx
        .log
        .records()
        .into_iter()
        .filter(|record| record.level == Level::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("run `git stash pop` manually"));
}

#[test]
fn test_failed_restore_after_success_fails_the_run() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| {
        s.changed = vec!["README.md".to_string()];
        s.failing = vec!["stash_pop"];
    });

    let err = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap_err();

    assert!(err.to_string().contains("stash_pop"));
    assert_eq!(git.state().tags, vec!["1.4.3"]);
}

#[test]
fn test_invalid_current_version_aborts_before_guards() {
    let dir = workspace("{\n  \"version\": \"banana\"\n}\n");
    let ctx = context(&dir, Config::default());
    let git = MockGit::new();

    let err = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap_err();

    assert!(matches!(err, BumpError::InvalidVersion(_)));
    assert!(git.state().calls.is_empty());
}

#[test]
fn test_dry_run_leaves_manifest_untouched() {
    let dir = workspace(MANIFEST);
    let mut config = Config::default();
    config.dry_run = true;
    let ctx = context(&dir, config);
    let git = MockGit::new();

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Minor))
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.version, "1.5.0");
    assert_eq!(read_manifest(&dir), MANIFEST);
    assert!(ctx.log.contains("[dry-run] would write version 1.5.0"));
    assert!(ctx.log.contains("[dry-run] would commit \"chore: version 1.5.0\""));
    assert!(ctx.log.contains("[dry-run] would tag 1.5.0"));
    assert!(!ctx.log.contains("Committed"));
    assert!(!ctx
        .log
        .records()
        .iter()
        .any(|record| record.message.starts_with("Tagged")));
}

#[test]
fn test_commit_disabled_still_tags_with_warning() {
    let dir = workspace(MANIFEST);
    let mut config = Config::default();
    config.commit.enabled = false;
    let ctx = context(&dir, config);
    let git = MockGit::new();

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap();

    assert!(!report.committed);
    assert!(report.tagged);
    assert!(git.state().commits.is_empty());
    assert!(ctx.log.contains("Commit is disabled"));
}

#[test]
fn test_both_steps_disabled_only_writes() {
    let dir = workspace(MANIFEST);
    let mut config = Config::default();
    config.commit.enabled = false;
    config.tag.enabled = false;
    let ctx = context(&dir, config);
    let git = MockGit::new();

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Patch))
        .unwrap();

    assert_eq!(report.tag, None);
    assert!(read_manifest(&dir).contains("1.4.3"));
    assert!(ctx.log.contains("only the manifest"));
}

#[test]
fn test_tag_only_tags_current_version() {
    let dir = workspace(MANIFEST);
    let ctx = context(&dir, Config::default());
    let git = MockGit::new().with(|s| s.changed = vec!["README.md".to_string()]);

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::TagOnly)
        .unwrap();

    assert_eq!(report.version, "1.4.2");
    assert_eq!(git.state().tags, vec!["1.4.2"]);
    assert!(git.state().commits.is_empty());
    assert!(!git.state().calls.contains(&"stash_push".to_string()));
    assert_eq!(read_manifest(&dir), MANIFEST);
}

#[test]
fn test_tag_only_with_tag_disabled_fails() {
    let dir = workspace(MANIFEST);
    let mut config = Config::default();
    config.tag.enabled = false;
    let ctx = context(&dir, config);
    let git = MockGit::new();

    let err = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::TagOnly)
        .unwrap_err();

    assert!(matches!(err, BumpError::TagDisabled));
    assert!(git.state().tags.is_empty());
}

#[test]
fn test_release_suffix_with_prefix() {
    let dir = workspace("{\n  \"version\": \"1.0.0-qa-r1\"\n}\n");
    let ctx = context(&dir, Config::default());
    let git = MockGit::new();

    let report = Orchestrator::new(&ctx, &git)
        .run(&ReleaseMode::Bump(BumpRequest::Release(Some("qa".to_string()))))
        .unwrap();

    assert_eq!(report.version, "1.0.0-qa-r2");
}
