use std::path::{Path, PathBuf};

use crate::error::{BumpError, Result};
use crate::git::Git;
use crate::process::{CommandRunner, Invocation};

/// Git backend that shells out to the system `git` executable.
pub struct SystemGit<R: CommandRunner> {
    runner: R,
    dir: PathBuf,
}

impl<R: CommandRunner> SystemGit<R> {
    /// Run git in `dir`; pathspecs are interpreted relative to it.
    pub fn new(runner: R, dir: impl Into<PathBuf>) -> Self {
        SystemGit {
            runner,
            dir: dir.into(),
        }
    }

    fn git<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new("git")
            .args(["-c", "core.quotePath=false"])
            .args(args)
            .current_dir(&self.dir)
    }

    fn query<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run(&self.git(args))
    }

    /// Query that may legitimately fail; an unsuccessful run yields `None`.
    fn optional_query<I, S>(&self, args: I) -> Result<Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let out = self.runner.run(&self.git(args).ignore_exit_code())?;
        let trimmed = out.trim();
        Ok(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        })
    }

    fn mutate<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run(&self.git(args).mutating()).map(|_| ())
    }
}

fn pathspec(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl<R: CommandRunner> Git for SystemGit<R> {
    fn status(&self, path: &Path) -> Result<String> {
        let spec = pathspec(path);
        let out = self.query(["status", "--porcelain", "--", spec.as_str()])?;
        Ok(out.trim_end().to_string())
    }

    fn changed_paths(&self, exclude: &Path) -> Result<Vec<String>> {
        let exclude = format!(":(exclude){}", pathspec(exclude));
        let out = self.query(["diff", "HEAD", "--name-only", "--", ":/", exclude.as_str()])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        self.optional_query(["symbolic-ref", "--quiet", "--short", "HEAD"])
    }

    fn upstream(&self, branch: &str) -> Result<Option<String>> {
        let reference = format!("refs/heads/{}", branch);
        self.optional_query(["for-each-ref", "--format=%(upstream:short)", reference.as_str()])
    }

    fn fetch(&self) -> Result<()> {
        self.query(["fetch", "--quiet"]).map(|_| ())
    }

    fn resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        let commit = format!("{}^{{commit}}", rev);
        self.optional_query(["rev-parse", "--verify", "--quiet", commit.as_str()])
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        self.optional_query(["merge-base", a, b])
    }

    fn count_commits(&self, range: &str) -> Result<u64> {
        let out = self.query(["rev-list", "--count", range])?;
        out.trim().parse::<u64>().map_err(|e| BumpError::GitCommandFailed {
            command: format!("git rev-list --count {}", range),
            status: Some(0),
            stderr: format!("unexpected output '{}': {}", out.trim(), e),
        })
    }

    fn stash_push(&self, message: &str) -> Result<()> {
        self.mutate(["stash", "push", "--keep-index", "--message", message])
    }

    fn stash_pop(&self) -> Result<()> {
        self.mutate(["stash", "pop"])
    }

    fn add(&self, path: &Path) -> Result<()> {
        let spec = pathspec(path);
        self.mutate(["add", "--", spec.as_str()])
    }

    fn commit(&self, message: &str, path: &Path) -> Result<()> {
        let spec = pathspec(path);
        self.mutate(["commit", "--message", message, "--", spec.as_str()])
    }

    fn tag(&self, name: &str) -> Result<()> {
        self.mutate(["tag", name])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Runner that records invocations and replays canned stdout.
    struct Recorder {
        calls: RefCell<Vec<Invocation>>,
        stdout: String,
    }

    impl Recorder {
        fn new(stdout: &str) -> Self {
            Recorder {
                calls: RefCell::new(Vec::new()),
                stdout: stdout.to_string(),
            }
        }
    }

    impl CommandRunner for &Recorder {
        fn run(&self, invocation: &Invocation) -> Result<String> {
            self.calls.borrow_mut().push(invocation.clone());
            Ok(self.stdout.clone())
        }
    }

    #[test]
    fn test_commands_run_in_dir() {
        let recorder = Recorder::new("");
        let git = SystemGit::new(&recorder, "/repo");
        git.tag("1.5.0").unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls[0].cwd.as_deref(), Some(Path::new("/repo")));
        assert_eq!(calls[0].display(), "git -c core.quotePath=false tag 1.5.0");
        assert!(calls[0].mutating);
    }

    #[test]
    fn test_queries_are_not_mutating() {
        let recorder = Recorder::new(" M package.json\n");
        let git = SystemGit::new(&recorder, "/repo");

        assert_eq!(git.status(Path::new("package.json")).unwrap(), " M package.json");
        assert!(!recorder.calls.borrow()[0].mutating);
    }

    #[test]
    fn test_changed_paths_excludes_manifest() {
        let recorder = Recorder::new("src/a.rs\n\nsrc/b.rs\n");
        let git = SystemGit::new(&recorder, "/repo");

        let paths = git.changed_paths(Path::new("package.json")).unwrap();
        assert_eq!(paths, vec!["src/a.rs", "src/b.rs"]);
        assert!(recorder.calls.borrow()[0]
            .args
            .contains(&":(exclude)package.json".to_string()));
    }

    #[test]
    fn test_empty_optional_query_is_none() {
        let recorder = Recorder::new("\n");
        let git = SystemGit::new(&recorder, "/repo");

        assert_eq!(git.upstream("main").unwrap(), None);
        assert!(recorder.calls.borrow()[0].ignore_exit_code);
    }

    #[test]
    fn test_count_commits_parses_output() {
        let recorder = Recorder::new("3\n");
        let git = SystemGit::new(&recorder, "/repo");
        assert_eq!(git.count_commits("HEAD..origin/main").unwrap(), 3);

        let garbage = Recorder::new("three\n");
        let git = SystemGit::new(&garbage, "/repo");
        assert!(git.count_commits("HEAD..origin/main").is_err());
    }

    #[test]
    fn test_stash_keeps_index() {
        let recorder = Recorder::new("");
        let git = SystemGit::new(&recorder, "/repo");
        git.stash_push("git-bump 1.0.0").unwrap();

        let calls = recorder.calls.borrow();
        assert!(calls[0].args.contains(&"--keep-index".to_string()));
        assert!(calls[0].mutating);
    }
}
