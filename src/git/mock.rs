use crate::error::{BumpError, Result};
use crate::git::Git;
use std::cell::RefCell;
use std::path::Path;

/// Mutable state behind a [MockGit].
#[derive(Debug, Clone, Default)]
pub struct MockState {
    /// Porcelain status reported for the manifest
    pub manifest_status: String,
    /// Paths reported as changed relative to HEAD
    pub changed: Vec<String>,
    pub branch: Option<String>,
    pub upstream: Option<String>,
    /// Whether the upstream ref resolves after fetching
    pub upstream_exists: bool,
    /// Commits on the upstream not in HEAD
    pub behind: u64,
    pub stash_depth: usize,
    pub staged: Vec<String>,
    pub commits: Vec<String>,
    pub tags: Vec<String>,
    /// Operation names (`"commit"`, `"tag"`, ...) that fail when called
    pub failing: Vec<&'static str>,
    /// Every operation called, in order
    pub calls: Vec<String>,
}

/// Mock repository for testing without actual git operations
#[derive(Debug)]
pub struct MockGit {
    state: RefCell<MockState>,
}

impl MockGit {
    /// A clean repository on `main` tracking `origin/main`, up to date.
    pub fn new() -> Self {
        MockGit {
            state: RefCell::new(MockState {
                branch: Some("main".to_string()),
                upstream: Some("origin/main".to_string()),
                upstream_exists: true,
                ..Default::default()
            }),
        }
    }

    /// Mutate the mock state in place
    pub fn with(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.borrow_mut());
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> MockState {
        self.state.borrow().clone()
    }

    fn call(&self, name: &'static str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(name.to_string());
        if state.failing.contains(&name) {
            return Err(BumpError::GitCommandFailed {
                command: format!("git {}", name),
                status: Some(1),
                stderr: format!("mock failure in {}", name),
            });
        }
        Ok(())
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

impl Git for MockGit {
    fn status(&self, _path: &Path) -> Result<String> {
        self.call("status")?;
        Ok(self.state.borrow().manifest_status.clone())
    }

    fn changed_paths(&self, _exclude: &Path) -> Result<Vec<String>> {
        self.call("changed_paths")?;
        Ok(self.state.borrow().changed.clone())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        self.call("current_branch")?;
        Ok(self.state.borrow().branch.clone())
    }

    fn upstream(&self, _branch: &str) -> Result<Option<String>> {
        self.call("upstream")?;
        Ok(self.state.borrow().upstream.clone())
    }

    fn fetch(&self) -> Result<()> {
        self.call("fetch")
    }

    fn resolve_ref(&self, rev: &str) -> Result<Option<String>> {
        self.call("resolve_ref")?;
        let state = self.state.borrow();
        if rev == "HEAD" {
            return Ok(Some("local".to_string()));
        }
        Ok(state.upstream_exists.then(|| "remote".to_string()))
    }

    fn merge_base(&self, _a: &str, _b: &str) -> Result<Option<String>> {
        self.call("merge_base")?;
        let state = self.state.borrow();
        Ok(Some(if state.behind == 0 { "remote" } else { "base" }.to_string()))
    }

    fn count_commits(&self, _range: &str) -> Result<u64> {
        self.call("count_commits")?;
        Ok(self.state.borrow().behind)
    }

    fn stash_push(&self, _message: &str) -> Result<()> {
        self.call("stash_push")?;
        let mut state = self.state.borrow_mut();
        state.stash_depth += 1;
        state.changed.clear();
        Ok(())
    }

    fn stash_pop(&self) -> Result<()> {
        self.call("stash_pop")?;
        let mut state = self.state.borrow_mut();
        state.stash_depth = state.stash_depth.saturating_sub(1);
        Ok(())
    }

    fn add(&self, path: &Path) -> Result<()> {
        self.call("add")?;
        self.state
            .borrow_mut()
            .staged
            .push(path.to_string_lossy().into_owned());
        Ok(())
    }

    fn commit(&self, message: &str, _path: &Path) -> Result<()> {
        self.call("commit")?;
        let mut state = self.state.borrow_mut();
        state.staged.clear();
        state.commits.push(message.to_string());
        Ok(())
    }

    fn tag(&self, name: &str) -> Result<()> {
        self.call("tag")?;
        self.state.borrow_mut().tags.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_defaults_are_clean() {
        let git = MockGit::new();
        assert_eq!(git.status(Path::new("package.json")).unwrap(), "");
        assert_eq!(git.current_branch().unwrap(), Some("main".to_string()));
        assert_eq!(git.count_commits("HEAD..origin/main").unwrap(), 0);
    }

    #[test]
    fn test_mock_stash_depth() {
        let git = MockGit::new().with(|s| s.changed = vec!["src/lib.rs".to_string()]);
        git.stash_push("msg").unwrap();
        assert_eq!(git.state().stash_depth, 1);
        assert!(git.state().changed.is_empty());
        git.stash_pop().unwrap();
        assert_eq!(git.state().stash_depth, 0);
    }

    #[test]
    fn test_mock_failure_injection() {
        let git = MockGit::new().with(|s| s.failing = vec!["commit"]);
        assert!(git.commit("chore: version 1.0.0", Path::new("package.json")).is_err());
        assert!(git.state().commits.is_empty());
        assert_eq!(git.state().calls, vec!["commit"]);
    }

    #[test]
    fn test_mock_records_tags() {
        let git = MockGit::new();
        git.tag("v1.0.0").unwrap();
        git.tag("v1.1.0").unwrap();
        assert_eq!(git.state().tags, vec!["v1.0.0", "v1.1.0"]);
    }
}
