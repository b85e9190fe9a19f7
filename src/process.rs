//! Subprocess execution.
//!
//! Every external command the tool issues goes through a [`CommandRunner`].
//! The system runner captures stdout, turns non-zero exits into
//! [`BumpError::GitCommandFailed`] and, in dry-run mode, skips commands
//! that would change repository or working-tree state.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BumpError, Result};
use crate::ui::{format_dry_run, Logger};

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Return stdout even when the command exits non-zero
    pub ignore_exit_code: bool,
    /// The command changes repository or working-tree state
    pub mutating: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            ignore_exit_code: false,
            mutating: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn ignore_exit_code(mut self) -> Self {
        self.ignore_exit_code = true;
        self
    }

    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    /// Shell-like rendering used in logs and error messages
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                rendered.push_str(&format!("\"{}\"", arg));
            } else {
                rendered.push_str(arg);
            }
        }
        rendered
    }
}

/// Runs external commands and returns their captured stdout.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<String>;
}

/// Runner backed by `std::process::Command`.
pub struct SystemRunner {
    dry_run: bool,
    log: Logger,
}

impl SystemRunner {
    pub fn new(dry_run: bool, log: Logger) -> Self {
        SystemRunner { dry_run, log }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<String> {
        if self.dry_run && invocation.mutating {
            self.log.info(&format_dry_run(&invocation.display()));
            return Ok(String::new());
        }

        self.log.debug(&format!("$ {}", invocation.display()));

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| BumpError::GitCommandFailed {
            command: invocation.display(),
            status: None,
            stderr: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for stream in [&stdout, &stderr] {
            if !stream.trim().is_empty() {
                self.log.debug(stream.trim_end());
            }
        }

        if !output.status.success() && !invocation.ignore_exit_code {
            return Err(BumpError::GitCommandFailed {
                command: invocation.display(),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(stdout)
    }
}
