//! User interface module - leveled logger and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - The `Logger` that decides what is shown and where

use std::cell::RefCell;
use std::rc::Rc;

use crate::boundary::BoundaryWarning;

pub mod formatter;

pub use formatter::{format_dry_run, format_line, format_transition};

/// Severity of a log line, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Success,
    Warn,
    Error,
}

/// A recorded log line (memory sink only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone)]
enum Sink {
    Terminal,
    Memory(Rc<RefCell<Vec<Record>>>),
}

/// Leveled logger threaded explicitly through the release pipeline.
///
/// Clones share the same sink, so a runner and an orchestrator holding
/// separate clones write to one place.
#[derive(Debug, Clone)]
pub struct Logger {
    threshold: Level,
    sink: Sink,
}

impl Logger {
    /// Logger printing to the terminal. `verbose` enables debug lines.
    pub fn terminal(verbose: bool) -> Self {
        Logger {
            threshold: threshold(verbose),
            sink: Sink::Terminal,
        }
    }

    /// Logger recording into memory, used by tests to inspect output.
    pub fn memory(verbose: bool) -> Self {
        Logger {
            threshold: threshold(verbose),
            sink: Sink::Memory(Rc::new(RefCell::new(Vec::new()))),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.threshold == Level::Debug
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn success(&self, message: &str) {
        self.log(Level::Success, message);
    }

    /// Report a non-fatal boundary condition as a warning.
    pub fn boundary(&self, warning: &BoundaryWarning) {
        self.warn(&formatter::format_boundary_warning(warning));
    }

    /// Lines recorded so far. Always empty for the terminal sink.
    pub fn records(&self) -> Vec<Record> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Memory(lines) => lines.borrow().clone(),
        }
    }

    /// Whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|r| r.message.contains(needle))
    }

    fn log(&self, level: Level, message: &str) {
        if level < self.threshold {
            return;
        }

        match &self.sink {
            Sink::Terminal => {
                let line = format_line(level, message);
                match level {
                    Level::Warn | Level::Error => eprintln!("{}", line),
                    _ => println!("{}", line),
                }
            }
            Sink::Memory(lines) => lines.borrow_mut().push(Record {
                level,
                message: console::strip_ansi_codes(message).into_owned(),
            }),
        }
    }
}

fn threshold(verbose: bool) -> Level {
    if verbose {
        Level::Debug
    } else {
        Level::Info
    }
}
