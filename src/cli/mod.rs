//! Command-line surface: argument parsing and the release workflow.

pub mod args;
pub mod orchestration;

pub use args::Args;
pub use orchestration::{Orchestrator, ReleaseContext, ReleaseReport, ReleaseState};
