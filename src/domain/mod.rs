//! Domain logic - pure version rules independent of git operations

pub mod prerelease;
pub mod release;
pub mod template;
pub mod version;

pub use prerelease::PreRelease;
pub use release::next_release;
pub use template::Template;
pub use version::{resolve, BumpRequest, BumpSelection, ReleaseMode};
