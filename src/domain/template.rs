/// Placeholder replaced by the version in commit messages and tag names
pub const VERSION_PLACEHOLDER: &str = "%v";

/// Commit message or tag name template (e.g. "chore: version %v", "v%v")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub pattern: String,
}

impl Template {
    pub fn new(pattern: impl Into<String>) -> Self {
        Template {
            pattern: pattern.into(),
        }
    }

    /// Format a version according to the template.
    /// Example: pattern="v%v", version="1.2.3" -> "v1.2.3"
    pub fn render(&self, version: &str) -> String {
        self.pattern.replace(VERSION_PLACEHOLDER, version)
    }
}
