use std::fmt;

/// Warnings raised at the edges of a release run.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// Current branch has no upstream; the remote check is skipped
    NoUpstream { branch: String },
    /// HEAD is not on a branch; the remote check is skipped
    DetachedHead,
    /// Both commit and tag are disabled, only the manifest changes
    BothStepsDisabled,
    /// A tag is created while committing is disabled
    TagWithoutCommit { tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoUpstream { branch } => {
                write!(
                    f,
                    "Branch '{}' has no upstream; skipping remote check",
                    branch
                )
            }
            BoundaryWarning::DetachedHead => {
                write!(f, "HEAD is detached; skipping remote check")
            }
            BoundaryWarning::BothStepsDisabled => {
                write!(
                    f,
                    "Commit and tag are both disabled; only the manifest will change"
                )
            }
            BoundaryWarning::TagWithoutCommit { tag } => {
                write!(
                    f,
                    "Commit is disabled; tag '{}' will point at the current HEAD",
                    tag
                )
            }
        }
    }
}
