use std::path::PathBuf;

use clap::Parser;

use crate::config::{PartialCommit, PartialConfig, PartialRelease, PartialTag};
use crate::domain::BumpSelection;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "git-bump",
    about = "Bump the version in package.json, then commit and tag it",
    disable_version_flag = true
)]
pub struct Args {
    #[arg(long, help = "Bump the patch version (1.4.2 -> 1.4.3)")]
    pub patch: bool,

    #[arg(long, help = "Bump the minor version (1.4.2 -> 1.5.0)")]
    pub minor: bool,

    #[arg(long, help = "Bump the major version (1.4.2 -> 2.0.0)")]
    pub major: bool,

    #[arg(
        long,
        value_name = "PREID",
        num_args = 0..=1,
        help = "Bump the pre-release counter, optionally with an identifier (default: rc)"
    )]
    pub prerelease: Option<Option<String>>,

    #[arg(long = "version", value_name = "VERSION", help = "Set an exact version")]
    pub exact: Option<String>,

    #[arg(long, help = "Append or increment a release suffix (1.0.0 -> 1.0.0-r1)")]
    pub release: bool,

    #[arg(
        long,
        value_name = "PREFIX",
        requires = "release",
        help = "Prefix for the release suffix (1.0.0 -> 1.0.0-PREFIX-r1)"
    )]
    pub prefix: Option<String>,

    #[arg(long, help = "Tag the current manifest version without bumping")]
    pub tag_only: bool,

    #[arg(short, long, help = "Print every git command and its output")]
    pub verbose: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    pub dry_run: bool,

    #[arg(long, value_name = "TEMPLATE", help = "Commit message template (%v is the version)")]
    pub commit_message: Option<String>,

    #[arg(long, value_name = "TEMPLATE", help = "Tag name template (%v is the version)")]
    pub tag_name: Option<String>,

    #[arg(long, help = "Do not compare the branch with its upstream")]
    pub no_check_remote: bool,

    #[arg(long, help = "Write the manifest without committing it")]
    pub no_commit: bool,

    #[arg(long, help = "Do not create a tag")]
    pub no_tag: bool,

    #[arg(short, long, value_name = "PATH", help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Manifest to bump (default: package.json)")]
    pub manifest: Option<PathBuf>,
}

impl Args {
    /// The bump selectors, not yet validated.
    pub fn selection(&self) -> BumpSelection {
        BumpSelection {
            patch: self.patch,
            minor: self.minor,
            major: self.major,
            prerelease: self.prerelease.clone(),
            exact: self.exact.clone(),
            release: self.release,
            tag_only: self.tag_only,
        }
    }

    /// The configuration layer given on the command line.
    ///
    /// Flags that were not passed stay `None` so they never override the
    /// configuration file.
    pub fn overrides(&self) -> PartialConfig {
        let commit = (self.no_commit || self.commit_message.is_some()).then(|| PartialCommit {
            enabled: self.no_commit.then_some(false),
            message: self.commit_message.clone(),
        });
        let tag = (self.no_tag || self.tag_name.is_some()).then(|| PartialTag {
            enabled: self.no_tag.then_some(false),
            name: self.tag_name.clone(),
        });

        PartialConfig {
            commit,
            tag,
            dry_run: self.dry_run.then_some(true),
            check_remote: self.no_check_remote.then_some(false),
            remote: None,
            release: self.prefix.clone().map(|prefix| PartialRelease {
                prefix: Some(prefix),
            }),
            manifest: self.manifest.clone(),
        }
    }
}
