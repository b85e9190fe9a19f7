use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Template;
use crate::error::{BumpError, Result};

/// Configuration file names searched in the working directory, highest rank first.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["bump.toml", ".bump.toml", ".bumprc"];

/// File name looked up in the user config directory when no local file exists.
pub const GLOBAL_CONFIG_FILE_NAME: &str = "git-bump.toml";

/// Returns the default commit message template.
fn default_commit_message() -> String {
    "chore: version %v".to_string()
}

/// Returns the default tag name template.
fn default_tag_name() -> String {
    "%v".to_string()
}

/// Returns the default manifest path.
fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

/// Effective configuration for one invocation.
///
/// Built once from defaults, the configuration file and CLI overrides,
/// then never mutated.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Config {
    pub commit: CommitConfig,
    pub tag: TagConfig,
    pub dry_run: bool,
    pub check_remote: bool,
    pub release_prefix: Option<String>,
    pub manifest: PathBuf,
}

/// Commit step settings.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommitConfig {
    pub enabled: bool,
    pub message: String,
}

/// Tag step settings.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    pub enabled: bool,
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            commit: CommitConfig {
                enabled: true,
                message: default_commit_message(),
            },
            tag: TagConfig {
                enabled: true,
                name: default_tag_name(),
            },
            dry_run: false,
            check_remote: true,
            release_prefix: None,
            manifest: default_manifest(),
        }
    }
}

impl Config {
    /// Merge layers in precedence order: defaults < file < CLI.
    pub fn from_layers(file: &PartialConfig, cli: &PartialConfig) -> Self {
        let mut config = Config::default();
        config.overlay(file);
        config.overlay(cli);
        config
    }

    /// Apply a partial layer. Absent values never erase a prior value.
    pub fn overlay(&mut self, layer: &PartialConfig) {
        if let Some(commit) = &layer.commit {
            if let Some(enabled) = commit.enabled {
                self.commit.enabled = enabled;
            }
            if let Some(message) = &commit.message {
                self.commit.message = message.clone();
            }
        }
        if let Some(tag) = &layer.tag {
            if let Some(enabled) = tag.enabled {
                self.tag.enabled = enabled;
            }
            if let Some(name) = &tag.name {
                self.tag.name = name.clone();
            }
        }
        if let Some(fetch) = layer.remote.as_ref().and_then(|r| r.fetch) {
            self.check_remote = fetch;
        }
        if let Some(check_remote) = layer.check_remote {
            self.check_remote = check_remote;
        }
        if let Some(dry_run) = layer.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(prefix) = layer.release.as_ref().and_then(|r| r.prefix.as_ref()) {
            self.release_prefix = Some(prefix.clone());
        }
        if let Some(manifest) = &layer.manifest {
            self.manifest = manifest.clone();
        }
    }

    pub fn commit_template(&self) -> Template {
        Template::new(&self.commit.message)
    }

    pub fn tag_template(&self) -> Template {
        Template::new(&self.tag.name)
    }
}

/// A partial configuration layer (file contents or CLI overrides).
///
/// Every field is optional; see [`Config::overlay`].
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub commit: Option<PartialCommit>,

    #[serde(default)]
    pub tag: Option<PartialTag>,

    #[serde(default, alias = "dryRun")]
    pub dry_run: Option<bool>,

    #[serde(default, alias = "checkRemote")]
    pub check_remote: Option<bool>,

    #[serde(default)]
    pub remote: Option<PartialRemote>,

    #[serde(default)]
    pub release: Option<PartialRelease>,

    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialCommit {
    pub enabled: Option<bool>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialTag {
    pub enabled: Option<bool>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialRemote {
    pub fetch: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialRelease {
    pub prefix: Option<String>,
}

/// Configuration file layer together with where it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedConfig {
    pub layer: PartialConfig,
    pub source: Option<PathBuf>,
}

/// Finds the configuration file to use.
///
/// Searches in the following order:
/// 1. `bump.toml`, `.bump.toml`, `.bumprc` in `dir`
/// 2. `git-bump.toml` in `global_dir` (the user config directory)
///
/// # Returns
/// * `Some(path)` - The first existing candidate
/// * `None` - If no file exists
pub fn discover_config_file(dir: &Path, global_dir: Option<&Path>) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .chain(global_dir.map(|g| g.join(GLOBAL_CONFIG_FILE_NAME)))
        .find(|candidate| candidate.is_file())
}

/// Parses one configuration file into a partial layer.
pub fn load_partial(path: &Path) -> Result<PartialConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        BumpError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_partial(&content).map_err(|e| match e {
        BumpError::Config(msg) => BumpError::config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parses configuration text into a partial layer.
pub fn parse_partial(content: &str) -> Result<PartialConfig> {
    toml::from_str(content).map_err(|e| BumpError::config(e.message().to_string()))
}

/// Loads the configuration file layer.
///
/// # Arguments
/// * `explicit` - Path given with `--config`; must exist when set
/// * `dir` - Working directory searched for the ranked file names
///
/// # Returns
/// * `Ok(LoadedConfig)` - The file layer, empty when no file was found
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<LoadedConfig> {
    let global_dir = dirs::config_dir();
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config_file(dir, global_dir.as_deref()),
    };

    match path {
        Some(path) => Ok(LoadedConfig {
            layer: load_partial(&path)?,
            source: Some(path),
        }),
        None => Ok(LoadedConfig::default()),
    }
}
