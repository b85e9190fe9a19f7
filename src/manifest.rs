//! Project manifest (`package.json`) access.
//!
//! Only the top-level `version` field is ever changed. The file is
//! re-serialized with its original key order and indentation plus a single
//! trailing newline, so a bump produces a one-line diff.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::error::{BumpError, Result};

/// Indentation used when none can be detected
pub const DEFAULT_INDENT: &str = "  ";

/// A loaded manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    raw: String,
    document: Map<String, Value>,
    version: String,
    indent: String,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    /// `ManifestInvalid` when the file is missing, is not a JSON object, or
    /// has no string `version` field.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = fs::read_to_string(&path)
            .map_err(|e| BumpError::manifest(&path, format!("cannot read: {}", e)))?;
        Self::parse(path, raw)
    }

    /// Parse manifest text that was read from `path`.
    pub fn parse(path: impl Into<PathBuf>, raw: String) -> Result<Self> {
        let path = path.into();
        let document = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(BumpError::manifest(&path, "top level is not an object")),
            Err(e) => return Err(BumpError::manifest(&path, e.to_string())),
        };

        let version = match document.get("version") {
            Some(Value::String(v)) => v.clone(),
            Some(_) => return Err(BumpError::manifest(&path, "version field is not a string")),
            None => return Err(BumpError::manifest(&path, "missing version field")),
        };

        let indent = detect_indent(&raw);
        Ok(Manifest {
            path,
            raw,
            document,
            version,
            indent,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version currently recorded in the manifest
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Indentation detected in the original text
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Serialize the manifest with `version` replaced.
    pub fn render(&self, version: &str) -> Result<String> {
        let mut document = self.document.clone();
        document.insert("version".to_string(), Value::String(version.to_string()));

        let mut out = Vec::with_capacity(self.raw.len() + 16);
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        document
            .serialize(&mut serializer)
            .map_err(|e| BumpError::manifest(&self.path, e.to_string()))?;

        let mut text = String::from_utf8(out)
            .map_err(|e| BumpError::manifest(&self.path, e.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    /// Write `version` back to disk.
    pub fn write(&self, version: &str) -> Result<()> {
        let text = self.render(version)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Detect the indentation unit of a JSON document.
///
/// Takes the leading whitespace run of the first indented line: either
/// spaces or tabs. Falls back to [DEFAULT_INDENT].
pub fn detect_indent(raw: &str) -> String {
    let pattern = Regex::new(r"(?m)^( +|\t+)\S").ok();
    pattern
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}
