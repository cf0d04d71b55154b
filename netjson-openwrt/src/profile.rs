//! Output profiles for the command line.
//!
//! A profile is a small TOML file holding serialization defaults. The
//! embedded `profiles/default.toml` is used unless a file is given.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::backend::JsonOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputProfile {
    #[serde(default)]
    pub json: JsonProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JsonProfile {
    /// Spaces per indentation level; `0` or absent means compact output.
    #[serde(default)]
    pub indent: Option<usize>,
    #[serde(default)]
    pub sort_keys: bool,
}

impl JsonProfile {
    pub fn options(&self) -> JsonOptions {
        JsonOptions {
            indent: self.indent.filter(|width| *width > 0),
            sort_keys: self.sort_keys,
        }
    }
}

/// Errors returned when loading a profile file.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse profile {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load the profile at `path`, or the embedded default when `path` is `None`.
///
/// Returns the profile and where it came from (`embedded` or `file:<path>`).
pub fn load_profile(path: Option<&Path>) -> Result<(OutputProfile, String), ProfileError> {
    let Some(path) = path else {
        return Ok((default_profile(), "embedded".to_string()));
    };
    let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let profile = parse_profile(&raw, path.display().to_string())?;
    Ok((profile, format!("file:{}", path.display())))
}

/// The embedded default profile.
pub fn default_profile() -> OutputProfile {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/profiles/default.toml"));
    parse_profile(embedded, "embedded profile".to_string()).unwrap_or_default()
}

fn parse_profile(raw: &str, path: String) -> Result<OutputProfile, ProfileError> {
    toml::from_str(raw).map_err(|source| ProfileError::Parse { path, source })
}
