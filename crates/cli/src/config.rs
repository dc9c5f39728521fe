//! Optional `restdoc.toml` project configuration.
//!
//! ```toml
//! [assemble]
//! name = "ApiDocs"
//! output = "target/docs"
//! inputs = ["build"]
//! formats = ["html", "raml"]
//! scope = "public"
//! exclude = [".*/internal/.*"]
//!
//! [assemble.templates]
//! "api.base" = "/ultimate/api/v1"
//! ```
//!
//! Command-line flags take precedence over every value here.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory.
pub const CONFIG_FILENAME: &str = "restdoc.toml";

/// Whole configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// The `[assemble]` table.
    pub assemble: AssembleConfig,
}

/// Defaults for `assemble` and `inspect`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssembleConfig {
    /// Artifact base name.
    pub name: Option<String>,
    /// Output directory.
    pub output: Option<PathBuf>,
    /// Roots searched for fragments.
    pub inputs: Vec<PathBuf>,
    /// Formats to render.
    pub formats: Vec<String>,
    /// Audience to document.
    pub scope: Option<String>,
    /// Exclusion patterns.
    pub exclude: Vec<String>,
    /// Template values.
    pub templates: BTreeMap<String, String>,
}

/// Parse the configuration file at `path`.
pub fn read_config(path: &Path) -> Result<ProjectConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    toml::from_str(&contents).map_err(|err| format!("Failed to parse {}: {err}", path.display()))
}

/// Load `explicit` if given (it must exist), else `restdoc.toml` in `dir` if
/// present, else the empty configuration.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ProjectConfig, String> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let candidate = dir.join(CONFIG_FILENAME);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "Loading project configuration.");
        read_config(&candidate)
    } else {
        Ok(ProjectConfig::default())
    }
}
