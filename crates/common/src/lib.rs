//! Fragment storage shared by extraction and assembly.
//!
//! Extraction writes one fragment per compiled unit below a build directory,
//! at a well-known location; assembly discovers and loads every fragment found
//! under the directories it is pointed at.

use std::fs;
use std::path::{Path, PathBuf};

use restdoc_model::{Fragment, ModelError};
use tracing::debug;
use walkdir::WalkDir;

/// Directory, relative to a build directory, holding persisted fragments.
pub const FRAGMENT_DIR: &str = "restdoc";

/// File name suffix identifying a persisted fragment.
pub const FRAGMENT_SUFFIX: &str = ".restdoc.json";

/// Location of the fragment for `unit` below `build_dir`
/// (`<build_dir>/restdoc/<unit>.restdoc.json`).
pub fn fragment_path(build_dir: &Path, unit: &str) -> PathBuf {
    let file_stem: String = unit
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '.' } else { c })
        .collect();
    build_dir
        .join(FRAGMENT_DIR)
        .join(format!("{file_stem}{FRAGMENT_SUFFIX}"))
}

/// Whether `path` names a persisted fragment.
pub fn is_fragment_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(FRAGMENT_SUFFIX))
}

/// Read one fragment file.
pub fn read_fragment(path: &Path) -> Result<Fragment, ModelError> {
    let contents = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Fragment::from_json(&contents, &path.display().to_string())
}

/// Persist `fragment` for `unit` below `build_dir`, returning the written path.
pub fn write_fragment(
    build_dir: &Path,
    unit: &str,
    fragment: &Fragment,
) -> Result<PathBuf, ModelError> {
    let path = fragment_path(build_dir, unit);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ModelError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&path, fragment.to_json()?).map_err(|source| ModelError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Find every fragment file under `roots`. A root may itself be a fragment
/// file. Paths are sorted so that assembly sees a stable order regardless of
/// directory iteration order.
pub fn discover_fragments(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ModelError> {
    let mut found = Vec::new();
    for root in roots {
        if root.is_file() {
            found.push(root.clone());
            continue;
        }
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|err| ModelError::Io {
                path: err.path().unwrap_or(root.as_path()).to_path_buf(),
                source: err.into(),
            })?;
            if entry.file_type().is_file() && is_fragment_file(entry.path()) {
                found.push(entry.into_path());
            }
        }
    }
    found.sort();
    found.dedup();
    debug!(count = found.len(), "Discovered fragment files.");
    Ok(found)
}

/// Discover and parse every fragment under `roots`. The first malformed file
/// aborts loading.
pub fn load_fragments(roots: &[PathBuf]) -> Result<Vec<Fragment>, ModelError> {
    discover_fragments(roots)?
        .iter()
        .map(|path| read_fragment(path))
        .collect()
}
