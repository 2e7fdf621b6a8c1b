//! Structure snapshot: the full source tree as nested YAML.
//!
//! Directories map to mappings of their children, files map to null. The
//! snapshot is both written to disk and handed to the file picker as the
//! menu of paths it may choose from.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::error::{DocError, Result};
use crate::processing::FileFilter;

/// File name of the snapshot inside the output directory.
pub const STRUCTURE_FILE: &str = "_structure.yaml";

/// Build the nested structure of `root`, keyed by `label` at the top.
pub fn build_structure(root: &Path, label: &str, filter: &FileFilter) -> Result<Value> {
    if !root.is_dir() {
        return Err(DocError::MissingRoot(root.to_path_buf()));
    }
    let label = label.replace('\\', "/");
    let mut top = Mapping::new();
    top.insert(
        Value::String(label.trim_end_matches('/').to_string()),
        Value::Mapping(walk(root, filter)?),
    );
    Ok(Value::Mapping(top))
}

/// Build the structure of `root` and render it as YAML text.
pub fn structure_yaml(root: &Path, label: &str, filter: &FileFilter) -> Result<String> {
    Ok(serde_yaml::to_string(&build_structure(root, label, filter)?)?)
}

fn walk(dir: &Path, filter: &FileFilter) -> Result<Mapping> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| DocError::io(dir, e))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut node = Mapping::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if path.is_dir() {
            if filter.is_excluded_dir(&name) {
                continue;
            }
            node.insert(Value::String(name), Value::Mapping(walk(&path, filter)?));
        } else {
            node.insert(Value::String(name), Value::Null);
        }
    }
    Ok(node)
}
