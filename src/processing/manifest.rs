//! Cargo package manifest detection.
//!
//! A `Cargo.toml` declares a package boundary when it has a `[package]`
//! table with a `name`. Workspace-only manifests do not.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{DocError, Result};
use crate::processing::filter::FileFilter;

pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Directories and files, relative to a package root, read in addition to
/// `src/` when auxiliary sources are requested.
const AUXILIARY_SCOPES: &[&str] = &["build.rs", "examples", "tests", "benches"];

/// A discovered package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Path to the `Cargo.toml`
    pub path: PathBuf,
    /// Package name from `[package]`
    pub name: String,
    /// Raw manifest text, passed to the synthesizer as auxiliary data
    pub raw: String,
}

impl PackageManifest {
    /// Parse manifest text; `Ok(None)` when it declares no package.
    pub fn parse(path: &Path, raw: &str) -> Result<Option<Self>> {
        let value: toml::Table = raw.parse().map_err(|e: toml::de::Error| DocError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let name = value
            .get("package")
            .and_then(|p| p.as_table())
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str());

        Ok(name.map(|name| Self {
            path: path.to_path_buf(),
            name: name.to_string(),
            raw: raw.to_string(),
        }))
    }

    /// Directory containing the manifest.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Conventional source scopes of this package, in reading order.
    ///
    /// Only scopes that exist on disk are returned.
    pub fn source_scopes(&self, include_auxiliary: bool) -> Vec<PathBuf> {
        let dir = self.dir();
        let mut scopes = vec![dir.join("src")];
        if include_auxiliary {
            scopes.extend(AUXILIARY_SCOPES.iter().map(|s| dir.join(s)));
        }
        scopes.into_iter().filter(|p| p.exists()).collect()
    }
}

/// Find package manifests under `root`, sorted by path.
///
/// Unparseable manifests are logged and skipped.
pub fn discover_packages(root: &Path, filter: &FileFilter) -> Result<Vec<PackageManifest>> {
    if !root.exists() {
        return Err(DocError::MissingRoot(root.to_path_buf()));
    }

    let mut manifests = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !filter.is_excluded_dir(&e.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
            continue;
        }

        let path = entry.path();
        let raw = std::fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;
        match PackageManifest::parse(path, &raw) {
            Ok(Some(manifest)) => {
                debug!(name = %manifest.name, path = %path.display(), "Found package");
                manifests.push(manifest);
            }
            Ok(None) => debug!(path = %path.display(), "Manifest declares no package"),
            Err(e) => warn!(error = %e, "Skipping invalid manifest"),
        }
    }

    manifests.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(manifests)
}
