//! Writing rendered artifacts to disk.
//!
//! Pipelines only ever produce [`OutputFile`] values in memory. Writing is
//! the last step of a run, so a run that fails anywhere before it leaves the
//! output directory untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DocError, Result};

/// One artifact, addressed relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
    /// Replace an existing file; when false an existing file is kept
    pub overwrite: bool,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite: true,
        }
    }

    /// An artifact that is only written when no file exists yet.
    pub fn create_only(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            overwrite: false,
            ..Self::new(path, content)
        }
    }
}

/// Writes artifacts under an output directory.
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write every artifact, returning the paths actually written.
    ///
    /// Each file goes to a temporary sibling first and is renamed into place.
    pub fn write_all(&self, files: &[OutputFile]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let target = self.root.join(&file.path);
            if !file.overwrite && target.exists() {
                debug!(path = %target.display(), "Keeping existing file");
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| DocError::io(parent, e))?;
            }

            let tmp = temp_sibling(&target);
            fs::write(&tmp, &file.content).map_err(|e| DocError::io(&tmp, e))?;
            fs::rename(&tmp, &target).map_err(|e| DocError::io(&target, e))?;

            info!(path = %target.display(), bytes = file.content.len(), "Wrote file");
            written.push(target);
        }
        Ok(written)
    }
}

fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.tmp"))
}
