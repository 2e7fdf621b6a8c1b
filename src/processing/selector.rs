//! File discovery.
//!
//! Produces the ordered list of in-scope files for a run. Ordering is
//! lexicographic by label within a scope so that chunk and note order are
//! reproducible across runs over the same tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{DocError, Result};
use crate::processing::filter::FileFilter;
use crate::processing::manifest::{discover_packages, PackageManifest};

/// A file chosen for documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Location on disk
    pub path: PathBuf,
    /// Forward-slash display label rooted at the source root, e.g. `src/lib.rs`
    pub label: String,
}

/// Result of a package-aware selection.
#[derive(Debug, Clone, Default)]
pub struct PackageSelection {
    pub files: Vec<SelectedFile>,
    pub packages: Vec<PackageManifest>,
}

/// Enumerates candidate source files under a root.
pub struct FileSelector<'a> {
    filter: &'a FileFilter,
    base: Option<&'a Path>,
}

impl<'a> FileSelector<'a> {
    pub fn new(filter: &'a FileFilter) -> Self {
        Self { filter, base: None }
    }

    /// Resolve roots against `base` on disk while labels keep the root as
    /// given, e.g. `src/lib.rs` for a root of `src` under a checkout.
    pub fn relative_to(mut self, base: &'a Path) -> Self {
        self.base = Some(base);
        self
    }

    /// Select every in-scope file under `root`.
    pub fn select(&self, root: &Path) -> Result<Vec<SelectedFile>> {
        let disk_root = self.on_disk(root);
        ensure_root(&disk_root)?;

        let mut files = self.walk_scope(&disk_root, &disk_root, root);
        files.sort_by(|a, b| a.label.cmp(&b.label));

        if files.is_empty() {
            return Err(DocError::NothingToDocument(root.to_path_buf()));
        }
        info!(root = %root.display(), files = files.len(), "Selected files");
        Ok(files)
    }

    /// Select files package by package.
    ///
    /// Each package's scopes are walked in order (`src/`, then the auxiliary
    /// scopes when requested) and the results concatenated. Exclude patterns
    /// see paths relative to their scope, so a `tests/` scope is read while
    /// a `tests/` directory nested inside `src/` is still skipped.
    pub fn select_packages(&self, root: &Path, include_auxiliary: bool) -> Result<PackageSelection> {
        let disk_root = self.on_disk(root);
        ensure_root(&disk_root)?;

        let packages = discover_packages(&disk_root, self.filter)?;
        if packages.is_empty() {
            warn!(root = %root.display(), "No package manifests found");
            return Err(DocError::NothingToDocument(root.to_path_buf()));
        }

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for package in &packages {
            for scope in package.source_scopes(include_auxiliary) {
                let mut scoped = self.walk_scope(&scope, &disk_root, root);
                scoped.sort_by(|a, b| a.label.cmp(&b.label));
                debug!(package = %package.name, scope = %scope.display(), files = scoped.len(), "Scanned scope");
                files.extend(scoped.into_iter().filter(|f| seen.insert(f.path.clone())));
            }
        }

        if files.is_empty() {
            return Err(DocError::NothingToDocument(root.to_path_buf()));
        }
        info!(
            root = %root.display(),
            packages = packages.len(),
            files = files.len(),
            "Selected package files"
        );
        Ok(PackageSelection { files, packages })
    }

    /// Every file under `root` as a label, unfiltered apart from excluded
    /// directories. Used for keyword matching.
    pub fn list_labels(&self, root: &Path) -> Result<Vec<String>> {
        let disk_root = self.on_disk(root);
        ensure_root(&disk_root)?;
        let mut labels: Vec<String> = self
            .walk(&disk_root)
            .map(|path| label_for(root, &relative_slash_path(&disk_root, &path)))
            .collect();
        labels.sort();
        Ok(labels)
    }

    fn on_disk(&self, root: &Path) -> PathBuf {
        match self.base {
            Some(base) => base.join(root),
            None => root.to_path_buf(),
        }
    }

    /// Walk one scope (a directory or a single file), applying the filter to
    /// paths relative to the scope. Labels are `display_root` joined with the
    /// path relative to `disk_root`.
    fn walk_scope(&self, scope: &Path, disk_root: &Path, display_root: &Path) -> Vec<SelectedFile> {
        self.walk(scope)
            .filter_map(|path| {
                let relative = relative_slash_path(scope, &path);
                let filter_path = if relative.is_empty() {
                    file_name(&path)
                } else {
                    relative
                };
                match self.filter.should_process(&filter_path) {
                    Ok(()) => Some(SelectedFile {
                        label: label_for(display_root, &relative_slash_path(disk_root, &path)),
                        path,
                    }),
                    Err(reason) => {
                        debug!(path = %path.display(), reason, "Skipping file");
                        None
                    }
                }
            })
            .collect()
    }

    fn walk(&self, scope: &Path) -> impl Iterator<Item = PathBuf> + 'a {
        let filter = self.filter;
        WalkDir::new(scope)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !filter.is_excluded_dir(&e.file_name().to_string_lossy())
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
    }
}

fn ensure_root(root: &Path) -> Result<()> {
    if root.exists() {
        Ok(())
    } else {
        Err(DocError::MissingRoot(root.to_path_buf()))
    }
}

/// Label for a path: the root as given, joined with the relative path.
fn label_for(root: &Path, relative: &str) -> String {
    let root_str = root.to_string_lossy().replace('\\', "/");
    let root_str = root_str.trim_end_matches('/');
    let relative = relative.to_string();
    match (root_str.is_empty() || root_str == ".", relative.is_empty()) {
        (true, _) => relative,
        (false, true) => root_str.to_string(),
        (false, false) => format!("{root_str}/{relative}"),
    }
}

fn relative_slash_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
