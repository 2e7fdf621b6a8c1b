//! Directory tree rendering.
//!
//! Produces the box-drawing tree embedded in a README. Directories are only
//! shown when they contain something worth documenting within a bounded
//! lookahead, and the tree is cut off at a configurable depth.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{DocError, Result};
use crate::processing::FileFilter;

/// Files shown in the tree regardless of extension.
const ALWAYS_INCLUDED: &[&str] = &[
    "Cargo.toml",
    "README.md",
    "CHANGELOG.md",
    "LICENSE",
    "Makefile",
    "Dockerfile",
    "build.rs",
];

/// Marker rendered where the depth limit cuts a directory off.
pub const TRUNCATED_MARKER: &str = "… (truncated)";

/// Renders a directory as a text tree.
pub struct TreeRenderer<'a> {
    filter: &'a FileFilter,
    max_depth: usize,
    lookahead: usize,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(filter: &'a FileFilter, max_depth: usize) -> Self {
        Self {
            filter,
            max_depth: max_depth.max(1),
            lookahead: 4,
        }
    }

    /// How many levels below a directory are searched for included files
    /// before it is hidden.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Render `root` and everything visible below it.
    pub fn render(&self, root: &Path) -> Result<String> {
        if !root.is_dir() {
            return Err(DocError::MissingRoot(root.to_path_buf()));
        }
        // surface an unreadable root as an error rather than an empty tree
        fs::read_dir(root).map_err(|e| DocError::io(root, e))?;

        let mut out = format!("{}/\n", display_name(root));
        self.render_dir(root, "", 1, &mut out);
        Ok(out)
    }

    /// Render the tree wrapped in a `text` code fence.
    pub fn render_fenced(&self, root: &Path) -> Result<String> {
        Ok(format!("```text\n{}```", self.render(root)?))
    }

    fn render_dir(&self, dir: &Path, prefix: &str, level: usize, out: &mut String) {
        let entries = self.visible_entries(dir);
        if entries.is_empty() {
            return;
        }
        if level > self.max_depth {
            out.push_str(&format!("{prefix}└── {TRUNCATED_MARKER}\n"));
            return;
        }

        let count = entries.len();
        for (i, entry) in entries.iter().enumerate() {
            let last = i + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            let name = display_name(&entry.path);
            if entry.is_dir {
                out.push_str(&format!("{prefix}{connector}{name}/\n"));
                let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
                self.render_dir(&entry.path, &child_prefix, level + 1, out);
            } else {
                out.push_str(&format!("{prefix}{connector}{name}\n"));
            }
        }
    }

    /// Included entries of `dir`, directories first, each group sorted by name.
    fn visible_entries(&self, dir: &Path) -> Vec<TreeEntry> {
        let mut entries: Vec<TreeEntry> = read_entries(dir)
            .into_iter()
            .filter(|e| {
                if e.is_dir {
                    !self.is_excluded_dir(&e.path) && self.has_included(&e.path, self.lookahead)
                } else {
                    self.is_included_file(&e.path)
                }
            })
            .collect();
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.path.cmp(&b.path)));
        entries
    }

    /// Whether `dir` holds an included file within `remaining` levels.
    /// Past the lookahead the directory is assumed to qualify.
    fn has_included(&self, dir: &Path, remaining: usize) -> bool {
        if remaining == 0 {
            return true;
        }
        read_entries(dir).into_iter().any(|e| {
            if e.is_dir {
                !self.is_excluded_dir(&e.path) && self.has_included(&e.path, remaining - 1)
            } else {
                self.is_included_file(&e.path)
            }
        })
    }

    fn is_excluded_dir(&self, path: &Path) -> bool {
        self.filter.is_excluded_dir(&display_name(path))
    }

    fn is_included_file(&self, path: &Path) -> bool {
        let name = display_name(path);
        ALWAYS_INCLUDED.contains(&name.as_str()) || self.filter.detector().is_recognized(path)
    }
}

struct TreeEntry {
    path: PathBuf,
    is_dir: bool,
}

fn read_entries(dir: &Path) -> Vec<TreeEntry> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };
    reader
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let file_type = entry.file_type().ok()?;
            Some(TreeEntry {
                path: entry.path(),
                is_dir: file_type.is_dir(),
            })
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn sample() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        for rel in [
            "main.rs",
            "api/mod.rs",
            "api/handler.rs",
            "assets/logo.png",
            "node_modules/pkg/index.js",
            "deep/a/b/c/d.rs",
        ] {
            touch(&root, rel);
        }
        dir
    }

    #[test]
    fn test_render_tree() {
        let dir = sample();
        let filter = FileFilter::with_defaults().unwrap();
        let tree = TreeRenderer::new(&filter, 6).render(&dir.path().join("src")).unwrap();

        assert_eq!(
            tree,
            "src/\n\
             ├── api/\n\
             │   ├── handler.rs\n\
             │   └── mod.rs\n\
             ├── deep/\n\
             │   └── a/\n\
             │       └── b/\n\
             │           └── c/\n\
             │               └── d.rs\n\
             └── main.rs\n"
        );
    }

    #[test]
    fn test_depth_limit_marks_truncation() {
        let dir = sample();
        let filter = FileFilter::with_defaults().unwrap();
        let tree = TreeRenderer::new(&filter, 2).render(&dir.path().join("src")).unwrap();

        assert_eq!(
            tree,
            "src/\n\
             ├── api/\n\
             │   ├── handler.rs\n\
             │   └── mod.rs\n\
             ├── deep/\n\
             │   └── a/\n\
             │       └── … (truncated)\n\
             └── main.rs\n"
        );
    }

    #[test]
    fn test_lookahead_bounds_directory_probe() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        touch(&root, "main.rs");
        touch(&root, "far/a/b/c/d/e.rs");
        let filter = FileFilter::with_defaults().unwrap();

        let shallow = TreeRenderer::new(&filter, 1)
            .with_lookahead(1)
            .render(&root)
            .unwrap();
        assert_eq!(shallow, "src/\n├── far/\n│   └── … (truncated)\n└── main.rs\n");

        touch(&root, "empty/assets/logo.png");
        let tree = TreeRenderer::new(&filter, 6).render(&root).unwrap();
        assert!(!tree.contains("empty/"));
    }

    #[test]
    fn test_missing_root() {
        let filter = FileFilter::with_defaults().unwrap();
        let err = TreeRenderer::new(&filter, 3)
            .render(Path::new("/no/such/dir"))
            .unwrap_err();
        assert!(matches!(err, DocError::MissingRoot(_)));
    }

    #[test]
    fn test_fenced() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "pkg/Cargo.toml");
        let filter = FileFilter::with_defaults().unwrap();
        let fenced = TreeRenderer::new(&filter, 3)
            .render_fenced(&dir.path().join("pkg"))
            .unwrap();
        assert_eq!(fenced, "```text\npkg/\n└── Cargo.toml\n```");
    }
}
