//! Document assembly.
//!
//! The model's draft is never trusted to be complete. Every structural
//! guarantee a document makes (the directory tree at its placeholder, the
//! full list of contributing files, numbered references) has a deterministic
//! fallback here.

use tracing::{debug, info};

/// Marker the synthesizer is asked to leave where the directory tree goes.
pub const TREE_PLACEHOLDER: &str = "{{DIRECTORY_TREE}}";

/// Heading used when the tree placeholder is missing from the draft.
pub const TREE_HEADING: &str = "## Directory Structure";

/// Section listing every file a README was built from.
pub const SOURCE_FILES_HEADING: &str = "## Source Files";

/// Section listing every file a concept page was built from.
pub const RELATED_FILES_HEADING: &str = "## Related Files";

/// Section defining the numbered references of a concept page.
pub const REFERENCES_HEADING: &str = "## References";

/// Applies safety nets to a draft document.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    document: String,
}

impl DocumentAssembler {
    pub fn new(draft: impl Into<String>) -> Self {
        Self {
            document: draft.into(),
        }
    }

    /// Put `artifact` where `placeholder` is.
    ///
    /// The first occurrence is replaced and any further occurrences are
    /// removed, so the artifact appears exactly once. Without a placeholder
    /// the artifact is appended under `heading`.
    pub fn substitute_placeholder(mut self, placeholder: &str, heading: &str, artifact: &str) -> Self {
        let occurrences = self.document.matches(placeholder).count();
        if occurrences == 0 {
            info!(placeholder, "Placeholder missing from draft, appending artifact");
            self.append(&format!("{heading}\n\n{}", artifact.trim_end()));
            return self;
        }

        if occurrences > 1 {
            debug!(placeholder, occurrences, "Removing duplicate placeholders");
        }
        let replaced = self.document.replacen(placeholder, artifact.trim_end(), 1);
        self.document = replaced.replace(placeholder, "");
        self
    }

    /// Guarantee a section under `heading` that mentions every item.
    ///
    /// If the section is missing it is appended in full. If it exists but
    /// misses items, the missing ones are added at its end. An item counts
    /// as listed only where it appears as a whole path, so `src/app.ts` is
    /// not satisfied by `src/app.tsx` or `crates/x/src/app.ts`.
    pub fn ensure_listing<F>(mut self, heading: &str, items: &[String], render_item: F) -> Self
    where
        F: Fn(usize, &str) -> String,
    {
        let lines: Vec<&str> = self.document.lines().collect();
        let Some(start) = find_heading(&lines, heading) else {
            let body = if items.is_empty() {
                "- (none)".to_string()
            } else {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| render_item(i, item))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            info!(heading, items = items.len(), "Section missing from draft, appending");
            self.append(&format!("{heading}\n{body}"));
            return self;
        };

        let end = section_end(&lines, start);
        let section = lines[start..end].join("\n");
        let missing: Vec<String> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !mentions_path(&section, item))
            .map(|(i, item)| render_item(i, item))
            .collect();
        if missing.is_empty() {
            return self;
        }

        info!(heading, missing = missing.len(), "Section incomplete, adding missing entries");
        let mut insert_at = end;
        while insert_at > start + 1 && lines[insert_at - 1].trim().is_empty() {
            insert_at -= 1;
        }
        let trailing_newline = self.document.ends_with('\n');
        let mut rebuilt: Vec<&str> = Vec::with_capacity(lines.len() + missing.len());
        rebuilt.extend_from_slice(&lines[..insert_at]);
        rebuilt.extend(missing.iter().map(String::as_str));
        rebuilt.extend_from_slice(&lines[insert_at..]);
        let mut document = rebuilt.join("\n");
        if trailing_newline {
            document.push('\n');
        }
        self.document = document;
        self
    }

    /// Guarantee a section under `heading`, appending `body` if missing.
    pub fn ensure_section(mut self, heading: &str, body: &str) -> Self {
        let lines: Vec<&str> = self.document.lines().collect();
        if find_heading(&lines, heading).is_none() {
            info!(heading, "Section missing from draft, appending");
            self.append(&format!("{heading}\n{body}"));
        }
        self
    }

    pub fn finish(self) -> String {
        let mut document = self.document;
        if !document.ends_with('\n') {
            document.push('\n');
        }
        document
    }

    fn append(&mut self, section: &str) {
        let trimmed = self.document.trim_end().len();
        self.document.truncate(trimmed);
        if !self.document.is_empty() {
            self.document.push_str("\n\n---\n\n");
        }
        self.document.push_str(section);
        self.document.push('\n');
    }
}

fn find_heading(lines: &[&str], heading: &str) -> Option<usize> {
    lines.iter().position(|l| l.trim_start().starts_with(heading))
}

/// Whether `path` occurs in `text` as a whole path rather than as part of a
/// longer one.
fn mentions_path(text: &str, path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    text.match_indices(path).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let mut after = text[at + path.len()..].chars();
        let starts_clean = !before.is_some_and(|c| is_path_char(c) || c == '.');
        let ends_clean = match after.next() {
            None => true,
            // a sentence-ending period is fine, an extension is not
            Some('.') => !after.next().is_some_and(is_path_char),
            Some(c) => !is_path_char(c),
        };
        starts_clean && ends_clean
    })
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
}

/// Index one past the last line of the section starting at `start`.
fn section_end(lines: &[&str], start: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| l.starts_with("# ") || l.starts_with("## "))
        .map(|(i, _)| i)
        .unwrap_or(lines.len())
}

/// Render a file path as a list item, linked when a base URL is given.
pub fn file_item(path: &str, link_base: Option<&str>) -> String {
    match link_base {
        Some(base) => format!("- `{path}` — [{path}]({})", join_url(base, path)),
        None => format!("- `{path}`"),
    }
}

/// Render a numbered reference definition.
pub fn reference_item(index: usize, path: &str, base: &str) -> String {
    format!("[{}]: {}", index + 1, join_url(base, path))
}

/// Join a base URL and a relative path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches("./").trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_placeholder_replaced_once() {
        let draft = format!("# App\n\n## Directory Structure\n\n{TREE_PLACEHOLDER}\n\n## Usage\n");
        let doc = DocumentAssembler::new(draft)
            .substitute_placeholder(TREE_PLACEHOLDER, TREE_HEADING, "```text\nsrc/\n```")
            .finish();

        assert_eq!(doc.matches(TREE_PLACEHOLDER).count(), 0);
        assert_eq!(doc.matches("```text\nsrc/\n```").count(), 1);
        assert_eq!(
            doc,
            "# App\n\n## Directory Structure\n\n```text\nsrc/\n```\n\n## Usage\n"
        );
    }

    #[test]
    fn test_duplicate_placeholders_leave_one_artifact() {
        let draft = format!("{TREE_PLACEHOLDER}\ntext\n{TREE_PLACEHOLDER}\n");
        let doc = DocumentAssembler::new(draft)
            .substitute_placeholder(TREE_PLACEHOLDER, TREE_HEADING, "TREE")
            .finish();

        assert_eq!(doc.matches(TREE_PLACEHOLDER).count(), 0);
        assert_eq!(doc.matches("TREE").count(), 1);
    }

    #[test]
    fn test_missing_placeholder_appends_section() {
        let doc = DocumentAssembler::new("# App\n\nSome prose.\n")
            .substitute_placeholder(TREE_PLACEHOLDER, TREE_HEADING, "```text\nsrc/\n└── main.rs\n```")
            .finish();

        assert!(doc.starts_with("# App\n\nSome prose."));
        assert!(doc.contains("## Directory Structure\n\n```text\nsrc/\n└── main.rs\n```"));
    }

    #[test]
    fn test_missing_listing_is_appended() {
        let files = paths(&["src/a.rs", "src/b.rs"]);
        let doc = DocumentAssembler::new("# Doc\n\nBody.")
            .ensure_listing(RELATED_FILES_HEADING, &files, |_, p| file_item(p, None))
            .finish();

        assert_eq!(
            doc,
            "# Doc\n\nBody.\n\n---\n\n## Related Files\n- `src/a.rs`\n- `src/b.rs`\n"
        );
    }

    #[test]
    fn test_complete_listing_is_left_alone() {
        let draft = "# Doc\n\n## Related Files\n- src/a.rs\n- src/b.rs\n\n## References\n[1]: x\n";
        let doc = DocumentAssembler::new(draft)
            .ensure_listing(RELATED_FILES_HEADING, &paths(&["src/a.rs", "src/b.rs"]), |_, p| {
                file_item(p, None)
            })
            .finish();

        assert_eq!(doc, draft);
    }

    #[test]
    fn test_incomplete_listing_gets_missing_entries() {
        let draft = "# Doc\n\n## Related Files\n- src/a.rs\n\n## References\n[1]: x\n";
        let files = paths(&["src/a.rs", "src/b.rs", "src/c.rs"]);
        let doc = DocumentAssembler::new(draft)
            .ensure_listing(RELATED_FILES_HEADING, &files, |_, p| file_item(p, None))
            .finish();

        assert_eq!(
            doc,
            "# Doc\n\n## Related Files\n- src/a.rs\n- `src/b.rs`\n- `src/c.rs`\n\n## References\n[1]: x\n"
        );
    }

    #[test]
    fn test_listing_mentions_outside_section_do_not_count() {
        let draft = "# Doc\nsrc/b.rs is discussed here.\n\n## Related Files\n- src/a.rs\n";
        let files = paths(&["src/a.rs", "src/b.rs"]);
        let doc = DocumentAssembler::new(draft)
            .ensure_listing(RELATED_FILES_HEADING, &files, |_, p| file_item(p, None))
            .finish();

        let section = doc.split(RELATED_FILES_HEADING).nth(1).unwrap();
        assert!(section.contains("src/a.rs"));
        assert!(section.contains("src/b.rs"));
    }

    #[test]
    fn test_longer_extension_does_not_count_as_listed() {
        let draft = "# Doc\n\n## Related Files\n- src/app.tsx\n";
        let files = paths(&["src/app.ts", "src/app.tsx"]);
        let doc = DocumentAssembler::new(draft)
            .ensure_listing(RELATED_FILES_HEADING, &files, |_, p| file_item(p, None))
            .finish();

        assert_eq!(doc, "# Doc\n\n## Related Files\n- src/app.tsx\n- `src/app.ts`\n");
    }

    #[test]
    fn test_nested_path_does_not_count_as_listed() {
        let draft = "# Doc\n\n## Source Files\n- `crates/core/src/lib.rs`\n";
        let files = paths(&["crates/core/src/lib.rs", "src/lib.rs"]);
        let doc = DocumentAssembler::new(draft)
            .ensure_listing(SOURCE_FILES_HEADING, &files, |_, p| file_item(p, None))
            .finish();

        assert_eq!(
            doc,
            "# Doc\n\n## Source Files\n- `crates/core/src/lib.rs`\n- `src/lib.rs`\n"
        );
    }

    #[test]
    fn test_whole_path_forms_count_as_listed() {
        assert!(mentions_path("- `src/a.rs`", "src/a.rs"));
        assert!(mentions_path("- [src/a.rs](https://x/src/a.rs)", "src/a.rs"));
        assert!(mentions_path("See src/a.rs.", "src/a.rs"));
        assert!(!mentions_path("- include/util.hpp", "include/util.h"));
        assert!(!mentions_path("- web/app.json", "web/app.js"));
        assert!(!mentions_path("- lib/src/a.rs", "src/a.rs"));
    }

    #[test]
    fn test_empty_listing_renders_none() {
        let doc = DocumentAssembler::new("")
            .ensure_listing(SOURCE_FILES_HEADING, &[], |_, p| file_item(p, None))
            .finish();
        assert_eq!(doc, "## Source Files\n- (none)\n");
    }

    #[test]
    fn test_ensure_section_only_when_missing() {
        let with = DocumentAssembler::new("## References\n[1]: a\n")
            .ensure_section(REFERENCES_HEADING, "[1]: b")
            .finish();
        assert_eq!(with, "## References\n[1]: a\n");

        let without = DocumentAssembler::new("# Doc\n")
            .ensure_section(REFERENCES_HEADING, "[1]: b")
            .finish();
        assert_eq!(without, "# Doc\n\n---\n\n## References\n[1]: b\n");
    }

    #[test]
    fn test_items_and_urls() {
        assert_eq!(
            file_item("src/a.rs", Some("https://example.com/tree/main/")),
            "- `src/a.rs` — [src/a.rs](https://example.com/tree/main/src/a.rs)"
        );
        assert_eq!(
            reference_item(0, "./src/a.rs", "https://example.com/tree/main"),
            "[1]: https://example.com/tree/main/src/a.rs"
        );
    }
}
