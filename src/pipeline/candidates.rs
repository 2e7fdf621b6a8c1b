//! Candidate file extraction for a concept.
//!
//! Two stages, each usable on its own: a strict parse of the JSON array the
//! file picker was asked for, and a deterministic keyword match over the
//! known paths for when the model answered with anything else.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::processing::FileFilter;
use crate::types::CandidateFileSet;

lazy_static! {
    static ref SLUG_DISALLOWED: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SLUG_SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref SLUG_HYPHENS: Regex = Regex::new(r"-+").unwrap();
}

/// Parse the first `[` .. last `]` span of `text` as a JSON array.
///
/// Elements are stringified: strings as-is, anything else in its JSON form.
/// Returns `None` when there is no span or it is not a JSON array.
pub fn extract_json_array(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(&text[start..=end]).ok()?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Paths matching `concept` by keyword containment.
///
/// A path matches when it contains the concept's slug with hyphens removed,
/// or when it contains every word of the concept that is at least two
/// characters long. Matching ignores case.
pub fn keyword_candidates(concept: &str, paths: &[String]) -> Vec<String> {
    let key = slug_body(concept).replace('-', "").to_lowercase();
    let words: Vec<String> = concept
        .split_whitespace()
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect();

    paths
        .iter()
        .filter(|path| {
            let lower = path.to_lowercase();
            (!key.is_empty() && lower.contains(&key))
                || (!words.is_empty() && words.iter().all(|w| lower.contains(w.as_str())))
        })
        .cloned()
        .collect()
}

/// File name stem for a concept page.
///
/// Keeps word characters in any script, turns whitespace into hyphens and
/// collapses repeated hyphens. Falls back to `concept` when nothing is left.
pub fn slugify(text: &str) -> String {
    let slug = slug_body(text);
    if slug.is_empty() {
        "concept".to_string()
    } else {
        slug
    }
}

fn slug_body(text: &str) -> String {
    let kept = SLUG_DISALLOWED.replace_all(text, "");
    let hyphenated = SLUG_SPACES.replace_all(kept.trim(), "-");
    SLUG_HYPHENS.replace_all(&hyphenated, "-").into_owned()
}

/// Narrow raw candidates to files that can actually be documented.
///
/// Each path has leading `./` removed and must sit under `src_prefix`, pass
/// the exclude patterns, carry a recognised extension and exist relative to
/// `base`. The first occurrence of a path wins.
pub fn resolve_candidates(
    raw: &[String],
    src_prefix: &str,
    filter: &FileFilter,
    base: &Path,
) -> CandidateFileSet {
    let kept = raw.iter().filter_map(|candidate| {
        let mut path = candidate.trim();
        while let Some(rest) = path.strip_prefix("./") {
            path = rest;
        }

        let reason = if !path.starts_with(src_prefix) {
            Some("outside source root")
        } else if filter.is_excluded(path) {
            Some("excluded")
        } else if !filter.detector().is_recognized(path) {
            Some("unrecognised extension")
        } else if !base.join(path).is_file() {
            Some("missing")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(path, reason, "Dropping candidate");
                None
            }
            None => Some(path.to_string()),
        }
    });
    CandidateFileSet::from_paths(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_json_array() {
        assert_eq!(
            extract_json_array("Here you go:\n```json\n[\"src/a.rs\", \"src/b.rs\"]\n```"),
            Some(strings(&["src/a.rs", "src/b.rs"]))
        );
        assert_eq!(extract_json_array("[1, \"x\", null]"), Some(strings(&["1", "x", "null"])));
        assert_eq!(extract_json_array("[]"), Some(Vec::new()));
    }

    #[test]
    fn test_extract_json_array_rejects_prose() {
        assert_eq!(extract_json_array("The invoice logic lives in billing."), None);
        assert_eq!(extract_json_array("see [the docs] for more"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
        assert_eq!(extract_json_array("{\"files\": 1}"), None);
    }

    #[test]
    fn test_keyword_candidates() {
        let paths = strings(&[
            "src/billing/invoice.rs",
            "src/payment_retries/mod.rs",
            "src/retries/payment.rs",
            "src/user.rs",
        ]);

        assert_eq!(
            keyword_candidates("Invoice", &paths),
            strings(&["src/billing/invoice.rs"])
        );
        assert_eq!(
            keyword_candidates("Payment Retries", &paths),
            strings(&["src/payment_retries/mod.rs", "src/retries/payment.rs"])
        );
        assert!(keyword_candidates("Shipping", &paths).is_empty());
        assert!(keyword_candidates("  ", &paths).is_empty());
    }

    #[test]
    fn test_keyword_candidates_joined_slug() {
        let paths = strings(&["src/paymentretries.rs"]);
        assert_eq!(keyword_candidates("payment-retries", &paths), paths);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Payment retries"), "Payment-retries");
        assert_eq!(slugify("Tag  list / search"), "Tag-list-search");
        assert_eq!(slugify("  -- a -- b --  "), "-a-b-");
        assert_eq!(slugify("請求書 発行"), "請求書-発行");
        assert_eq!(slugify("!!!"), "concept");
        assert_eq!(slugify(""), "concept");
    }

    #[test]
    fn test_resolve_candidates() {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["src/billing/invoice.rs", "src/billing/tests/invoice.rs", "src/logo.png"] {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        let filter = FileFilter::with_defaults().unwrap();
        let raw = strings(&[
            "./src/billing/invoice.rs",
            "src/billing/invoice.rs",
            "lib/other.rs",
            "src/billing/tests/invoice.rs",
            "src/logo.png",
            "src/billing/missing.rs",
            "src/billing",
        ]);

        let set = resolve_candidates(&raw, "src/", &filter, dir.path());
        assert_eq!(set.paths(), &strings(&["src/billing/invoice.rs"])[..]);
    }
}
