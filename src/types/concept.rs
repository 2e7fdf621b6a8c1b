//! Concept list and candidate file types.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{DocError, Result};

/// Topics to document, as read from the concepts YAML file.
///
/// ```yaml
/// domain: Billing
/// concepts:
///   - Invoice
///   - Payment retries
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConceptList {
    /// Top-level domain label used for the landing page title
    #[serde(default)]
    pub domain: String,

    /// Ordered concept names
    #[serde(default)]
    pub concepts: Vec<String>,
}

impl ConceptList {
    /// Load a concept list.
    ///
    /// A missing file yields an empty list; callers treat that as "nothing
    /// to do" rather than an error. Malformed YAML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Concept list not found, skipping concept pages");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;
        let list = Self::parse(&raw)?;
        if list.concepts.is_empty() {
            warn!(path = %path.display(), "Concept list is empty");
        }
        Ok(list)
    }

    /// Parse concept YAML. An empty document is an empty list.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut list: ConceptList = serde_yaml::from_str(raw)?;
        list.concepts.retain(|c| !c.trim().is_empty());
        Ok(list)
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// Repository-relative paths judged relevant to one concept.
///
/// Always de-duplicated (first occurrence wins) and filtered to existing,
/// in-scope files before use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFileSet {
    paths: Vec<String>,
}

impl CandidateFileSet {
    /// Build a set from already-resolved paths, dropping duplicates.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for p in paths {
            let p = p.into();
            if !out.contains(&p) {
                out.push(p);
            }
        }
        Self { paths: out }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_concept_list() {
        let list = ConceptList::parse("domain: Billing\nconcepts:\n  - Invoice\n  - ''\n  - Refund\n")
            .unwrap();
        assert_eq!(list.domain, "Billing");
        assert_eq!(list.concepts, vec!["Invoice", "Refund"]);
    }

    #[test]
    fn test_empty_and_missing_lists() {
        assert!(ConceptList::parse("").unwrap().is_empty());
        assert!(ConceptList::parse("domain: X\n").unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let list = ConceptList::load(&dir.path().join("missing.yaml")).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_candidate_set_dedups_in_order() {
        let set = CandidateFileSet::from_paths(["src/b.rs", "src/a.rs", "src/b.rs"]);
        assert_eq!(set.paths(), &["src/b.rs".to_string(), "src/a.rs".to_string()]);
        assert_eq!(set.len(), 2);
    }
}
