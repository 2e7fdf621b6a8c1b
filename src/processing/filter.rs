//! File filtering configuration and rules.
//!
//! Provides the include/exclude rules for discovery: a recognised-extension
//! allow-list, case-insensitive path patterns for development assets (tests,
//! fixtures, build output, docs), and directories that are never descended
//! into (version control, dependency caches).

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};

use crate::error::{DocError, Result};
use crate::processing::language::LanguageDetector;

/// Configuration for file filtering.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Directories never descended into.
    pub excluded_directories: HashSet<String>,
    /// Regex patterns matched case-insensitively against `/`-separated paths.
    pub exclude_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_directories: default_excluded_directories(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

pub(crate) fn default_excluded_directories() -> HashSet<String> {
    [
        // Version control
        ".git",
        ".svn",
        ".hg",
        // Dependencies and build output
        "node_modules",
        "vendor",
        ".venv",
        "venv",
        "__pycache__",
        ".pytest_cache",
        ".mypy_cache",
        ".tox",
        "target",
        ".next",
        ".nuxt",
        // IDE
        ".idea",
        ".vscode",
        ".vs",
        // Misc
        "coverage",
        ".cache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    [
        r"(^|/)tests?(/|$)",
        r"(^|/)__tests__(/|$)",
        r"(^|/)specs?(/|$)",
        r"(^|/)e2e(/|$)",
        r"(^|/)fixtures?(/|$)",
        r"(^|/)mocks?(/|$)",
        r"(^|/)__mocks__(/|$)",
        r"(^|/)stories?(/|$)",
        r"\.story\.",
        r"\.spec\.",
        r"\.test\.",
        r"(^|/)scripts?(/|$)",
        r"(^|/)bench(es|marks)?(/|$)",
        r"(^|/)examples?(/|$)",
        r"(^|/)docs?(/|$)",
        r"(^|/)\.docs(/|$)",
        r"(^|/)build(/|$)",
        r"(^|/)dist(/|$)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// File filter for determining which files to document.
pub struct FileFilter {
    config: FilterConfig,
    exclude_regex: Option<Regex>,
    detector: LanguageDetector,
}

impl FileFilter {
    /// Create a new file filter with the given configuration.
    pub fn new(config: FilterConfig) -> Result<Self> {
        let exclude_regex = if config.exclude_patterns.is_empty() {
            None
        } else {
            let joined = config.exclude_patterns.join("|");
            let regex = RegexBuilder::new(&joined)
                .case_insensitive(true)
                .build()
                .map_err(|e| DocError::Config(format!("invalid exclude pattern: {e}")))?;
            Some(regex)
        };

        Ok(Self {
            config,
            exclude_regex,
            detector: LanguageDetector::new(),
        })
    }

    /// Create a filter with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(FilterConfig::default())
    }

    /// Whether a path matches an exclude pattern.
    pub fn is_excluded(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        self.exclude_regex
            .as_ref()
            .is_some_and(|re| re.is_match(&normalized))
    }

    /// Whether discovery should skip this directory entirely.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.config.excluded_directories.contains(name)
    }

    /// Check if a file should be documented.
    ///
    /// `path` is matched against the exclude patterns as given, so callers
    /// choose which prefix the patterns see. Returns `Ok(())` if the file is
    /// in scope, or `Err(reason)` if it should be skipped.
    pub fn should_process(&self, path: &str) -> std::result::Result<(), String> {
        let path_obj = Path::new(path);

        for component in path_obj.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if self.is_excluded_dir(name) {
                    return Err(format!("In excluded directory: {}", name));
                }
            }
        }

        if self.is_excluded(path) {
            return Err("Matches exclude pattern".to_string());
        }

        if !self.detector.is_recognized(path_obj) {
            return Err("Unrecognised extension".to_string());
        }

        Ok(())
    }

    /// Check if content appears to be binary.
    pub fn is_binary_content(&self, content: &[u8], sample_size: usize) -> bool {
        let sample = &content[..content.len().min(sample_size)];

        // Null bytes are a strong indicator of binary
        if sample.contains(&0) {
            return true;
        }

        let non_printable = sample
            .iter()
            .filter(|&&b| b < 32 && !matches!(b, 9 | 10 | 13)) // tab, newline, carriage return
            .count();

        !sample.is_empty() && (non_printable as f64 / sample.len() as f64) > 0.1
    }

    /// Get the language detector backing the extension allow-list.
    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }
}
