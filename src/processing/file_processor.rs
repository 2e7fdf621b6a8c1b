//! Turns files on disk into units.
//!
//! Handles binary detection, decoding and line-ending normalisation so that
//! everything downstream sees clean `\n`-separated text.

use std::path::Path;

use tracing::warn;

use crate::error::{DocError, Result};
use crate::processing::filter::FileFilter;
use crate::types::Unit;

/// Bytes inspected when deciding whether a file is binary.
const BINARY_SAMPLE_SIZE: usize = 8192;

/// Reads source files into fenced, labelled units.
pub struct FileProcessor<'a> {
    filter: &'a FileFilter,
}

impl<'a> FileProcessor<'a> {
    pub fn new(filter: &'a FileFilter) -> Self {
        Self { filter }
    }

    /// Read a file into a unit labelled `label`.
    ///
    /// Returns `Ok(None)` for binary files, which are skipped with a warning.
    pub fn read_unit(&self, path: &Path, label: &str) -> Result<Option<Unit>> {
        let bytes = std::fs::read(path).map_err(|e| DocError::io(path, e))?;
        Ok(self.process(label, &bytes))
    }

    /// Process raw content into a unit, `None` if it looks binary.
    pub fn process(&self, label: &str, content: &[u8]) -> Option<Unit> {
        if self.filter.is_binary_content(content, BINARY_SAMPLE_SIZE) {
            warn!(path = label, "Binary file detected, skipping");
            return None;
        }

        let text = normalize_line_endings(&decode(content));
        let fence = self.filter.detector().fence_tag(label);
        Some(Unit::fenced(label, fence, &text))
    }
}

/// Decode bytes as text, never failing.
///
/// UTF-16 with a byte-order mark is honoured; everything else is read as
/// UTF-8 with undecodable sequences replaced by U+FFFD.
pub fn decode(content: &[u8]) -> String {
    if content.len() >= 2 && content[0] == 0xFF && content[1] == 0xFE {
        let utf16: Vec<u16> = content[2..]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if content.len() >= 2 && content[0] == 0xFE && content[1] == 0xFF {
        let utf16: Vec<u16> = content[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    String::from_utf8_lossy(content).into_owned()
}

/// Normalize line endings to Unix-style (LF).
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}
