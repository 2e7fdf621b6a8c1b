//! Discovery and preparation of source files.
//!
//! This module provides:
//! - File selection, plain or scoped to Cargo packages
//! - File filtering (extension allow-list, exclude patterns, skipped directories)
//! - Language detection for code fences
//! - Decoding and line-ending normalisation

pub mod file_processor;
pub mod filter;
pub mod language;
pub mod manifest;
pub mod selector;

pub use file_processor::FileProcessor;
pub use filter::{FileFilter, FilterConfig};
pub use language::{Language, LanguageDetector};
pub use manifest::{discover_packages, PackageManifest};
pub use selector::{FileSelector, PackageSelection, SelectedFile};
