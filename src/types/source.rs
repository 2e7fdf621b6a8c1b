//! Source unit definitions.

use serde::{Deserialize, Serialize};

/// One discovered file's content tagged with a display label.
///
/// Units are immutable once read: the selector creates them and the packer
/// only ever borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Display label, usually the repository-relative path
    pub label: String,

    /// Content that gets packed and sent to the model
    pub body: String,
}

impl Unit {
    /// Create a new unit.
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }

    /// Build a unit whose body is a labelled, fenced code block.
    ///
    /// This is the shape every prompt receives source code in, so packing
    /// budgets account for the header and fence as well as the code.
    pub fn fenced(path: &str, fence_tag: &str, code: &str) -> Self {
        let body = format!("===== file: {path} =====\n```{fence_tag}\n{code}\n```\n");
        Self::new(path, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_unit_layout() {
        let unit = Unit::fenced("src/main.rs", "rust", "fn main() {}");
        assert_eq!(unit.label, "src/main.rs");
        assert_eq!(
            unit.body,
            "===== file: src/main.rs =====\n```rust\nfn main() {}\n```\n"
        );
    }
}
