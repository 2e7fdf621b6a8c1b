//! Deterministic artifacts and final document assembly.

mod assembler;
mod scaffold;
mod structure;
mod tree;
mod writer;

pub use assembler::{
    file_item, join_url, reference_item, DocumentAssembler, REFERENCES_HEADING,
    RELATED_FILES_HEADING, SOURCE_FILES_HEADING, TREE_HEADING, TREE_PLACEHOLDER,
};
pub use scaffold::{book_scaffold, BookPage};
pub use structure::{build_structure, structure_yaml, STRUCTURE_FILE};
pub use tree::{TreeRenderer, TRUNCATED_MARKER};
pub use writer::{OutputFile, OutputWriter};
