//! Core types for documentation runs.

mod chunk;
mod concept;
mod config;
mod source;

pub use chunk::{join_notes, Chunk, ChunkPiece, Note};
pub use concept::{CandidateFileSet, ConceptList};
pub use config::{CostModel, DocGenConfig, DocMode};
pub use source::Unit;
