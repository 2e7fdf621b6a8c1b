//! Repodoc Library
//!
//! Turns a source tree into documentation with a map-reduce pipeline over a
//! chat-completion backend: files are packed into budget-bounded chunks,
//! each chunk is summarised, and one synthesis call writes the document.
//! Produces either a single README or one page per concept inside an
//! mdBook scaffold.

pub mod backend;
pub mod chunkers;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use backend::{CompletionBackend, CompletionRequest, GatedBackend, OpenAiClient};
pub use chunkers::{ChunkPacker, TokenCounter};
pub use error::{DocError, Result};
pub use output::{OutputFile, OutputWriter};
pub use pipeline::{generate, generate_to_disk, RunContext};
pub use types::{Chunk, DocGenConfig, DocMode, Note, Unit};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::*;
    pub use crate::chunkers::*;
    pub use crate::error::*;
    pub use crate::pipeline::*;
    pub use crate::types::*;
}

/// Default chat-completions base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for both file picking and writing
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default budget in characters
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 120_000;

/// Default budget in tokens
pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 24_000;

/// Default spacing between backend calls in milliseconds
pub const DEFAULT_CALL_DELAY_MS: u64 = 600;

/// Default per-call timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default depth of the rendered directory tree
pub const DEFAULT_TREE_MAX_DEPTH: usize = 6;
