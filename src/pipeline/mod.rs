//! The documentation pipelines.
//!
//! Both modes follow the same shape: select files, pack them into
//! budget-bounded chunks, summarise each chunk (map), synthesise one draft
//! (reduce) and let the assembler enforce what the draft must contain.
//! Every artifact is returned in memory; nothing here touches the output
//! directory.

pub mod candidates;
pub mod concepts;
pub mod map;
pub mod prompts;
pub mod readme;
pub mod reduce;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::backend::CompletionBackend;
use crate::chunkers::ChunkPacker;
use crate::error::Result;
use crate::output::{OutputFile, OutputWriter};
use crate::processing::FileFilter;
use crate::types::{DocGenConfig, DocMode};

pub use candidates::{extract_json_array, keyword_candidates, resolve_candidates, slugify};
pub use concepts::{ConceptPage, ConceptPipeline};
pub use map::{MapSummarizer, MAX_COLLAPSE_ROUNDS};
pub use readme::ReadmePipeline;
pub use reduce::{ReduceSynthesizer, Synthesis};

/// Everything a pipeline needs, resolved once at startup.
pub struct RunContext<'a> {
    pub config: &'a DocGenConfig,
    pub backend: &'a dyn CompletionBackend,
    pub filter: &'a FileFilter,
    pub packer: &'a ChunkPacker,
    /// Directory relative paths in the configuration are resolved against
    pub base: &'a Path,
}

/// Run the pipeline selected by the configured mode.
pub async fn generate(ctx: &RunContext<'_>) -> Result<Vec<OutputFile>> {
    match ctx.config.mode {
        DocMode::Readme => ReadmePipeline::new(ctx).run().await,
        DocMode::Concepts => ConceptPipeline::new(ctx).run().await,
    }
}

/// Run the configured pipeline and write its artifacts to the output
/// directory. Nothing is written unless every stage succeeded.
pub async fn generate_to_disk(ctx: &RunContext<'_>) -> Result<Vec<PathBuf>> {
    let outputs = generate(ctx).await?;
    let output_dir = ctx.base.join(&ctx.config.output_dir);
    let written = OutputWriter::new(&output_dir).write_all(&outputs)?;
    info!(files = written.len(), output_dir = %output_dir.display(), "Documentation written");
    Ok(written)
}
