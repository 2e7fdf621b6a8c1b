//! Map stage: one backend call per chunk.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use super::prompts;
use crate::backend::{CompletionBackend, CompletionRequest};
use crate::chunkers::ChunkPacker;
use crate::error::Result;
use crate::types::{join_notes, Chunk, Note, Unit};

/// Upper bound on note-merging rounds before the reduce call.
pub const MAX_COLLAPSE_ROUNDS: usize = 3;

/// What a summarizer is asked to do with each chunk.
#[derive(Debug, Clone)]
enum MapTask {
    /// Analytical note about repository code
    Analyze,
    /// Bullet points about code relevant to one concept
    Compress { concept: String },
    /// Merge previously written notes
    Collapse,
}

/// Summarises chunks into notes.
///
/// Chunks are processed through a bounded buffer of `concurrency` in-flight
/// calls. Notes always come back in chunk order.
pub struct MapSummarizer<'a> {
    backend: &'a dyn CompletionBackend,
    model: String,
    task: MapTask,
    concurrency: usize,
}

impl<'a> MapSummarizer<'a> {
    /// Summarizer producing analytical notes for a README.
    pub fn new(backend: &'a dyn CompletionBackend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            task: MapTask::Analyze,
            concurrency: 1,
        }
    }

    /// Summarizer condensing code toward a single concept.
    pub fn for_concept(
        backend: &'a dyn CompletionBackend,
        model: impl Into<String>,
        concept: impl Into<String>,
    ) -> Self {
        Self {
            task: MapTask::Compress {
                concept: concept.into(),
            },
            ..Self::new(backend, model)
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Summarise one chunk.
    pub async fn summarize(&self, chunk: &Chunk, total: usize) -> Result<Note> {
        let (system, user, temperature) = match &self.task {
            MapTask::Analyze => (
                prompts::MAP_SYSTEM,
                prompts::map_user(chunk, total),
                prompts::MAP_TEMPERATURE,
            ),
            MapTask::Compress { concept } => (
                prompts::COMPRESSOR_SYSTEM,
                prompts::compressor_user(concept, chunk),
                prompts::MAP_TEMPERATURE,
            ),
            MapTask::Collapse => (
                prompts::COLLAPSE_SYSTEM,
                prompts::collapse_user(chunk),
                prompts::COLLAPSE_TEMPERATURE,
            ),
        };

        debug!(
            chunk_index = chunk.index,
            total,
            cost = chunk.cost,
            pieces = chunk.pieces.len(),
            "Summarising chunk"
        );
        let request = CompletionRequest::new(&self.model, system, user).with_temperature(temperature);
        let text = self.backend.complete(&request).await?;
        Ok(Note::new(chunk.index, text))
    }

    /// Summarise every chunk, returning notes in chunk order.
    pub async fn summarize_all(&self, chunks: &[Chunk]) -> Result<Vec<Note>> {
        let total = chunks.len();
        info!(chunks = total, concurrency = self.concurrency, "Starting map stage");
        let notes: Vec<Note> = stream::iter(chunks)
            .map(|chunk| self.summarize(chunk, total))
            .buffered(self.concurrency)
            .try_collect()
            .await?;
        info!(notes = notes.len(), "Map stage complete");
        Ok(notes)
    }

    /// Merge notes until their joined text fits the packer's ceiling.
    ///
    /// Each round re-packs the notes as units and summarises the resulting
    /// chunks with the merge prompt. Stops after [`MAX_COLLAPSE_ROUNDS`] or
    /// when a single note is left, whichever comes first.
    pub async fn collapse(&self, notes: Vec<Note>, packer: &ChunkPacker) -> Result<Vec<Note>> {
        let merger = Self {
            backend: self.backend,
            model: self.model.clone(),
            task: MapTask::Collapse,
            concurrency: self.concurrency,
        };

        let mut notes = notes;
        for round in 1..=MAX_COLLAPSE_ROUNDS {
            let cost = packer.cost(&join_notes(&notes));
            if cost <= packer.max_cost() || notes.len() <= 1 {
                break;
            }
            let units: Vec<Unit> = notes
                .iter()
                .map(|n| Unit::new(format!("notes {}", n.chunk_index + 1), format!("{}\n\n", n.text)))
                .collect();
            let chunks = packer.pack(&units);
            info!(round, notes = notes.len(), chunks = chunks.len(), cost, "Collapsing notes");
            notes = merger.summarize_all(&chunks).await?;
        }
        Ok(notes)
    }
}
