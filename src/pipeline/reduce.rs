//! Reduce stage: one synthesis call over everything the map stage produced.

use tracing::info;

use super::prompts;
use crate::backend::{CompletionBackend, CompletionRequest};
use crate::error::Result;

/// Material handed to the synthesis call.
#[derive(Debug, Clone, Copy)]
pub enum Synthesis<'s> {
    /// README of a whole source root
    Readme {
        project: &'s str,
        /// Structured auxiliary text, e.g. package manifests
        manifests: Option<&'s str>,
        files: &'s [String],
    },
    /// Page about one concept
    Concept {
        concept: &'s str,
        used_paths: &'s [String],
        repo_base_url: &'s str,
    },
}

/// Produces a draft document with a single backend call.
pub struct ReduceSynthesizer<'a> {
    backend: &'a dyn CompletionBackend,
    model: String,
}

impl<'a> ReduceSynthesizer<'a> {
    pub fn new(backend: &'a dyn CompletionBackend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Ask for a draft following the skeleton of `kind`.
    ///
    /// `material` is either the joined notes or, when it fits the budget,
    /// the verbatim code.
    pub async fn synthesize(&self, material: &str, kind: Synthesis<'_>) -> Result<String> {
        let (system, user, temperature) = match kind {
            Synthesis::Readme {
                project,
                manifests,
                files,
            } => (
                prompts::README_SYSTEM,
                prompts::readme_user(project, material, manifests, files),
                prompts::README_TEMPERATURE,
            ),
            Synthesis::Concept {
                concept,
                used_paths,
                repo_base_url,
            } => (
                prompts::DOC_WRITER_SYSTEM,
                prompts::doc_writer_user(concept, material, used_paths, repo_base_url),
                prompts::CONCEPT_TEMPERATURE,
            ),
        };

        info!(model = %self.model, material_len = material.len(), "Synthesising document");
        let request = CompletionRequest::new(&self.model, system, user).with_temperature(temperature);
        self.backend.complete(&request).await
    }
}
