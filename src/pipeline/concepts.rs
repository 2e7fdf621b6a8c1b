//! Concept mode: one page per concept plus an mdBook around them.
//!
//! Concepts are processed strictly in list order and independently of each
//! other. A concept whose candidate files come out empty is skipped; a
//! backend failure aborts the whole run.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use super::candidates::{extract_json_array, keyword_candidates, resolve_candidates, slugify};
use super::map::MapSummarizer;
use super::prompts;
use super::reduce::{ReduceSynthesizer, Synthesis};
use super::RunContext;
use crate::backend::CompletionRequest;
use crate::error::{DocError, Result};
use crate::output::{
    book_scaffold, file_item, reference_item, structure_yaml, BookPage, DocumentAssembler,
    OutputFile, REFERENCES_HEADING, RELATED_FILES_HEADING, STRUCTURE_FILE,
};
use crate::processing::{FileProcessor, FileSelector};
use crate::types::{join_notes, CandidateFileSet, ConceptList, Unit};

/// A rendered concept page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptPage {
    pub title: String,
    pub slug: String,
    pub content: String,
}

/// Runs the per-concept sub-pipeline for every listed concept.
pub struct ConceptPipeline<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> ConceptPipeline<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// Produce the structure snapshot, every concept page and the scaffold.
    ///
    /// A missing or empty concept list still yields the scaffold.
    pub async fn run(&self) -> Result<Vec<OutputFile>> {
        let ctx = self.ctx;
        let config = ctx.config;
        let list = ConceptList::load(&ctx.base.join(&config.concepts_file))?;
        let src_label = config.src_label();

        if list.is_empty() {
            info!("No concepts to document, writing scaffold only");
            return Ok(book_scaffold(&list.domain, &src_label, &[], Utc::now()));
        }

        let disk_src = ctx.base.join(&config.src_dir);
        if !disk_src.is_dir() {
            return Err(DocError::MissingRoot(disk_src));
        }
        let structure = structure_yaml(&disk_src, &src_label, ctx.filter)?;
        let known_paths = FileSelector::new(ctx.filter)
            .relative_to(ctx.base)
            .list_labels(&config.src_dir)?;

        let mut outputs = vec![OutputFile::new(STRUCTURE_FILE, structure.clone())];
        let mut pages = Vec::new();
        let mut used_slugs = HashSet::new();
        for (i, concept) in list.concepts.iter().enumerate() {
            info!(concept = %concept, position = i + 1, total = list.concepts.len(), "Documenting concept");
            let Some(mut page) = self.document(concept, &structure, &known_paths).await? else {
                continue;
            };

            page.slug = unique_slug(&page.slug, &mut used_slugs);
            let file_name = format!("{}.md", page.slug);
            outputs.push(OutputFile::new(format!("src/{file_name}"), page.content));
            pages.push(BookPage {
                title: page.title,
                file_name,
            });
        }

        info!(written = pages.len(), listed = list.concepts.len(), "Concepts documented");
        outputs.extend(book_scaffold(&list.domain, &src_label, &pages, Utc::now()));
        Ok(outputs)
    }

    /// Document one concept, `None` when no candidate files were found.
    pub async fn document(
        &self,
        concept: &str,
        structure: &str,
        known_paths: &[String],
    ) -> Result<Option<ConceptPage>> {
        let ctx = self.ctx;
        let config = ctx.config;

        let candidates = self.pick_files(concept, structure, known_paths).await?;
        if candidates.is_empty() {
            warn!(concept, "No candidate files found, skipping concept");
            return Ok(None);
        }
        info!(concept, files = candidates.len(), "Resolved candidate files");

        let processor = FileProcessor::new(ctx.filter);
        let mut units: Vec<Unit> = Vec::with_capacity(candidates.len());
        for path in candidates.paths() {
            if let Some(unit) = processor.read_unit(&ctx.base.join(path), path)? {
                units.push(unit);
            }
        }
        if units.is_empty() {
            warn!(concept, "Every candidate file was binary, skipping concept");
            return Ok(None);
        }

        // only files whose content reaches the writer are cited
        let used_paths: Vec<String> = units.iter().map(|u| u.label.clone()).collect();
        let material = self.related_code(concept, &units).await?;
        let draft = ReduceSynthesizer::new(ctx.backend, &config.model_docs)
            .synthesize(
                &material,
                Synthesis::Concept {
                    concept,
                    used_paths: &used_paths,
                    repo_base_url: &config.repo_base_url,
                },
            )
            .await?;

        let base_url = config.repo_base_url.as_str();
        let references = used_paths
            .iter()
            .enumerate()
            .map(|(i, path)| reference_item(i, path, base_url))
            .collect::<Vec<_>>()
            .join("\n");
        let content = DocumentAssembler::new(draft)
            .ensure_listing(RELATED_FILES_HEADING, &used_paths, |_, path| {
                file_item(path, Some(base_url))
            })
            .ensure_section(REFERENCES_HEADING, &references)
            .finish();

        Ok(Some(ConceptPage {
            title: concept.to_string(),
            slug: slugify(concept),
            content,
        }))
    }

    /// Ask the file picker, fall back to keywords, then resolve.
    async fn pick_files(
        &self,
        concept: &str,
        structure: &str,
        known_paths: &[String],
    ) -> Result<CandidateFileSet> {
        let ctx = self.ctx;
        let request = CompletionRequest::new(
            &ctx.config.model_files,
            prompts::FILE_PICKER_SYSTEM,
            prompts::file_picker_user(concept, structure),
        )
        .with_temperature(prompts::PICKER_TEMPERATURE);
        let response = ctx.backend.complete(&request).await?;

        let raw = match extract_json_array(&response) {
            Some(paths) if !paths.is_empty() => paths,
            _ => {
                let matches = keyword_candidates(concept, known_paths);
                warn!(
                    concept,
                    matches = matches.len(),
                    "File picker returned no path array, using keyword search"
                );
                matches
            }
        };

        Ok(resolve_candidates(
            &raw,
            &ctx.config.src_prefix(),
            ctx.filter,
            ctx.base,
        ))
    }

    /// The code itself when it fits the budget, condensed notes otherwise.
    async fn related_code(&self, concept: &str, units: &[Unit]) -> Result<String> {
        let ctx = self.ctx;
        let verbatim = units
            .iter()
            .map(|u| u.body.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let cost = ctx.packer.cost(&verbatim);
        if cost <= ctx.packer.max_cost() {
            return Ok(verbatim);
        }

        let chunks = ctx.packer.pack(units);
        info!(concept, cost, chunks = chunks.len(), "Related code over budget, condensing");
        let summarizer = MapSummarizer::for_concept(ctx.backend, &ctx.config.model_docs, concept)
            .with_concurrency(ctx.config.map_concurrency);
        let notes = summarizer.summarize_all(&chunks).await?;
        let notes = summarizer.collapse(notes, ctx.packer).await?;
        Ok(join_notes(&notes))
    }
}

/// `slug`, or `slug-2`, `slug-3`, ... if already taken.
fn unique_slug(slug: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = slug.to_string();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{slug}-{n}");
        n += 1;
    }
    candidate
}
