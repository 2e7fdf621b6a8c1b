//! Single-document mode: one README for the whole source root.

use std::path::Path;

use tracing::{info, warn};

use super::map::MapSummarizer;
use super::reduce::{ReduceSynthesizer, Synthesis};
use super::RunContext;
use crate::error::{DocError, Result};
use crate::output::{
    file_item, structure_yaml, DocumentAssembler, OutputFile, TreeRenderer, SOURCE_FILES_HEADING,
    STRUCTURE_FILE, TREE_HEADING, TREE_PLACEHOLDER,
};
use crate::processing::manifest::MANIFEST_FILE;
use crate::processing::{FileProcessor, FileSelector, PackageManifest, SelectedFile};
use crate::types::{join_notes, Unit};

/// Selector → packer → map → reduce → assembler.
pub struct ReadmePipeline<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> ReadmePipeline<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// Produce the README and the structure snapshot.
    pub async fn run(&self) -> Result<Vec<OutputFile>> {
        let ctx = self.ctx;
        let config = ctx.config;
        let src_label = config.src_dir.to_string_lossy().replace('\\', "/");
        let disk_src = ctx.base.join(&config.src_dir);

        let (files, manifests) = self.select()?;
        let project = project_name(&manifests, &disk_src);

        let processor = FileProcessor::new(ctx.filter);
        let mut units: Vec<Unit> = Vec::with_capacity(files.len());
        let mut labels = Vec::with_capacity(files.len());
        for file in &files {
            if let Some(unit) = processor.read_unit(&file.path, &file.label)? {
                labels.push(file.label.clone());
                units.push(unit);
            }
        }
        if units.is_empty() {
            return Err(DocError::NothingToDocument(disk_src));
        }

        let chunks = ctx.packer.pack(&units);
        info!(
            project = %project,
            files = units.len(),
            chunks = chunks.len(),
            max_cost = ctx.packer.max_cost(),
            "Packed source files"
        );

        let summarizer =
            MapSummarizer::new(ctx.backend, &config.model_docs).with_concurrency(config.map_concurrency);
        let notes = summarizer.summarize_all(&chunks).await?;
        let notes = summarizer.collapse(notes, ctx.packer).await?;

        let manifest_text = render_manifests(&manifests, ctx.base);
        let draft = ReduceSynthesizer::new(ctx.backend, &config.model_docs)
            .synthesize(
                &join_notes(&notes),
                Synthesis::Readme {
                    project: &project,
                    manifests: manifest_text.as_deref(),
                    files: &labels,
                },
            )
            .await?;

        let tree = TreeRenderer::new(ctx.filter, config.tree_max_depth).render_fenced(&disk_src)?;
        let document = DocumentAssembler::new(draft)
            .substitute_placeholder(TREE_PLACEHOLDER, TREE_HEADING, &tree)
            .ensure_listing(SOURCE_FILES_HEADING, &labels, |_, path| {
                file_item(path, Some(config.repo_base_url.as_str()))
            })
            .finish();

        let structure = structure_yaml(&disk_src, &src_label, ctx.filter)?;
        Ok(vec![
            OutputFile::new(&config.readme_file, document),
            OutputFile::new(STRUCTURE_FILE, structure),
        ])
    }

    /// Files to document plus the manifests describing them.
    fn select(&self) -> Result<(Vec<SelectedFile>, Vec<PackageManifest>)> {
        let ctx = self.ctx;
        let config = ctx.config;
        let selector = FileSelector::new(ctx.filter).relative_to(ctx.base);

        if config.crate_aware {
            let selection = selector.select_packages(&config.src_dir, config.include_auxiliary)?;
            return Ok((selection.files, selection.packages));
        }

        let files = selector.select(&config.src_dir)?;
        let manifests = root_manifest(ctx.base).into_iter().collect();
        Ok((files, manifests))
    }
}

/// The package manifest at `base`, if there is one that parses.
fn root_manifest(base: &Path) -> Option<PackageManifest> {
    let path = base.join(MANIFEST_FILE);
    let raw = std::fs::read_to_string(&path).ok()?;
    match PackageManifest::parse(&path, &raw) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable root manifest");
            None
        }
    }
}

fn project_name(manifests: &[PackageManifest], src: &Path) -> String {
    if let Some(first) = manifests.first() {
        return first.name.clone();
    }
    // the checkout directory is named after the project more often than not
    src.canonicalize()
        .ok()
        .and_then(|p| {
            p.parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Project".to_string())
}

/// Manifests as fenced TOML blocks labelled by their path under `base`.
fn render_manifests(manifests: &[PackageManifest], base: &Path) -> Option<String> {
    if manifests.is_empty() {
        return None;
    }
    let blocks: Vec<String> = manifests
        .iter()
        .map(|m| {
            let label = m.path.strip_prefix(base).unwrap_or(&m.path);
            format!(
                "===== {} =====\n```toml\n{}\n```",
                label.to_string_lossy().replace('\\', "/"),
                m.raw.trim_end()
            )
        })
        .collect();
    Some(blocks.join("\n\n"))
}
