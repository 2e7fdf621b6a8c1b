//! Prompt texts for every backend call a run makes.

use crate::output::{RELATED_FILES_HEADING, REFERENCES_HEADING, SOURCE_FILES_HEADING, TREE_PLACEHOLDER};
use crate::types::Chunk;

/// Map stage temperature: consistency over creativity.
pub const MAP_TEMPERATURE: f32 = 0.1;
/// Note merging between map and reduce.
pub const COLLAPSE_TEMPERATURE: f32 = 0.1;
/// File picker for a concept.
pub const PICKER_TEMPERATURE: f32 = 0.1;
/// Final README synthesis.
pub const README_TEMPERATURE: f32 = 0.3;
/// Final concept page synthesis.
pub const CONCEPT_TEMPERATURE: f32 = 0.25;

pub const MAP_SYSTEM: &str = "\
You are a senior software engineer reading one part of a repository.
Write a compact technical note about the code you are given. Use Markdown bullet points under these headings:

### Purpose
### Key types and functions
### Data flow
### Configuration and environment
### External dependencies
### Notable details

Rules:
- State only what the code shows. Do not guess at behaviour that is not visible.
- Name files, types and functions exactly as written.
- If a file is cut into parts, describe only the part you see.
- Output the note only, with no preamble.";

pub const COLLAPSE_SYSTEM: &str = "\
You merge technical notes about parts of one repository into a single shorter note.
Keep every concrete fact (file names, types, functions, configuration keys, dependencies).
Drop repetition. Keep the same headings. Output the merged note only.";

pub const COMPRESSOR_SYSTEM: &str = "\
You are a software architect. Compress the code fragments you are given into Markdown bullet points
covering the important behaviour, rules and data structures related to the concept.
Always mention the file each point comes from. Output the bullet points only.";

pub const README_SYSTEM: &str = "\
You are a technical writer producing the README of a software project from engineering notes.
Follow the section skeleton you are given exactly, in order. Fill every section from the notes only;
never invent features, commands or configuration that the notes do not mention.
Keep the line {{DIRECTORY_TREE}} exactly as written, on its own line: it is replaced with the real tree later.
Output pure Markdown only.";

pub const FILE_PICKER_SYSTEM: &str = "\
You are an experienced software architect. Given the YAML structure of a source tree and a concept,
list every file directly involved in the concept: its domain model, its specification (API contracts,
schemas, migrations, routing) and its implementation (services, handlers, repositories, conversions).

Rules:
1. Output a JSON array of relative file path strings and nothing else.
2. Only paths under the source root shown in the structure.
3. When a directory is relevant, list every source file beneath it. Do not stop at index or mod files.
4. Always include specification files for the concept when they exist.
5. Exclude tests, mocks, fixtures, examples and build output.
6. Never list directories. Only list files that appear in the structure. No duplicates.

Output format:
[\"src/feature/a.rs\", \"src/feature/b.rs\"]";

pub const DOC_WRITER_SYSTEM: &str = "\
You are a technical writer for a product audience that includes non-engineers: product and project
managers, sales, customers and newly joined engineers. From the related code, the concept, USED_PATHS
and REPO_BASE_URL, write one Markdown page about the concept.

Requirements:
- Open with one to three plain sentences saying what the concept is.
- Cover specification, behaviour, constraints, caveats and corner cases thoroughly.
- Back each claim with a bracketed numeric reference such as [1] pointing at the source file. References
  link to REPO_BASE_URL followed by the relative path.
- State only facts readable from the related code. No speculation.
- Mermaid diagrams are allowed when they help, with a plain-language explanation next to them.
- End the page with a Related Files section listing every path in USED_PATHS with a link, and a
  References section defining every [n].
- Do not discuss tests or development tooling.

Output pure Markdown only.";

/// User prompt for summarising one chunk.
pub fn map_user(chunk: &Chunk, total: usize) -> String {
    format!(
        "# Part {} of {}\n\n# Files\n{}\n\n# Source\n{}",
        chunk.index + 1,
        total,
        bullet_list(&chunk.labels()),
        chunk.content()
    )
}

/// User prompt for compressing one chunk toward a concept.
pub fn compressor_user(concept: &str, chunk: &Chunk) -> String {
    format!("# Concept\n{concept}\n\n# Code fragments\n{}", chunk.content())
}

/// User prompt for merging a group of notes.
pub fn collapse_user(chunk: &Chunk) -> String {
    format!("# Notes to merge\n\n{}", chunk.content())
}

/// User prompt for the README synthesis call.
pub fn readme_user(project: &str, notes: &str, manifests: Option<&str>, files: &[String]) -> String {
    let manifests = manifests
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("(none)");
    format!(
        "# Project\n{project}\n\n\
         # Engineering notes (in source order)\n{notes}\n\n\
         # Package manifests\n{manifests}\n\n\
         # Source files ({count})\n{files}\n\n\
         # Section skeleton\n\
         # {project}\n\
         > One or two sentences on what the project is.\n\n\
         ## Overview\n\
         ## Features\n\
         ## Architecture\n\
         ## Directory Structure\n\
         {TREE_PLACEHOLDER}\n\n\
         ## Getting Started\n\
         ## Configuration\n\
         ## Usage\n\
         {SOURCE_FILES_HEADING}\n",
        count = files.len(),
        files = bullet_list(files),
    )
}

/// User prompt for picking the files of a concept.
pub fn file_picker_user(concept: &str, structure: &str) -> String {
    format!(
        "# Concept\n{concept}\n\n\
         # Structure (complete YAML of the source tree)\n{structure}\n\n\
         # Expected output format\n[\"src/feature/a.rs\", \"src/feature/b.rs\"]"
    )
}

/// User prompt for writing a concept page.
pub fn doc_writer_user(concept: &str, related_code: &str, used_paths: &[String], repo_base_url: &str) -> String {
    format!(
        "# Concept\n{concept}\n\n\
         # related_code (labelled per file)\n{related_code}\n\n\
         # USED_PATHS (every related file, all must be listed)\n{paths}\n\n\
         # REPO_BASE_URL (append a relative path to build a link)\n{repo_base_url}\n\n\
         # Expected sections\n\
         # {concept}\n\
         > One to three plain sentences on what this concept is.\n\n\
         ## Overview\n\
         ## Why it matters\n\
         ## How it works\n\
         ## Specification and behaviour\n\
         ### Data, state and rules\n\
         ### Flows and algorithms\n\
         ### Exceptions, corner cases and known pitfalls\n\
         ### Constraints and assumptions\n\
         ## Usage scenarios\n\
         ## Operational tips\n\
         ## Glossary\n\
         {RELATED_FILES_HEADING}\n\
         {REFERENCES_HEADING}\n",
        paths = bullet_list(used_paths),
    )
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
