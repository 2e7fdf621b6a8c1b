//! Run configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};
use crate::{
    DEFAULT_BASE_URL, DEFAULT_CALL_DELAY_MS, DEFAULT_MAX_CHUNK_TOKENS, DEFAULT_MAX_CONTEXT_CHARS,
    DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TREE_MAX_DEPTH,
};

/// Which kind of documentation a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocMode {
    /// One README-style document for the whole source tree
    Readme,
    /// One page per configured concept plus an mdBook scaffold
    Concepts,
}

impl FromStr for DocMode {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "readme" => Ok(DocMode::Readme),
            "concepts" | "concept" | "wiki" => Ok(DocMode::Concepts),
            other => Err(DocError::Config(format!("unknown DOC_MODE: {other}"))),
        }
    }
}

/// How text cost is measured for budgeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostModel {
    /// Unicode scalar values
    Chars,
    /// cl100k_base tokens
    Tokens,
}

impl FromStr for CostModel {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chars" | "characters" => Ok(CostModel::Chars),
            "tokens" | "tiktoken" => Ok(CostModel::Tokens),
            other => Err(DocError::Config(format!("unknown COST_MODEL: {other}"))),
        }
    }
}

/// Configuration for a documentation run.
///
/// Resolved once at process start and passed by reference into every
/// component; nothing below `main` reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocGenConfig {
    /// Bearer credential for the backend
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Chat-completions base URL (without the `/chat/completions` suffix)
    pub base_url: String,

    /// Model used to pick files for a concept
    pub model_files: String,

    /// Model used for summarisation and writing
    pub model_docs: String,

    pub mode: DocMode,

    /// Source root to document
    pub src_dir: PathBuf,

    /// Directory all artifacts are written to
    pub output_dir: PathBuf,

    /// Concept list (concept mode only)
    pub concepts_file: PathBuf,

    /// Prefix for hyperlinks to source files
    pub repo_base_url: String,

    /// File name of the single document in README mode
    pub readme_file: String,

    pub cost_model: CostModel,

    /// Budget in characters when `cost_model` is `Chars`
    pub max_context_chars: usize,

    /// Budget in tokens when `cost_model` is `Tokens`
    pub max_chunk_tokens: usize,

    /// Scope discovery to Cargo packages
    pub crate_aware: bool,

    /// Also read build scripts, examples, tests and benches of each package
    pub include_auxiliary: bool,

    /// Depth limit of the rendered directory tree
    pub tree_max_depth: usize,

    /// Minimum spacing between backend calls
    pub call_delay_ms: u64,

    /// Per-call timeout ceiling
    pub request_timeout_secs: u64,

    /// Bounded worker count for the map stage
    pub map_concurrency: usize,

    /// Retries for transient backend errors
    pub max_retries: u32,
}

impl DocGenConfig {
    /// Create a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_files: DEFAULT_MODEL.to_string(),
            model_docs: DEFAULT_MODEL.to_string(),
            mode: DocMode::Readme,
            src_dir: PathBuf::from("src"),
            output_dir: PathBuf::from(".docs"),
            concepts_file: PathBuf::from(".docs/concepts.yaml"),
            repo_base_url: "https://github.com/example/repo/tree/main/".to_string(),
            readme_file: "README.md".to_string(),
            cost_model: CostModel::Chars,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            crate_aware: false,
            include_auxiliary: false,
            tree_max_depth: DEFAULT_TREE_MAX_DEPTH,
            call_delay_ms: DEFAULT_CALL_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            map_concurrency: 1,
            max_retries: 0,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| DocError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let mut config = Self::new(api_key);

        if let Some(v) = get("OPENAI_BASE_URL") {
            config.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("OAI_MODEL_FILES") {
            config.model_files = v;
        }
        if let Some(v) = get("OAI_MODEL_DOCS") {
            config.model_docs = v;
        }
        if let Some(v) = get("DOC_MODE") {
            config.mode = v.parse()?;
        }
        if let Some(v) = get("SRC_DIR") {
            config.src_dir = PathBuf::from(v.trim_end_matches('/'));
        }
        if let Some(v) = get("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("CONCEPTS_FILE") {
            config.concepts_file = PathBuf::from(v);
        }
        if let Some(v) = get("REPO_BASE_URL") {
            config.repo_base_url = v;
        }
        if let Some(v) = get("README_FILE") {
            config.readme_file = v;
        }
        if let Some(v) = get("COST_MODEL") {
            config.cost_model = v.parse()?;
        }

        config.max_context_chars = parse_number(&get, "MAX_CONTEXT_CHARS", config.max_context_chars)?;
        config.max_chunk_tokens = parse_number(&get, "MAX_CHUNK_TOKENS", config.max_chunk_tokens)?;
        config.crate_aware = parse_flag(&get, "CRATE_AWARE", config.crate_aware)?;
        config.include_auxiliary = parse_flag(&get, "INCLUDE_AUXILIARY", config.include_auxiliary)?;
        config.tree_max_depth = parse_number(&get, "TREE_MAX_DEPTH", config.tree_max_depth)?;
        config.call_delay_ms = parse_number(&get, "CALL_DELAY_MS", config.call_delay_ms)?;
        config.request_timeout_secs =
            parse_number(&get, "REQUEST_TIMEOUT_SECS", config.request_timeout_secs)?;
        config.map_concurrency = parse_number(&get, "MAP_CONCURRENCY", config.map_concurrency)?;
        config.max_retries = parse_number(&get, "MAX_RETRIES", config.max_retries)?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(DocError::Config("OPENAI_API_KEY is not set".to_string()));
        }
        if self.max_chunk_cost() == 0 {
            return Err(DocError::Config("context budget must be greater than zero".to_string()));
        }
        if self.map_concurrency == 0 {
            return Err(DocError::Config("MAP_CONCURRENCY must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(DocError::Config("REQUEST_TIMEOUT_SECS must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Packing ceiling in the units of the configured cost model.
    pub fn max_chunk_cost(&self) -> usize {
        match self.cost_model {
            CostModel::Chars => self.max_context_chars,
            CostModel::Tokens => self.max_chunk_tokens,
        }
    }

    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The source root as a forward-slash prefix, e.g. `src/`.
    ///
    /// Empty when the source root is the checkout itself, so every relative
    /// path is under it.
    pub fn src_prefix(&self) -> String {
        let root = self.src_dir.to_string_lossy().replace('\\', "/");
        let mut root = root.trim_end_matches('/');
        while let Some(rest) = root.strip_prefix("./") {
            root = rest;
        }
        match root {
            "" | "." => String::new(),
            root => format!("{root}/"),
        }
    }

    /// The source root as shown to readers and the file picker.
    pub fn src_label(&self) -> String {
        match self.src_prefix().trim_end_matches('/') {
            "" => ".".to_string(),
            root => root.to_string(),
        }
    }
}

fn parse_number<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DocError::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(DocError::Config(format!("{key} must be a boolean, got {v:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = DocGenConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DocError::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config = DocGenConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.mode, DocMode::Readme);
        assert_eq!(config.cost_model, CostModel::Chars);
        assert_eq!(config.max_chunk_cost(), DEFAULT_MAX_CONTEXT_CHARS);
        assert_eq!(config.src_prefix(), "src/");
        assert_eq!(config.map_concurrency, 1);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_overrides() {
        let config = DocGenConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("DOC_MODE", "concepts"),
            ("COST_MODEL", "tokens"),
            ("MAX_CHUNK_TOKENS", "4000"),
            ("SRC_DIR", "app/"),
            ("CRATE_AWARE", "true"),
            ("MAP_CONCURRENCY", "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.mode, DocMode::Concepts);
        assert_eq!(config.max_chunk_cost(), 4000);
        assert_eq!(config.src_prefix(), "app/");
        assert_eq!(config.src_label(), "app");
        assert!(config.crate_aware);
        assert_eq!(config.map_concurrency, 3);
    }

    #[test]
    fn test_checkout_root_has_empty_prefix() {
        for src_dir in [".", "./", ""] {
            let config = DocGenConfig::from_lookup(lookup(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("SRC_DIR", src_dir),
            ]))
            .unwrap();
            assert_eq!(config.src_prefix(), "", "SRC_DIR={src_dir:?}");
            assert_eq!(config.src_label(), ".");
        }

        let nested = DocGenConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SRC_DIR", "./crates/core/src"),
        ]))
        .unwrap();
        assert_eq!(nested.src_prefix(), "crates/core/src/");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_number = DocGenConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_CONTEXT_CHARS", "lots"),
        ]));
        assert!(matches!(bad_number, Err(DocError::Config(_))));

        let zero_budget = DocGenConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_CONTEXT_CHARS", "0"),
        ]));
        assert!(matches!(zero_budget, Err(DocError::Config(_))));

        let bad_mode = DocGenConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DOC_MODE", "novel"),
        ]));
        assert!(matches!(bad_mode, Err(DocError::Config(_))));
    }
}
