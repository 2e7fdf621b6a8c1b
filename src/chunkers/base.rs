//! Text sizing used for every budgeting decision.

use std::sync::Arc;

use crate::error::{DocError, Result};
use crate::types::CostModel;

/// Maps text to an integer cost.
///
/// Implementations must be pure, never fail, and be monotonic in text
/// length. One counter is chosen per run and shared by every component.
pub trait TokenCounter: Send + Sync {
    /// Cost of the given text.
    fn count_tokens(&self, text: &str) -> usize;

    /// Cost of raw bytes; undecodable sequences are replaced, not rejected.
    fn count_bytes(&self, bytes: &[u8]) -> usize {
        self.count_tokens(&String::from_utf8_lossy(bytes))
    }

    /// Name of the scheme, for logging.
    fn name(&self) -> &'static str;
}

/// Token counter using tiktoken (cl100k_base encoding).
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenCounter {
    /// Create a new token counter with the cl100k_base encoding (GPT-4/ChatGPT).
    pub fn new() -> Result<Self> {
        Self::with_encoding("cl100k_base")
    }

    /// Create a token counter with a specific encoding.
    pub fn with_encoding(encoding_name: &str) -> Result<Self> {
        let bpe = match encoding_name {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => return Err(DocError::Config(format!("unknown tiktoken encoding: {other}"))),
        }
        .map_err(|e| DocError::Config(format!("failed to load {encoding_name}: {e}")))?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &'static str {
        "tiktoken"
    }
}

/// Counts Unicode scalar values. Matches a characters-per-context budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCounter;

impl TokenCounter for CharCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn name(&self) -> &'static str {
        "chars"
    }
}

/// Build the counter for a cost model.
pub fn counter_for(model: CostModel) -> Result<Arc<dyn TokenCounter>> {
    Ok(match model {
        CostModel::Chars => Arc::new(CharCounter),
        CostModel::Tokens => Arc::new(TiktokenCounter::new()?),
    })
}
