//! Error taxonomy for documentation runs.
//!
//! Recoverable inconsistencies (a missing placeholder, an unparseable file
//! list from the model) are repaired where they occur and never become a
//! `DocError`. Everything here halts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a documentation run.
#[derive(Debug, Error)]
pub enum DocError {
    /// Missing credential, unparseable setting, or other bad configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configured source root does not exist.
    #[error("source root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    /// Discovery produced no files in scope.
    #[error("nothing to document: no matching files under {}", .0.display())]
    NothingToDocument(PathBuf),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    /// The backend answered 200 but the body had an unexpected shape.
    #[error("unexpected backend response: {0}")]
    MalformedResponse(String),

    /// Network failure or timeout while talking to the backend.
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Rate limiting, server-side failures and transport errors are
    /// transient; client errors (400, 401, 403, 404, 422) and malformed
    /// bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            DocError::Backend { status, .. } => *status == 429 || (500..=599).contains(status),
            DocError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DocError>;
