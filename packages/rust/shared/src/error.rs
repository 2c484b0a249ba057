//! Error types for RankScope.
//!
//! Library crates use [`RankScopeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! An empty record set is deliberately *not* represented here: it is a
//! valid result that degrades to zeroed summaries.

use std::path::PathBuf;

/// Top-level error type for all RankScope operations.
#[derive(Debug, thiserror::Error)]
pub enum RankScopeError {
    /// The query was rejected before reaching the engine (empty/missing domain).
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// The Record Source round trip failed or timed out.
    #[error("record source unavailable: {0}")]
    SourceUnavailable(String),

    /// A record produced by the Record Source violated the data contract.
    #[error("data contract violation: {message}")]
    Contract { message: String },

    /// An in-flight query was superseded before it settled.
    #[error("query cancelled: {0}")]
    Cancelled(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RankScopeError>;

impl RankScopeError {
    /// Create an invalid-query error from any displayable message.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: msg.into(),
        }
    }

    /// Create a source-unavailable error from any displayable message.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create a data-contract error from any displayable message.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
