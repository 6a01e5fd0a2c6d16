//! Error types for Courtline.
//!
//! Library crates use [`CourtlineError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Courtline operations.
#[derive(Debug, thiserror::Error)]
pub enum CourtlineError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Checkpoint ledger persistence error. Fatal to the current run:
    /// continuing with an unrecorded outcome would risk duplicate requests
    /// against the external source or lost checkpoint state.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Input parsing error (malformed Stage-1 records, bad case numbers).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (ledger inconsistency, unknown court, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CourtlineError>;

impl CourtlineError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Classifies a fetch failure for the orchestrator's recovery bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Retryable: network failure, timeout, 5xx, rate-limit signal.
    Transient,
    /// Non-retryable: unknown case id, unusable response body.
    Permanent,
}

/// A timeline fetch failure, surfaced after the fetcher's own retry
/// attempts are exhausted (transient) or immediately (permanent).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} fetch error: {detail}", match .kind {
    FetchErrorKind::Transient => "transient",
    FetchErrorKind::Permanent => "permanent",
})]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl FetchError {
    /// Create a transient (retryable) fetch error.
    pub fn transient(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transient,
            detail: detail.into(),
        }
    }

    /// Create a permanent (non-retryable) fetch error.
    pub fn permanent(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Permanent,
            detail: detail.into(),
        }
    }

    /// Whether the orchestrator may retry this case.
    pub fn is_transient(&self) -> bool {
        self.kind == FetchErrorKind::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CourtlineError::config("missing data directory");
        assert_eq!(err.to_string(), "config error: missing data directory");

        let err = CourtlineError::validation("ledger has unknown case ids");
        assert!(err.to_string().contains("unknown case ids"));
    }

    #[test]
    fn fetch_error_kinds() {
        let t = FetchError::transient("HTTP 503");
        assert!(t.is_transient());
        assert_eq!(t.to_string(), "transient fetch error: HTTP 503");

        let p = FetchError::permanent("HTTP 404");
        assert!(!p.is_transient());
        assert!(p.to_string().starts_with("permanent"));
    }
}
