//! Rewrite error types

use std::io;
use thiserror::Error;

/// Per-file rewrite error type
///
/// Every variant is scoped to a single candidate file; the processing loop
/// converts these into `error` outcomes and moves on to the next file.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// IO error reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Frontmatter opened with `---` but never closed
    #[error("frontmatter starts with '---' but has no closing marker ('---' or '...')")]
    MissingClosingMarker,

    /// Frontmatter interior is not a valid YAML mapping
    #[error("malformed frontmatter: {0}")]
    MalformedYaml(String),

    /// A date token was present but day or year-month could not be resolved
    #[error("date unresolved: {0}")]
    UnresolvedDate(String),

    /// File content is not valid UTF-8
    #[error("invalid UTF-8 encoding in file")]
    Encoding,

    /// Apply-time write failure
    #[error("write failed: {0}")]
    Write(String),
}

/// Specialized Result type for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;

impl RewriteError {
    /// Create a malformed-frontmatter error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedYaml(msg.into())
    }

    /// Create an unresolved-date error
    pub fn unresolved_date(msg: impl Into<String>) -> Self {
        Self::UnresolvedDate(msg.into())
    }

    /// Create an apply-time write error
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
}
