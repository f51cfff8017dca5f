//! Error types for repository value types

use thiserror::Error;

/// Result type for path parsing and manipulation
pub type PathResult<T> = std::result::Result<T, PathError>;

/// Errors raised when validating a repository path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Empty path string provided
    #[error("path cannot be empty")]
    Empty,

    /// Path does not start at the repository root
    #[error("path must be absolute (start with '/'): {0}")]
    Relative(String),

    /// Path contains an empty segment
    #[error("path contains an empty segment: {0}")]
    EmptySegment(String),

    /// Non-root path ends with a slash
    #[error("path must not end with '/': {0}")]
    TrailingSlash(String),
}
