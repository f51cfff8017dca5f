//! Error types for the permission resolution layer

use thiserror::Error;

/// Errors surfaced by permission caches and providers
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Failure reported by the backing permission store
    #[error("permission store error: {0}")]
    Store(String),

    /// Invalid repository path
    #[error("path error: {0}")]
    Path(#[from] canopy_core::PathError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Create a store error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        AuthzError::Store(msg.into())
    }
}

/// Result type for permission resolution operations
pub type Result<T> = std::result::Result<T, AuthzError>;
