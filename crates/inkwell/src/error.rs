//! Error types for the blog service.

use inkwell_core::ValidationError;
use inkwell_store::StoreError;
use thiserror::Error;

/// Errors that can occur during blog operations.
#[derive(Debug, Error)]
pub enum BlogError {
    /// Request input failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error (not found, conflict).
    #[error("storage error: {0}")]
    Store(#[source] StoreError),

    /// Password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredential,

    /// Token is malformed or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Token was valid but has expired.
    #[error("token has expired")]
    ExpiredToken,

    /// Caller is not allowed to touch this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Password hashing failed for a reason other than a mismatch.
    #[error("credential error: {0}")]
    Credential(String),

    /// Token could not be issued.
    #[error("token error: {0}")]
    Token(String),

    /// Configuration value could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A blocking task was cancelled or panicked.
    #[error("task error: {0}")]
    Task(String),
}

impl BlogError {
    /// Whether this wraps a store `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::Store(e) if e.is_not_found())
    }

    /// Whether this wraps a store `Conflict`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BlogError::Store(e) if e.is_conflict())
    }
}

impl From<StoreError> for BlogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotOwner { .. } => BlogError::Forbidden(e.to_string()),
            other => BlogError::Store(other),
        }
    }
}

/// Result type for blog operations.
pub type Result<T> = std::result::Result<T, BlogError>;
