//! Error types for inkwell core.

use thiserror::Error;

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} can't be blank")]
    Blank(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("title does not yield a usable slug: {0:?}")]
    UnsluggableTitle(String),
}
