//! Error types for the store module.

use std::fmt;

use thiserror::Error;

/// Kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Article,
    Comment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::User => "user",
            Entity::Article => "article",
            Entity::Comment => "comment",
        })
    }
}

/// Unique key whose value was already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Email,
    Username,
    Slug,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UniqueKey::Email => "email",
            UniqueKey::Username => "username",
            UniqueKey::Slug => "slug",
        })
    }
}

/// Errors that can occur during store operations.
///
/// Every failure is deterministic given the store's current state, and no
/// failing operation leaves a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Referenced user, article or comment does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    /// Uniqueness violation on email, username or slug.
    #[error("{key} already taken: {value}")]
    Conflict { key: UniqueKey, value: String },

    /// The article or comment belongs to a different user.
    #[error("{entity} {key} belongs to another user")]
    NotOwner { entity: Entity, key: String },

    /// A previous lock holder panicked.
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn not_found(entity: Entity, key: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn conflict(key: UniqueKey, value: impl fmt::Display) -> Self {
        StoreError::Conflict {
            key,
            value: value.to_string(),
        }
    }

    /// Whether this is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub(crate) fn not_owner(entity: Entity, key: impl fmt::Display) -> Self {
        StoreError::NotOwner {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether this is a `NotOwner`.
    pub fn is_not_owner(&self) -> bool {
        matches!(self, StoreError::NotOwner { .. })
    }

    /// Whether this is a `Conflict`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
