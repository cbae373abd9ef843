//! # Inkwell Core
//!
//! Pure domain values for the inkwell blogging backend: users, profiles,
//! articles, comments, and the query types used to list them.
//!
//! This crate contains no locking and no I/O. State lives in
//! `inkwell-store`; this crate only describes its shape.
//!
//! ## Key Types
//!
//! - [`User`] - Registered account (public fields only, never the password hash)
//! - [`Profile`] - Author snapshot embedded in articles and comments
//! - [`Article`] - Published article, keyed by [`Slug`]
//! - [`Comment`] - Comment on an article, keyed per article by [`CommentId`]
//! - [`ArticleFilter`] / [`PageRequest`] / [`Page`] - Listing queries
//!
//! ## Slugs
//!
//! Slug derivation lives here rather than in the store: the store only checks
//! uniqueness. See [`slug`] module.

pub mod article;
pub mod comment;
pub mod error;
pub mod page;
pub mod slug;
pub mod types;
pub mod user;
pub mod validation;

pub use article::{Article, ArticleFilter, ArticleUpdate, NewArticle};
pub use comment::Comment;
pub use error::ValidationError;
pub use page::{Page, PageRequest, DEFAULT_PAGE_LIMIT};
pub use slug::{derive_slug, unique_slug};
pub use types::{CommentId, Email, Slug, Username};
pub use user::{Profile, User, UserUpdate};
pub use validation::{validate_email, validate_new_article, validate_registration};
