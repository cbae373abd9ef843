//! # Inkwell
//!
//! A blogging backend: users, profiles, articles, comments, tags, follows
//! and favorites, behind one service API.
//!
//! ## Overview
//!
//! - **Users** register with an email, a username and a password, and sign
//!   in with an identity token.
//! - **Articles** are addressed by a slug derived from their title. A second
//!   article with the same title gets `-1`, `-2` and so on.
//! - **Relations**: users follow users and favorite articles. Every article
//!   carries a favorite counter that always equals its number of favorites.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use inkwell::{Blog, BlogConfig, NewUser, ScryptCredentials};
//! use inkwell::core::NewArticle;
//! use inkwell::store::MemoryStore;
//!
//! async fn example() -> inkwell::Result<()> {
//!     let blog = Blog::new(MemoryStore::new(), ScryptCredentials, BlogConfig::from_env()?);
//!
//!     let session = blog
//!         .register(NewUser {
//!             username: "alice".into(),
//!             email: "alice@example.com".into(),
//!             password: "correct horse".into(),
//!         })
//!         .await?;
//!
//!     let email = blog.authenticate(&session.token)?;
//!     let view = blog.create_article(
//!         &email,
//!         NewArticle {
//!             title: "Hello World".into(),
//!             description: "first post".into(),
//!             body: "...".into(),
//!             tag_list: vec!["intro".into()],
//!         },
//!     )?;
//!     assert_eq!(view.article.slug, "hello-world");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `inkwell::core` - Domain values (User, Article, Comment, Slug, etc.)
//! - `inkwell::store` - Storage abstraction and the in-memory store

pub mod blog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod token;

// Re-export component crates
pub use inkwell_core as core;
pub use inkwell_store as store;

// Re-export main types for convenience
pub use blog::{ArticleView, Blog, LoginRequest, NewUser, UserChanges, UserSession};
pub use config::BlogConfig;
pub use credentials::{Credentials, ScryptCredentials};
pub use error::{BlogError, Result};
pub use token::TokenIssuer;

// Re-export commonly used core types
pub use inkwell_core::{
    Article, ArticleFilter, ArticleUpdate, Comment, CommentId, Email, NewArticle, Page,
    PageRequest, Profile, Slug, User, Username,
};
