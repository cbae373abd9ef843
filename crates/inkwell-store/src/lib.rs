//! # Inkwell Store
//!
//! The concurrent in-memory relational store behind inkwell. It owns every
//! user, article, comment, follow edge and favorite edge, keeps the indices
//! over them mutually consistent, and answers filtered, paginated queries.
//!
//! ## Key Types
//!
//! - [`Store`] - The synchronous trait request handlers call
//! - [`MemoryStore`] - `RwLock`-guarded implementation
//! - [`StoreError`] - `NotFound` / `Conflict` outcomes
//!
//! ## Usage
//!
//! ```rust
//! use inkwell_core::{Email, User, Username};
//! use inkwell_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! store
//!     .create_user(User::new("alice@x.com", "alice"), "<hash>".into())
//!     .unwrap();
//!
//! let alice = store.user_by_username(&Username::new("alice")).unwrap();
//! assert_eq!(alice.email, Email::new("alice@x.com"));
//! ```
//!
//! ## Design Notes
//!
//! - **One lock**: reads share it, writes hold it exclusively, nothing is held
//!   across calls.
//! - **Cascading delete**: deleting an article drops its comments and
//!   favorite edges in the same critical section.
//! - **Derived counter**: an article's `favorites_count` is recomputed from
//!   its favorite edge set after every favorite mutation.
//! - **Deterministic order**: listings and feeds are in slug order, comments
//!   in id order, tags sorted.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Entity, Result, StoreError, UniqueKey};
pub use memory::{MemoryStore, StoreStats};
pub use traits::{Store, StoreExt};
