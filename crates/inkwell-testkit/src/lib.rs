//! # Inkwell Testkit
//!
//! Testing utilities for inkwell.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a ready [`Blog`](inkwell::Blog) over a fresh store, and
//!   helpers that seed a bare store directly
//! - **Generators**: Proptest strategies for property-based testing
//! - **Tracing**: a subscriber that writes through the test harness
//!
//! ## Test Fixtures
//!
//! ```rust
//! use inkwell_testkit::fixtures::TestFixture;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let fixture = TestFixture::new();
//! let alice = fixture.register("alice").await;
//! let slug = fixture.publish(&alice, "Hello World", &["intro"]);
//! assert_eq!(slug, "hello-world");
//! # });
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use inkwell_testkit::generators::{page_request, titles};
//!
//! proptest! {
//!     #[test]
//!     fn slugs_never_collide(titles in titles(20)) {
//!         // ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod tracing;

pub use fixtures::{article, new_article, seeded_store, PlainCredentials, TestFixture};
pub use generators::{page_request, username, FavoriteOp};
pub use tracing::init_test_tracing;
