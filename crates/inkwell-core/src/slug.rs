//! Slug derivation.
//!
//! A slug is the lowercased title with everything but ASCII letters, digits
//! and whitespace removed, and whitespace runs replaced by a single `-`.
//! Uniqueness is resolved by probing `base`, `base-1`, `base-2`, ... against
//! a caller supplied existence check (normally the store).

use crate::types::Slug;

/// Derive the base slug for a title.
///
/// May be empty when the title has no ASCII alphanumerics.
pub fn derive_slug(title: &str) -> Slug {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    Slug::new(kept.split_whitespace().collect::<Vec<_>>().join("-"))
}

/// Derive a slug for `title` that `exists` reports as free.
///
/// The lookup is fallible so it can be backed by a store; the first
/// lookup error aborts the search.
pub fn unique_slug<E>(
    title: &str,
    mut exists: impl FnMut(&Slug) -> Result<bool, E>,
) -> Result<Slug, E> {
    let base = derive_slug(title);
    if !exists(&base)? {
        return Ok(base);
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = Slug::new(format!("{}-{}", base, counter));
        if !exists(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}
