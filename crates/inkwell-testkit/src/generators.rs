//! Proptest generators for property-based testing.

use proptest::prelude::*;

use inkwell_core::{ArticleFilter, PageRequest, Username};

/// Generate a username.
pub fn username() -> impl Strategy<Value = Username> {
    "[a-z][a-z0-9_]{0,11}".prop_map(Username::new)
}

/// Generate a distinct set of usernames, in arbitrary order.
pub fn usernames(max: usize) -> impl Strategy<Value = Vec<Username>> {
    prop::collection::btree_set(username(), 1..=max.max(1))
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

/// Generate a tag.
pub fn tag() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(String::from)
}

/// Generate a title that always yields a non-empty slug.
///
/// Drawn from a small vocabulary so collisions are common.
pub fn title() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("hello"),
        Just("world"),
        Just("Rust"),
        Just("notes"),
        Just("2024"),
    ];
    (prop::collection::vec(word, 1..=3), "[ ,!?]{0,2}")
        .prop_map(|(words, noise)| format!("{}{}", words.join(" "), noise))
}

/// Generate up to `max` titles.
pub fn titles(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(title(), 1..=max.max(1))
}

/// Generate a page request, including zero limits and offsets past the end.
pub fn page_request() -> impl Strategy<Value = PageRequest> {
    (0usize..=30, 0usize..=40).prop_map(|(limit, offset)| PageRequest::new(limit, offset))
}

/// Generate a listing filter over `users` and `tags`. Each field may be
/// absent, empty, or set. Both pools must be non-empty.
pub fn article_filter(
    users: Vec<String>,
    tags: Vec<String>,
) -> impl Strategy<Value = ArticleFilter> {
    let pick = |pool: Vec<String>| {
        let set = prop::sample::select(pool).prop_map(Some);
        prop_oneof![Just(None), Just(Some(String::new())), set]
    };
    (pick(tags), pick(users.clone()), pick(users)).prop_map(|(tag, author, favorited)| {
        let mut filter = ArticleFilter::new();
        if let Some(tag) = tag {
            filter = filter.tag(tag);
        }
        if let Some(author) = author {
            filter = filter.author(author);
        }
        if let Some(fan) = favorited {
            filter = filter.favorited_by(fan);
        }
        filter
    })
}

/// A favorite toggle by one user on one article, both given as indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOp {
    Favorite { user: usize, article: usize },
    Unfavorite { user: usize, article: usize },
}

impl FavoriteOp {
    /// The (user, article) pair this op touches.
    pub fn target(&self) -> (usize, usize) {
        match *self {
            FavoriteOp::Favorite { user, article } | FavoriteOp::Unfavorite { user, article } => {
                (user, article)
            }
        }
    }
}

/// Generate a sequence of favorite toggles over `users` users and
/// `articles` articles.
pub fn favorite_ops(
    users: usize,
    articles: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<FavoriteOp>> {
    let op = (0..users.max(1), 0..articles.max(1), any::<bool>()).prop_map(
        |(user, article, add)| {
            if add {
                FavoriteOp::Favorite { user, article }
            } else {
                FavoriteOp::Unfavorite { user, article }
            }
        },
    );
    prop::collection::vec(op, 0..=max_len)
}
