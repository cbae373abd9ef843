//! Articles and the filter used to list them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Slug, Username};
use crate::user::Profile;

/// A published article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of users favoriting this article. Maintained by the store.
    pub favorites_count: u32,
    /// Author snapshot taken when the article was created.
    pub author: Profile,
}

impl Article {
    /// Whether the article carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_list.iter().any(|t| t == tag)
    }

    /// Apply an update to the mutable text fields.
    pub fn apply(&mut self, update: &ArticleUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(body) = &update.body {
            self.body = body.clone();
        }
    }
}

/// Caller input for creating an article. The slug is derived from the title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// Partial update of an article's text. Slug, author, tags and timestamps
/// are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// Conjunctive filter for article listings.
///
/// `None` and empty strings both mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    pub author: Option<Username>,
    pub favorited: Option<Username>,
}

impl ArticleFilter {
    /// A filter matching every article.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only articles carrying `tag`.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Only articles written by `author`.
    pub fn author(mut self, author: impl Into<Username>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Only articles favorited by `username`.
    pub fn favorited_by(mut self, username: impl Into<Username>) -> Self {
        self.favorited = Some(username.into());
        self
    }

    /// Effective tag constraint.
    pub fn tag_constraint(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }

    /// Effective author constraint.
    pub fn author_constraint(&self) -> Option<&str> {
        self.author
            .as_ref()
            .map(Username::as_str)
            .filter(|a| !a.is_empty())
    }

    /// Effective favorited-by constraint.
    pub fn favorited_constraint(&self) -> Option<&str> {
        self.favorited
            .as_ref()
            .map(Username::as_str)
            .filter(|f| !f.is_empty())
    }
}
