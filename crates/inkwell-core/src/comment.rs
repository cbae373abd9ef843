//! Comments on articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CommentId;
use crate::user::Profile;

/// A comment attached to one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Assigned by the store on insert; whatever the caller sets is replaced.
    pub id: CommentId,
    pub body: String,
    pub author: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// A new, not yet stored comment written now.
    pub fn new(body: impl Into<String>, author: Profile) -> Self {
        let now = Utc::now();
        Self {
            id: CommentId::default(),
            body: body.into(),
            author,
            created_at: now,
            updated_at: now,
        }
    }
}
