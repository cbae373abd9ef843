//! Users and the profile snapshot embedded in articles and comments.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Username};

/// A registered user.
///
/// Carries the public fields only. The password hash is held by the store
/// next to the user and is handed out only through the credential lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: Email,
    pub username: Username,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl User {
    /// A freshly registered user with an empty profile.
    pub fn new(email: impl Into<Email>, username: impl Into<Username>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            bio: None,
            image: None,
        }
    }

    /// Snapshot of this user's public profile.
    ///
    /// The snapshot is a copy: later edits to the user do not reach it.
    pub fn profile(&self) -> Profile {
        Profile {
            username: self.username.clone(),
            bio: self.bio.clone(),
            image: self.image.clone(),
            following: false,
        }
    }

    /// Apply the non-key fields of an update in place.
    ///
    /// Email and username relocation is the store's job since both are
    /// index keys; this only touches `bio` and `image`.
    pub fn apply_profile_fields(&mut self, update: &UserUpdate) {
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(image) = &update.image {
            self.image = Some(image.clone());
        }
    }
}

/// Partial update of a user. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<Email>,
    pub username: Option<Username>,
    pub bio: Option<String>,
    pub image: Option<String>,
    /// Already hashed by the credential collaborator.
    pub password_hash: Option<String>,
}

impl UserUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.bio.is_none()
            && self.image.is_none()
            && self.password_hash.is_none()
    }
}

/// Public view of a user, as seen by some viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: Username,
    pub bio: Option<String>,
    pub image: Option<String>,
    /// Whether the viewer follows this user. Always `false` in stored snapshots.
    pub following: bool,
}
