//! Store trait: the interface request handlers use for all domain state.
//!
//! Every method is one bounded critical section. Nothing spans calls, so a
//! caller that needs "check then act" gets each step serialized on its own.
//! Author checks are the exception: the `*_own_*` methods check ownership
//! and write under the same lock.

use inkwell_core::{
    Article, ArticleFilter, ArticleUpdate, Comment, CommentId, Email, Page, PageRequest, Slug,
    User, UserUpdate, Username,
};

use crate::error::Result;

/// The Store trait: synchronous interface over users, articles, comments,
/// follows and favorites.
///
/// # Design Notes
///
/// - **Copies out**: reads return owned values; mutating them never reaches
///   the store.
/// - **All or nothing**: a failing write leaves every index as it was.
/// - **Validated edges**: follow/favorite mutations require both endpoints
///   to exist; the membership queries do not.
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // User Registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a user with an already hashed password.
    ///
    /// `Conflict` if the email or the username is taken.
    fn create_user(&self, user: User, password_hash: String) -> Result<()>;

    /// Look up a user by email.
    fn user_by_email(&self, email: &Email) -> Result<User>;

    /// Look up a user by username.
    fn user_by_username(&self, username: &Username) -> Result<User>;

    /// The stored password hash, for the credential collaborator to verify.
    fn password_hash(&self, email: &Email) -> Result<String>;

    /// Apply a partial update to the user registered under `email`.
    ///
    /// A new email or username is checked against every *other* user
    /// before anything changes. Returns the updated user.
    fn update_user(&self, email: &Email, update: &UserUpdate) -> Result<User>;

    // ─────────────────────────────────────────────────────────────────────────
    // Article Catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert an article under its slug and merge its tags into the tag set.
    ///
    /// The owner is the user currently registered under the snapshot's
    /// username; `NotFound` if there is none.
    fn create_article(&self, article: Article) -> Result<()>;

    /// Insert an article owned by the user registered under `author`.
    ///
    /// The author snapshot is taken from that user in the same critical
    /// section, replacing whatever `article.author` held. Returns the stored
    /// article.
    fn publish_article(&self, author: &Email, article: Article) -> Result<Article>;

    /// Get an article by slug, with its current favorite count.
    fn article(&self, slug: &Slug) -> Result<Article>;

    /// Overwrite title, description and/or body.
    fn update_article(&self, slug: &Slug, update: &ArticleUpdate) -> Result<Article>;

    /// Delete an article together with its comments and favorite edges.
    fn delete_article(&self, slug: &Slug) -> Result<()>;

    /// [`Store::update_article`], only if `editor` owns the article.
    ///
    /// `NotOwner` otherwise, with nothing changed.
    fn update_own_article(
        &self,
        editor: &Email,
        slug: &Slug,
        update: &ArticleUpdate,
    ) -> Result<Article>;

    /// [`Store::delete_article`], only if `editor` owns the article.
    fn delete_own_article(&self, editor: &Email, slug: &Slug) -> Result<()>;

    /// Articles matching every constraint of `filter`, in slug order.
    fn list_articles(&self, filter: &ArticleFilter, page: PageRequest) -> Result<Page<Article>>;

    /// Every tag ever attached to an article, sorted.
    fn tags(&self) -> Result<Vec<String>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Comment Ledger
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a comment to an article. Returns the assigned id.
    ///
    /// The owner is resolved from the snapshot's username, as in
    /// [`Store::create_article`].
    fn add_comment(&self, slug: &Slug, comment: Comment) -> Result<CommentId>;

    /// Append a comment owned by the user registered under `author`, with
    /// the author snapshot taken under the lock. Returns the stored comment.
    fn post_comment(&self, author: &Email, slug: &Slug, comment: Comment) -> Result<Comment>;

    /// All comments on an article, in id order.
    fn comments(&self, slug: &Slug) -> Result<Vec<Comment>>;

    /// Get a single comment.
    fn comment(&self, slug: &Slug, id: CommentId) -> Result<Comment>;

    /// Delete a single comment.
    fn delete_comment(&self, slug: &Slug, id: CommentId) -> Result<()>;

    /// [`Store::delete_comment`], only if `editor` owns the comment.
    fn delete_own_comment(&self, editor: &Email, slug: &Slug, id: CommentId) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Graph
    // ─────────────────────────────────────────────────────────────────────────

    /// Add the edge `follower -> followed`. Idempotent.
    fn follow(&self, follower: &Username, followed: &Username) -> Result<()>;

    /// Remove the edge `follower -> followed`. Missing edge is a no-op.
    fn unfollow(&self, follower: &Username, followed: &Username) -> Result<()>;

    /// Whether the edge exists. Unknown users simply yield `false`.
    fn is_following(&self, follower: &Username, followed: &Username) -> Result<bool>;

    /// Mark `slug` favorited by `username`. Idempotent.
    fn favorite(&self, slug: &Slug, username: &Username) -> Result<()>;

    /// Remove the favorite edge. Missing edge is a no-op.
    fn unfavorite(&self, slug: &Slug, username: &Username) -> Result<()>;

    /// Whether `username` favorites `slug`. Unknown slugs yield `false`.
    fn is_favorite(&self, slug: &Slug, username: &Username) -> Result<bool>;

    /// Articles written by anyone `username` follows, in slug order.
    fn feed(&self, username: &Username, page: PageRequest) -> Result<Page<Article>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Whether an article with this slug exists.
    ///
    /// This is the lookup handed to [`inkwell_core::unique_slug`].
    fn slug_exists(&self, slug: &Slug) -> Result<bool> {
        match self.article(slug) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolve an email to the username it is registered under.
    fn username_of(&self, email: &Email) -> Result<Username> {
        Ok(self.user_by_email(email)?.username)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn create_user(&self, user: User, password_hash: String) -> Result<()> {
        (**self).create_user(user, password_hash)
    }

    fn user_by_email(&self, email: &Email) -> Result<User> {
        (**self).user_by_email(email)
    }

    fn user_by_username(&self, username: &Username) -> Result<User> {
        (**self).user_by_username(username)
    }

    fn password_hash(&self, email: &Email) -> Result<String> {
        (**self).password_hash(email)
    }

    fn update_user(&self, email: &Email, update: &UserUpdate) -> Result<User> {
        (**self).update_user(email, update)
    }

    fn create_article(&self, article: Article) -> Result<()> {
        (**self).create_article(article)
    }

    fn publish_article(&self, author: &Email, article: Article) -> Result<Article> {
        (**self).publish_article(author, article)
    }

    fn article(&self, slug: &Slug) -> Result<Article> {
        (**self).article(slug)
    }

    fn update_article(&self, slug: &Slug, update: &ArticleUpdate) -> Result<Article> {
        (**self).update_article(slug, update)
    }

    fn delete_article(&self, slug: &Slug) -> Result<()> {
        (**self).delete_article(slug)
    }

    fn update_own_article(
        &self,
        editor: &Email,
        slug: &Slug,
        update: &ArticleUpdate,
    ) -> Result<Article> {
        (**self).update_own_article(editor, slug, update)
    }

    fn delete_own_article(&self, editor: &Email, slug: &Slug) -> Result<()> {
        (**self).delete_own_article(editor, slug)
    }

    fn list_articles(&self, filter: &ArticleFilter, page: PageRequest) -> Result<Page<Article>> {
        (**self).list_articles(filter, page)
    }

    fn tags(&self) -> Result<Vec<String>> {
        (**self).tags()
    }

    fn add_comment(&self, slug: &Slug, comment: Comment) -> Result<CommentId> {
        (**self).add_comment(slug, comment)
    }

    fn post_comment(&self, author: &Email, slug: &Slug, comment: Comment) -> Result<Comment> {
        (**self).post_comment(author, slug, comment)
    }

    fn comments(&self, slug: &Slug) -> Result<Vec<Comment>> {
        (**self).comments(slug)
    }

    fn comment(&self, slug: &Slug, id: CommentId) -> Result<Comment> {
        (**self).comment(slug, id)
    }

    fn delete_comment(&self, slug: &Slug, id: CommentId) -> Result<()> {
        (**self).delete_comment(slug, id)
    }

    fn delete_own_comment(&self, editor: &Email, slug: &Slug, id: CommentId) -> Result<()> {
        (**self).delete_own_comment(editor, slug, id)
    }

    fn follow(&self, follower: &Username, followed: &Username) -> Result<()> {
        (**self).follow(follower, followed)
    }

    fn unfollow(&self, follower: &Username, followed: &Username) -> Result<()> {
        (**self).unfollow(follower, followed)
    }

    fn is_following(&self, follower: &Username, followed: &Username) -> Result<bool> {
        (**self).is_following(follower, followed)
    }

    fn favorite(&self, slug: &Slug, username: &Username) -> Result<()> {
        (**self).favorite(slug, username)
    }

    fn unfavorite(&self, slug: &Slug, username: &Username) -> Result<()> {
        (**self).unfavorite(slug, username)
    }

    fn is_favorite(&self, slug: &Slug, username: &Username) -> Result<bool> {
        (**self).is_favorite(slug, username)
    }

    fn feed(&self, username: &Username, page: PageRequest) -> Result<Page<Article>> {
        (**self).feed(username, page)
    }
}
