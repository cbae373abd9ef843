//! The Blog: the service API request handlers call.
//!
//! A `Blog` is the single value handed to every handler. It combines the
//! store with the credential collaborator, the token issuer and the slug
//! derivation, and fills in the per-viewer fields (`following`,
//! `favorited`) the store does not keep.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use inkwell_core::{
    unique_slug, validate_email, validate_new_article, validate_registration, Article,
    ArticleFilter, ArticleUpdate, Comment, CommentId, Email, NewArticle, Page, PageRequest,
    Profile, Slug, User, UserUpdate, Username, ValidationError,
};
use inkwell_store::{Store, StoreExt};

use crate::config::BlogConfig;
use crate::credentials::Credentials;
use crate::error::{BlogError, Result};
use crate::token::TokenIssuer;

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile changes requested by the current user. The password is plaintext
/// here and hashed before it reaches the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub email: Option<Email>,
    pub username: Option<Username>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

/// An authenticated user together with a fresh identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// An article as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,
    pub favorited: bool,
}

/// The blog service.
pub struct Blog<S: Store, C: Credentials> {
    /// The storage backend.
    store: Arc<S>,
    /// Password hashing collaborator.
    credentials: Arc<C>,
    /// Identity token collaborator.
    tokens: TokenIssuer,
    /// Configuration.
    config: BlogConfig,
}

impl<S: Store, C: Credentials> Blog<S, C> {
    /// Create a new blog service.
    pub fn new(store: S, credentials: C, config: BlogConfig) -> Self {
        let tokens = TokenIssuer::new(config.token_secret.clone(), config.token_ttl);
        Self {
            store: Arc::new(store),
            credentials: Arc::new(credentials),
            tokens,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new user and sign them in.
    pub async fn register(&self, new_user: NewUser) -> Result<UserSession> {
        validate_registration(&new_user.username, &new_user.email, &new_user.password)?;

        let hash = self.hash_password(new_user.password).await?;
        let user = User::new(new_user.email, new_user.username);
        self.store.create_user(user.clone(), hash)?;

        tracing::info!(email = %user.email, username = %user.username, "user registered");
        self.session(user)
    }

    /// Check a password and sign the user in.
    pub async fn login(&self, request: LoginRequest) -> Result<UserSession> {
        let email = Email::new(request.email);
        let hash = self.store.password_hash(&email)?;

        if let Err(e) = self.verify_password(hash, request.password).await {
            if matches!(e, BlogError::InvalidCredential) {
                tracing::warn!(%email, "login rejected");
            }
            return Err(e);
        }

        let user = self.store.user_by_email(&email)?;
        self.session(user)
    }

    /// Resolve an identity token to the email it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<Email> {
        self.tokens.validate(token).map_err(|e| {
            tracing::warn!(error = %e, "token rejected");
            e
        })
    }

    /// The signed-in user, with a refreshed token.
    pub fn current_user(&self, email: &Email) -> Result<UserSession> {
        let user = self.store.user_by_email(email)?;
        self.session(user)
    }

    /// Apply profile changes to the signed-in user.
    ///
    /// The returned token is issued for the user's email after the change.
    pub async fn update_user(&self, email: &Email, changes: UserChanges) -> Result<UserSession> {
        if let Some(new_email) = &changes.email {
            validate_email(new_email.as_str())?;
        }
        if let Some(new_username) = &changes.username {
            if new_username.as_str().trim().is_empty() {
                return Err(ValidationError::Blank("username").into());
            }
        }

        let password_hash = match changes.password {
            Some(password) if password.trim().is_empty() => {
                return Err(ValidationError::Blank("password").into());
            }
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let update = UserUpdate {
            email: changes.email,
            username: changes.username,
            bio: changes.bio,
            image: changes.image,
            password_hash,
        };
        if update.is_empty() {
            return self.current_user(email);
        }
        let user = self.store.update_user(email, &update)?;
        self.session(user)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profiles
    // ─────────────────────────────────────────────────────────────────────────

    /// A user's profile as seen by `viewer`.
    pub fn profile(&self, viewer: Option<&Email>, username: &Username) -> Result<Profile> {
        let viewer = self.viewer_name(viewer)?;
        let user = self.store.user_by_username(username)?;
        self.decorate_profile(viewer.as_ref(), user.profile())
    }

    /// Follow `username`.
    pub fn follow(&self, viewer: &Email, username: &Username) -> Result<Profile> {
        let follower = self.store.username_of(viewer)?;
        self.store.follow(&follower, username)?;
        self.profile(Some(viewer), username)
    }

    /// Stop following `username`.
    pub fn unfollow(&self, viewer: &Email, username: &Username) -> Result<Profile> {
        let follower = self.store.username_of(viewer)?;
        self.store.unfollow(&follower, username)?;
        self.profile(Some(viewer), username)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Articles
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish an article under a slug derived from its title.
    ///
    /// The slug is chosen outside the store lock, so another writer can take
    /// it before the insert. A lost race is retried with a fresh slug, up to
    /// `slug_attempts` times. The author snapshot is taken by the store.
    pub fn create_article(&self, author: &Email, new_article: NewArticle) -> Result<ArticleView> {
        validate_new_article(&new_article)?;
        let profile = self.store.user_by_email(author)?.profile();
        let attempts = self.config.slug_attempts.max(1);

        let mut attempt = 1;
        loop {
            let slug = unique_slug(&new_article.title, |s| self.store.slug_exists(s))?;
            let now = Utc::now();
            let article = Article {
                slug: slug.clone(),
                title: new_article.title.clone(),
                description: new_article.description.clone(),
                body: new_article.body.clone(),
                tag_list: new_article.tag_list.clone(),
                created_at: now,
                updated_at: now,
                favorites_count: 0,
                author: profile.clone(),
            };

            match self.store.publish_article(author, article) {
                Ok(article) => {
                    tracing::info!(%slug, author = %article.author.username, "article published");
                    return Ok(ArticleView {
                        article,
                        favorited: false,
                    });
                }
                Err(e) if e.is_conflict() && attempt < attempts => {
                    tracing::debug!(%slug, attempt, "slug taken concurrently, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// A single article.
    pub fn article(&self, viewer: Option<&Email>, slug: &Slug) -> Result<ArticleView> {
        let viewer = self.viewer_name(viewer)?;
        let article = self.store.article(slug)?;
        self.decorate_article(viewer.as_ref(), article)
    }

    /// Articles matching `filter`.
    pub fn list_articles(
        &self,
        viewer: Option<&Email>,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<Page<ArticleView>> {
        let viewer = self.viewer_name(viewer)?;
        self.store
            .list_articles(filter, page)?
            .try_map(|article| self.decorate_article(viewer.as_ref(), article))
    }

    /// Articles by the users `viewer` follows.
    pub fn feed(&self, viewer: &Email, page: PageRequest) -> Result<Page<ArticleView>> {
        let username = self.store.username_of(viewer)?;
        self.store
            .feed(&username, page)?
            .try_map(|article| self.decorate_article(Some(&username), article))
    }

    /// Edit an article's text. Only its author may.
    pub fn update_article(
        &self,
        editor: &Email,
        slug: &Slug,
        update: &ArticleUpdate,
    ) -> Result<ArticleView> {
        let article = self.store.update_own_article(editor, slug, update)?;
        let editor = self.store.username_of(editor)?;
        self.decorate_article(Some(&editor), article)
    }

    /// Delete an article with its comments and favorites. Only its author may.
    pub fn delete_article(&self, editor: &Email, slug: &Slug) -> Result<()> {
        self.store.delete_own_article(editor, slug)?;
        tracing::info!(%slug, "article deleted");
        Ok(())
    }

    /// Favorite an article.
    pub fn favorite(&self, viewer: &Email, slug: &Slug) -> Result<ArticleView> {
        let username = self.store.username_of(viewer)?;
        self.store.favorite(slug, &username)?;
        let article = self.store.article(slug)?;
        self.decorate_article(Some(&username), article)
    }

    /// Remove a favorite.
    pub fn unfavorite(&self, viewer: &Email, slug: &Slug) -> Result<ArticleView> {
        let username = self.store.username_of(viewer)?;
        self.store.unfavorite(slug, &username)?;
        let article = self.store.article(slug)?;
        self.decorate_article(Some(&username), article)
    }

    /// Every tag ever used.
    pub fn tags(&self) -> Result<Vec<String>> {
        Ok(self.store.tags()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Comments
    // ─────────────────────────────────────────────────────────────────────────

    /// Comment on an article.
    pub fn add_comment(&self, author: &Email, slug: &Slug, body: &str) -> Result<Comment> {
        if body.trim().is_empty() {
            return Err(ValidationError::Blank("body").into());
        }
        let profile = self.store.user_by_email(author)?.profile();
        Ok(self.store.post_comment(author, slug, Comment::new(body, profile))?)
    }

    /// Comments on an article, oldest id first.
    pub fn comments(&self, viewer: Option<&Email>, slug: &Slug) -> Result<Vec<Comment>> {
        let viewer = self.viewer_name(viewer)?;
        self.store
            .comments(slug)?
            .into_iter()
            .map(|mut comment| {
                comment.author = self.decorate_profile(viewer.as_ref(), comment.author)?;
                Ok(comment)
            })
            .collect()
    }

    /// Delete a comment. Only its author may.
    pub fn delete_comment(&self, editor: &Email, slug: &Slug, id: CommentId) -> Result<()> {
        self.store.delete_own_comment(editor, slug, id)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn session(&self, user: User) -> Result<UserSession> {
        let token = self.tokens.issue(&user.email)?;
        Ok(UserSession { user, token })
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let credentials = Arc::clone(&self.credentials);
        tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| BlogError::Task(e.to_string()))?
    }

    async fn verify_password(&self, secret: String, password: String) -> Result<()> {
        let credentials = Arc::clone(&self.credentials);
        tokio::task::spawn_blocking(move || credentials.verify(&secret, &password))
            .await
            .map_err(|e| BlogError::Task(e.to_string()))?
    }

    fn viewer_name(&self, viewer: Option<&Email>) -> Result<Option<Username>> {
        viewer
            .map(|email| self.store.username_of(email))
            .transpose()
            .map_err(BlogError::from)
    }

    fn decorate_profile(&self, viewer: Option<&Username>, mut profile: Profile) -> Result<Profile> {
        profile.following = match viewer {
            Some(viewer) => self.store.is_following(viewer, &profile.username)?,
            None => false,
        };
        Ok(profile)
    }

    fn decorate_article(
        &self,
        viewer: Option<&Username>,
        mut article: Article,
    ) -> Result<ArticleView> {
        let favorited = match viewer {
            Some(viewer) => self.store.is_favorite(&article.slug, viewer)?,
            None => false,
        };
        article.author = self.decorate_profile(viewer, article.author)?;
        Ok(ArticleView { article, favorited })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_store::MemoryStore;

    /// Stores passwords reversed; enough to exercise the flow without scrypt.
    struct ReversedCredentials;

    impl Credentials for ReversedCredentials {
        fn hash(&self, password: &str) -> Result<String> {
            Ok(password.chars().rev().collect())
        }

        fn verify(&self, secret: &str, password: &str) -> Result<()> {
            if secret.chars().rev().eq(password.chars()) {
                Ok(())
            } else {
                Err(BlogError::InvalidCredential)
            }
        }
    }

    fn blog() -> Blog<MemoryStore, ReversedCredentials> {
        Blog::new(MemoryStore::new(), ReversedCredentials, BlogConfig::default())
    }

    async fn register(blog: &Blog<MemoryStore, ReversedCredentials>, name: &str) -> Email {
        blog.register(NewUser {
            username: name.into(),
            email: format!("{}@x.com", name),
            password: format!("{}-pw", name),
        })
        .await
        .unwrap()
        .user
        .email
    }

    fn new_article(title: &str, tags: &[&str]) -> NewArticle {
        NewArticle {
            title: title.into(),
            description: "description".into(),
            body: "body".into(),
            tag_list: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let blog = blog();
        let session = blog
            .register(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(blog.authenticate(&session.token).unwrap(), session.user.email);
        assert_eq!(blog.store().password_hash(&session.user.email).unwrap(), "terces");

        let login = blog
            .login(LoginRequest {
                email: "alice@x.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(login.user, session.user);

        let wrong = blog
            .login(LoginRequest {
                email: "alice@x.com".into(),
                password: "nope".into(),
            })
            .await;
        assert!(matches!(wrong, Err(BlogError::InvalidCredential)));

        let unknown = blog
            .login(LoginRequest {
                email: "ghost@x.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap_err();
        assert!(unknown.is_not_found());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let blog = blog();
        register(&blog, "alice").await;

        let dup = blog
            .register(NewUser {
                username: "alice".into(),
                email: "other@x.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(dup.is_conflict());

        let invalid = blog
            .register(NewUser {
                username: "bob".into(),
                email: "not-an-email".into(),
                password: "pw".into(),
            })
            .await;
        assert!(matches!(invalid, Err(BlogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_and_reissues() {
        let blog = blog();
        let email = register(&blog, "alice").await;

        let session = blog
            .update_user(
                &email,
                UserChanges {
                    email: Some(Email::new("ally@x.com")),
                    password: Some("fresh".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(session.user.email, "ally@x.com");
        assert_eq!(blog.authenticate(&session.token).unwrap(), "ally@x.com");
        blog.login(LoginRequest {
            email: "ally@x.com".into(),
            password: "fresh".into(),
        })
        .await
        .unwrap();

        let blank = blog
            .update_user(
                &session.user.email,
                UserChanges {
                    password: Some("  ".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(blank, Err(BlogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_slug_collisions_get_suffixes() {
        let blog = blog();
        let alice = register(&blog, "alice").await;

        let first = blog
            .create_article(&alice, new_article("Hello World", &[]))
            .unwrap();
        let second = blog
            .create_article(&alice, new_article("Hello World", &[]))
            .unwrap();

        assert_eq!(first.article.slug, "hello-world");
        assert_eq!(second.article.slug, "hello-world-1");
    }

    #[tokio::test]
    async fn test_viewer_fields() {
        let blog = blog();
        let alice = register(&blog, "alice").await;
        let bob = register(&blog, "bob").await;
        let slug = blog
            .create_article(&alice, new_article("Post", &["rust"]))
            .unwrap()
            .article
            .slug;

        blog.follow(&bob, &Username::new("alice")).unwrap();
        let view = blog.favorite(&bob, &slug).unwrap();
        assert!(view.favorited);
        assert!(view.article.author.following);
        assert_eq!(view.article.favorites_count, 1);

        let anonymous = blog.article(None, &slug).unwrap();
        assert!(!anonymous.favorited);
        assert!(!anonymous.article.author.following);

        let profile = blog.unfollow(&bob, &Username::new("alice")).unwrap();
        assert!(!profile.following);

        let view = blog.unfavorite(&bob, &slug).unwrap();
        assert!(!view.favorited);
        assert_eq!(view.article.favorites_count, 0);
    }

    #[tokio::test]
    async fn test_only_author_edits() {
        let blog = blog();
        let alice = register(&blog, "alice").await;
        let bob = register(&blog, "bob").await;
        let slug = blog
            .create_article(&alice, new_article("Post", &[]))
            .unwrap()
            .article
            .slug;
        let update = ArticleUpdate {
            body: Some("hijacked".into()),
            ..Default::default()
        };

        assert!(matches!(
            blog.update_article(&bob, &slug, &update),
            Err(BlogError::Forbidden(_))
        ));
        assert!(matches!(
            blog.delete_article(&bob, &slug),
            Err(BlogError::Forbidden(_))
        ));

        let comment = blog.add_comment(&alice, &slug, "mine").unwrap();
        assert!(matches!(
            blog.delete_comment(&bob, &slug, comment.id),
            Err(BlogError::Forbidden(_))
        ));

        let edited = blog.update_article(&alice, &slug, &update).unwrap();
        assert_eq!(edited.article.body, "hijacked");
        blog.delete_comment(&alice, &slug, comment.id).unwrap();
        blog.delete_article(&alice, &slug).unwrap();
        assert!(blog.article(None, &slug).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_recycled_username_is_not_the_author() {
        let blog = blog();
        let bob = register(&blog, "bob").await;
        let slug = blog
            .create_article(&bob, new_article("Post", &[]))
            .unwrap()
            .article
            .slug;
        let comment = blog.add_comment(&bob, &slug, "first").unwrap();

        blog.update_user(
            &bob,
            UserChanges {
                username: Some(Username::new("robert")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let mallory = blog
            .register(NewUser {
                username: "bob".into(),
                email: "mallory@x.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap()
            .user
            .email;

        let update = ArticleUpdate {
            body: Some("hijacked".into()),
            ..Default::default()
        };
        assert!(matches!(
            blog.update_article(&mallory, &slug, &update),
            Err(BlogError::Forbidden(_))
        ));
        assert!(matches!(
            blog.delete_comment(&mallory, &slug, comment.id),
            Err(BlogError::Forbidden(_))
        ));
        assert!(matches!(
            blog.delete_article(&mallory, &slug),
            Err(BlogError::Forbidden(_))
        ));

        let mine = ArticleUpdate {
            body: Some("still mine".into()),
            ..Default::default()
        };
        let edited = blog.update_article(&bob, &slug, &mine).unwrap();
        assert_eq!(edited.article.body, "still mine");
        blog.delete_comment(&bob, &slug, comment.id).unwrap();
        blog.delete_article(&bob, &slug).unwrap();
    }

    #[tokio::test]
    async fn test_new_content_carries_current_username() {
        let blog = blog();
        let bob = register(&blog, "bob").await;
        blog.update_user(
            &bob,
            UserChanges {
                username: Some(Username::new("robert")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let view = blog.create_article(&bob, new_article("Post", &[])).unwrap();
        assert_eq!(view.article.author.username, "robert");
        let comment = blog.add_comment(&bob, &view.article.slug, "hi").unwrap();
        assert_eq!(comment.author.username, "robert");
        assert_eq!(comment.id, CommentId(1));
    }

    #[tokio::test]
    async fn test_empty_update_reissues_session() {
        let blog = blog();
        let email = register(&blog, "alice").await;

        let session = blog
            .update_user(&email, UserChanges::default())
            .await
            .unwrap();
        assert_eq!(session.user.username, "alice");
        assert_eq!(blog.authenticate(&session.token).unwrap(), email);
    }

    #[tokio::test]
    async fn test_comments_flow() {
        let blog = blog();
        let alice = register(&blog, "alice").await;
        let bob = register(&blog, "bob").await;
        let slug = blog
            .create_article(&alice, new_article("Post", &[]))
            .unwrap()
            .article
            .slug;

        let first = blog.add_comment(&bob, &slug, "nice").unwrap();
        let second = blog.add_comment(&alice, &slug, "thanks").unwrap();
        assert_eq!((first.id, second.id), (CommentId(1), CommentId(2)));

        blog.follow(&alice, &Username::new("bob")).unwrap();
        let seen_by_alice = blog.comments(Some(&alice), &slug).unwrap();
        assert!(seen_by_alice[0].author.following);
        assert!(!seen_by_alice[1].author.following);

        assert!(matches!(
            blog.add_comment(&bob, &slug, " "),
            Err(BlogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_feed_and_listing() {
        let blog = blog();
        let alice = register(&blog, "alice").await;
        let bob = register(&blog, "bob").await;
        blog.create_article(&alice, new_article("A one", &["rust"]))
            .unwrap();
        blog.create_article(&alice, new_article("A two", &["go"]))
            .unwrap();

        assert_eq!(blog.feed(&bob, PageRequest::default()).unwrap(), Page::empty());

        blog.follow(&bob, &Username::new("alice")).unwrap();
        let feed = blog.feed(&bob, PageRequest::default()).unwrap();
        assert_eq!(feed.total_count, 2);
        assert!(feed.items.iter().all(|v| v.article.author.following));

        let rust = blog
            .list_articles(Some(&bob), &ArticleFilter::new().tag("rust"), PageRequest::default())
            .unwrap();
        assert_eq!(rust.total_count, 1);
        assert_eq!(blog.tags().unwrap(), vec!["go", "rust"]);
    }

    #[tokio::test]
    async fn test_unknown_viewer_is_not_found() {
        let blog = blog();
        let err = blog
            .profile(Some(&Email::new("ghost@x.com")), &Username::new("alice"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_session_serializes_flat() {
        let session = UserSession {
            user: User::new("alice@x.com", "alice"),
            token: "t".into(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["email"], "alice@x.com");
        assert_eq!(json["token"], "t");
    }
}
