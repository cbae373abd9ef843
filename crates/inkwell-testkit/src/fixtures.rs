//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use chrono::Utc;

use inkwell::{Blog, BlogConfig, BlogError, Credentials, NewUser};
use inkwell_core::{Article, Email, NewArticle, Slug, User, Username};
use inkwell_store::{MemoryStore, Store};

/// Credentials that store the password as-is behind a marker prefix.
///
/// scrypt is slow by construction; most tests only need the register and
/// login flow to round-trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCredentials;

const PLAIN_PREFIX: &str = "plain$";

impl Credentials for PlainCredentials {
    fn hash(&self, password: &str) -> inkwell::Result<String> {
        Ok(format!("{}{}", PLAIN_PREFIX, password))
    }

    fn verify(&self, secret: &str, password: &str) -> inkwell::Result<()> {
        match secret.strip_prefix(PLAIN_PREFIX) {
            Some(stored) if stored == password => Ok(()),
            Some(_) => Err(BlogError::InvalidCredential),
            None => Err(BlogError::Credential(format!("not a plain secret: {}", secret))),
        }
    }
}

/// A blog over a fresh memory store.
pub struct TestFixture {
    pub blog: Blog<MemoryStore, PlainCredentials>,
}

impl TestFixture {
    /// Create a new test fixture with the default config.
    pub fn new() -> Self {
        Self::with_config(BlogConfig::default())
    }

    /// Create with a specific config.
    pub fn with_config(config: BlogConfig) -> Self {
        Self {
            blog: Blog::new(MemoryStore::new(), PlainCredentials, config),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &MemoryStore {
        self.blog.store()
    }

    /// Register `name` as `name@example.com` with password `name-password`.
    ///
    /// Panics if registration fails.
    pub async fn register(&self, name: &str) -> Email {
        self.blog
            .register(NewUser {
                username: name.to_string(),
                email: email_for(name),
                password: password_for(name),
            })
            .await
            .unwrap_or_else(|e| panic!("registering {}: {}", name, e))
            .user
            .email
    }

    /// Publish an article and return its slug.
    ///
    /// Panics if publishing fails.
    pub fn publish(&self, author: &Email, title: &str, tags: &[&str]) -> Slug {
        self.blog
            .create_article(author, new_article(title, tags))
            .unwrap_or_else(|e| panic!("publishing {:?}: {}", title, e))
            .article
            .slug
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The email [`TestFixture::register`] uses for `name`.
pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name)
}

/// The password [`TestFixture::register`] uses for `name`.
pub fn password_for(name: &str) -> String {
    format!("{}-password", name)
}

/// Article input with filler description and body.
pub fn new_article(title: &str, tags: &[&str]) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        description: format!("about {}", title),
        body: format!("{} body", title),
        tag_list: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// A stored article with an explicit slug, for seeding a store directly.
pub fn article(slug: &str, author: &User, tags: &[&str]) -> Article {
    let now = Utc::now();
    Article {
        slug: Slug::new(slug),
        title: slug.to_string(),
        description: String::new(),
        body: String::new(),
        tag_list: tags.iter().map(|t| t.to_string()).collect(),
        created_at: now,
        updated_at: now,
        favorites_count: 0,
        author: author.profile(),
    }
}

/// A memory store holding one user per name, keyed by [`email_for`].
///
/// Panics if a name repeats.
pub fn seeded_store(names: &[&str]) -> MemoryStore {
    let store = MemoryStore::new();
    for name in names {
        store
            .create_user(User::new(email_for(name), *name), password_for(name))
            .unwrap_or_else(|e| panic!("seeding {}: {}", name, e));
    }
    store
}

/// Look up a seeded user by name.
pub fn seeded_user(store: &MemoryStore, name: &str) -> User {
    store
        .user_by_username(&Username::new(name))
        .unwrap_or_else(|e| panic!("seeded user {}: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::LoginRequest;

    #[tokio::test]
    async fn test_fixture_register_and_login() {
        let fixture = TestFixture::new();
        let email = fixture.register("alice").await;
        assert_eq!(email, "alice@example.com");

        let session = fixture
            .blog
            .login(LoginRequest {
                email: email_for("alice"),
                password: password_for("alice"),
            })
            .await
            .unwrap();
        assert_eq!(session.user.username, "alice");
    }

    #[tokio::test]
    async fn test_fixture_publish() {
        let fixture = TestFixture::new();
        let alice = fixture.register("alice").await;

        assert_eq!(fixture.publish(&alice, "Hello World", &[]), "hello-world");
        assert_eq!(fixture.publish(&alice, "Hello World", &[]), "hello-world-1");
    }

    #[test]
    fn test_plain_credentials() {
        let secret = PlainCredentials.hash("pw").unwrap();
        PlainCredentials.verify(&secret, "pw").unwrap();
        assert!(matches!(
            PlainCredentials.verify(&secret, "other"),
            Err(BlogError::InvalidCredential)
        ));
        assert!(matches!(
            PlainCredentials.verify("pw", "pw"),
            Err(BlogError::Credential(_))
        ));
    }

    #[test]
    fn test_seeded_store() {
        let store = seeded_store(&["alice", "bob"]);
        assert_eq!(store.stats().unwrap().users, 2);

        let alice = seeded_user(&store, "alice");
        store.create_article(article("a", &alice, &["x"])).unwrap();
        assert_eq!(store.tags().unwrap(), vec!["x"]);
    }
}
