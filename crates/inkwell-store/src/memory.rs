//! In-memory implementation of the Store trait.
//!
//! All state lives behind a single `RwLock`: queries share it, anything that
//! creates, updates or deletes takes it exclusively. Every write checks all of
//! its preconditions before the first mutation, so a rejected call leaves no
//! trace. Nothing is persisted.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use inkwell_core::{
    Article, ArticleFilter, ArticleUpdate, Comment, CommentId, Email, Page, PageRequest, Profile,
    Slug, User, UserUpdate, Username,
};

use crate::error::{Entity, Result, StoreError, UniqueKey};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Users indexed by email.
    users: HashMap<Email, StoredUser>,

    /// Secondary index: username -> email.
    usernames: HashMap<Username, Email>,

    /// Articles indexed by slug. Ordered, which fixes listing order.
    articles: BTreeMap<Slug, Article>,

    /// Comments per article slug, ordered by id.
    comments: HashMap<Slug, BTreeMap<CommentId, Comment>>,

    /// Owning user of each article, by email. Author snapshots keep the
    /// name used at publish time; this follows the account.
    article_owners: HashMap<Slug, Email>,

    /// Owning user of each comment, per article slug.
    comment_owners: HashMap<Slug, HashMap<CommentId, Email>>,

    /// Follow edges: follower -> followed usernames.
    follows: HashMap<Username, HashSet<Username>>,

    /// Favorite edges: slug -> usernames.
    favorites: HashMap<Slug, HashSet<Username>>,

    /// Every tag ever attached to an article. Never shrinks.
    tags: BTreeSet<String>,
}

struct StoredUser {
    user: User,
    password_hash: String,
}

/// Edge count as stored on an article, saturating at `u32::MAX`.
fn saturating_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Entity and edge counts, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub users: usize,
    pub articles: usize,
    pub comments: usize,
    pub follows: usize,
    pub favorites: usize,
    pub tags: usize,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Count everything currently held.
    pub fn stats(&self) -> Result<StoreStats> {
        let inner = self.read()?;
        Ok(StoreStats {
            users: inner.users.len(),
            articles: inner.articles.len(),
            comments: inner.comments.values().map(BTreeMap::len).sum(),
            follows: inner.follows.values().map(HashSet::len).sum(),
            favorites: inner.favorites.values().map(HashSet::len).sum(),
            tags: inner.tags.len(),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    fn require_user(&self, username: &Username) -> Result<()> {
        if self.usernames.contains_key(username) {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::User, username))
        }
    }

    fn require_email(&self, email: &Email) -> Result<()> {
        if self.users.contains_key(email) {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::User, email))
        }
    }

    /// Email of the account currently holding `username`.
    fn email_of(&self, username: &Username) -> Result<Email> {
        self.usernames
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::User, username))
    }

    fn profile_of(&self, email: &Email) -> Result<Profile> {
        self.users
            .get(email)
            .map(|stored| stored.user.profile())
            .ok_or_else(|| StoreError::not_found(Entity::User, email))
    }

    fn require_article(&self, slug: &Slug) -> Result<()> {
        if self.articles.contains_key(slug) {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::Article, slug))
        }
    }

    fn require_article_owner(&self, slug: &Slug, editor: &Email) -> Result<()> {
        self.require_email(editor)?;
        match self.article_owners.get(slug) {
            None => Err(StoreError::not_found(Entity::Article, slug)),
            Some(owner) if owner == editor => Ok(()),
            Some(_) => Err(StoreError::not_owner(Entity::Article, slug)),
        }
    }

    fn require_comment_owner(&self, slug: &Slug, id: CommentId, editor: &Email) -> Result<()> {
        self.require_email(editor)?;
        self.require_article(slug)?;
        let key = || format!("{}#{}", slug, id);
        match self.comment_owners.get(slug).and_then(|owners| owners.get(&id)) {
            None => Err(StoreError::not_found(Entity::Comment, key())),
            Some(owner) if owner == editor => Ok(()),
            Some(_) => Err(StoreError::not_owner(Entity::Comment, key())),
        }
    }

    /// Recompute the stored favorite counter from the edge set.
    fn sync_favorites_count(&mut self, slug: &Slug) {
        let count = self.favorites.get(slug).map_or(0, HashSet::len);
        if let Some(article) = self.articles.get_mut(slug) {
            article.favorites_count = saturating_count(count);
        }
    }

    /// Hand every article and comment owned by `old` to `new`.
    fn reassign_owner(&mut self, old: &Email, new: &Email) {
        for owner in self.article_owners.values_mut() {
            if owner == old {
                *owner = new.clone();
            }
        }
        for owners in self.comment_owners.values_mut() {
            for owner in owners.values_mut() {
                if owner == old {
                    *owner = new.clone();
                }
            }
        }
    }

    fn insert_article(&mut self, owner: Email, article: Article) -> Result<()> {
        if self.articles.contains_key(&article.slug) {
            return Err(StoreError::conflict(UniqueKey::Slug, &article.slug));
        }

        let slug = article.slug.clone();
        self.tags.extend(article.tag_list.iter().cloned());
        self.comments.insert(slug.clone(), BTreeMap::new());
        self.comment_owners.insert(slug.clone(), HashMap::new());
        self.favorites.insert(slug.clone(), HashSet::new());
        self.articles.insert(slug.clone(), article);
        self.sync_favorites_count(&slug);

        tracing::debug!(%slug, %owner, "article created");
        self.article_owners.insert(slug, owner);
        Ok(())
    }

    fn apply_article_update(&mut self, slug: &Slug, update: &ArticleUpdate) -> Result<Article> {
        let article = self
            .articles
            .get_mut(slug)
            .ok_or_else(|| StoreError::not_found(Entity::Article, slug))?;

        article.apply(update);
        tracing::debug!(%slug, "article updated");
        Ok(article.clone())
    }

    fn remove_article(&mut self, slug: &Slug) -> Result<()> {
        if self.articles.remove(slug).is_none() {
            return Err(StoreError::not_found(Entity::Article, slug));
        }

        self.article_owners.remove(slug);
        self.comment_owners.remove(slug);
        let comments = self.comments.remove(slug).map_or(0, |c| c.len());
        let favorites = self.favorites.remove(slug).map_or(0, |f| f.len());

        tracing::debug!(%slug, comments, favorites, "article deleted");
        Ok(())
    }

    fn insert_comment(
        &mut self,
        owner: Email,
        slug: &Slug,
        mut comment: Comment,
    ) -> Result<CommentId> {
        self.require_article(slug)?;

        let comments = self.comments.entry(slug.clone()).or_default();

        // Ids follow the live count, so the highest id can come back after a
        // delete. A surviving comment is never overwritten.
        let mut id = CommentId(comments.len() as u64 + 1);
        while comments.contains_key(&id) {
            id = id.next();
        }

        comment.id = id;
        comments.insert(id, comment);
        self.comment_owners
            .entry(slug.clone())
            .or_default()
            .insert(id, owner);

        tracing::debug!(%slug, %id, "comment added");
        Ok(id)
    }

    fn remove_comment(&mut self, slug: &Slug, id: CommentId) -> Result<()> {
        self.require_article(slug)?;

        let removed = self
            .comments
            .get_mut(slug)
            .and_then(|comments| comments.remove(&id));
        if removed.is_none() {
            return Err(StoreError::not_found(
                Entity::Comment,
                format!("{}#{}", slug, id),
            ));
        }
        if let Some(owners) = self.comment_owners.get_mut(slug) {
            owners.remove(&id);
        }

        tracing::debug!(%slug, %id, "comment deleted");
        Ok(())
    }

    /// Move every follow and favorite edge from `old` to `new`.
    fn rename_edges(&mut self, old: &Username, new: &Username) {
        if let Some(outbound) = self.follows.remove(old) {
            self.follows.insert(new.clone(), outbound);
        }
        for followed in self.follows.values_mut() {
            if followed.remove(old) {
                followed.insert(new.clone());
            }
        }
        for fans in self.favorites.values_mut() {
            if fans.remove(old) {
                fans.insert(new.clone());
            }
        }
    }

    fn matches(&self, article: &Article, filter: &ArticleFilter) -> bool {
        if let Some(tag) = filter.tag_constraint() {
            if !article.has_tag(tag) {
                return false;
            }
        }
        if let Some(author) = filter.author_constraint() {
            let owner = self.usernames.get(author);
            if owner.is_none() || self.article_owners.get(&article.slug) != owner {
                return false;
            }
        }
        if let Some(fan) = filter.favorited_constraint() {
            let favorited = self
                .favorites
                .get(&article.slug)
                .is_some_and(|fans| fans.contains(fan));
            if !favorited {
                return false;
            }
        }
        true
    }
}

impl Store for MemoryStore {
    fn create_user(&self, user: User, password_hash: String) -> Result<()> {
        let mut inner = self.write()?;

        if inner.users.contains_key(&user.email) {
            return Err(StoreError::conflict(UniqueKey::Email, &user.email));
        }
        if inner.usernames.contains_key(&user.username) {
            return Err(StoreError::conflict(UniqueKey::Username, &user.username));
        }

        tracing::debug!(email = %user.email, username = %user.username, "user created");
        inner
            .usernames
            .insert(user.username.clone(), user.email.clone());
        inner.users.insert(
            user.email.clone(),
            StoredUser {
                user,
                password_hash,
            },
        );
        Ok(())
    }

    fn user_by_email(&self, email: &Email) -> Result<User> {
        let inner = self.read()?;
        inner
            .users
            .get(email)
            .map(|stored| stored.user.clone())
            .ok_or_else(|| StoreError::not_found(Entity::User, email))
    }

    fn user_by_username(&self, username: &Username) -> Result<User> {
        let inner = self.read()?;
        inner
            .usernames
            .get(username)
            .and_then(|email| inner.users.get(email))
            .map(|stored| stored.user.clone())
            .ok_or_else(|| StoreError::not_found(Entity::User, username))
    }

    fn password_hash(&self, email: &Email) -> Result<String> {
        let inner = self.read()?;
        inner
            .users
            .get(email)
            .map(|stored| stored.password_hash.clone())
            .ok_or_else(|| StoreError::not_found(Entity::User, email))
    }

    fn update_user(&self, email: &Email, update: &UserUpdate) -> Result<User> {
        let mut inner = self.write()?;

        let old_username = match inner.users.get(email) {
            Some(stored) => stored.user.username.clone(),
            None => return Err(StoreError::not_found(Entity::User, email)),
        };
        let new_email = update.email.as_ref().filter(|e| *e != email);
        let new_username = update.username.as_ref().filter(|u| **u != old_username);

        // Check both keys before touching anything.
        if let Some(new_email) = new_email {
            if inner.users.contains_key(new_email) {
                return Err(StoreError::conflict(UniqueKey::Email, new_email));
            }
        }
        if let Some(new_username) = new_username {
            if inner.usernames.contains_key(new_username) {
                return Err(StoreError::conflict(UniqueKey::Username, new_username));
            }
        }

        let Some(mut stored) = inner.users.remove(email) else {
            return Err(StoreError::not_found(Entity::User, email));
        };

        if let Some(new_email) = new_email {
            inner.reassign_owner(email, new_email);
            stored.user.email = new_email.clone();
        }
        if let Some(new_username) = new_username {
            inner.usernames.remove(&old_username);
            inner.rename_edges(&old_username, new_username);
            stored.user.username = new_username.clone();
        }
        stored.user.apply_profile_fields(update);
        if let Some(hash) = &update.password_hash {
            stored.password_hash = hash.clone();
        }

        inner
            .usernames
            .insert(stored.user.username.clone(), stored.user.email.clone());
        let user = stored.user.clone();
        inner.users.insert(user.email.clone(), stored);

        tracing::debug!(email = %user.email, username = %user.username, "user updated");
        Ok(user)
    }

    fn create_article(&self, article: Article) -> Result<()> {
        let mut inner = self.write()?;
        let owner = inner.email_of(&article.author.username)?;
        inner.insert_article(owner, article)
    }

    fn publish_article(&self, author: &Email, mut article: Article) -> Result<Article> {
        let mut inner = self.write()?;
        article.author = inner.profile_of(author)?;
        inner.insert_article(author.clone(), article.clone())?;
        Ok(article)
    }

    fn article(&self, slug: &Slug) -> Result<Article> {
        let inner = self.read()?;
        inner
            .articles
            .get(slug)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::Article, slug))
    }

    fn update_article(&self, slug: &Slug, update: &ArticleUpdate) -> Result<Article> {
        self.write()?.apply_article_update(slug, update)
    }

    fn delete_article(&self, slug: &Slug) -> Result<()> {
        self.write()?.remove_article(slug)
    }

    fn update_own_article(
        &self,
        editor: &Email,
        slug: &Slug,
        update: &ArticleUpdate,
    ) -> Result<Article> {
        let mut inner = self.write()?;
        inner.require_article_owner(slug, editor)?;
        inner.apply_article_update(slug, update)
    }

    fn delete_own_article(&self, editor: &Email, slug: &Slug) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_article_owner(slug, editor)?;
        inner.remove_article(slug)
    }

    fn list_articles(&self, filter: &ArticleFilter, page: PageRequest) -> Result<Page<Article>> {
        let inner = self.read()?;
        let matching: Vec<&Article> = inner
            .articles
            .values()
            .filter(|article| inner.matches(article, filter))
            .collect();

        Ok(page.apply(matching).map(Article::clone))
    }

    fn tags(&self) -> Result<Vec<String>> {
        let inner = self.read()?;
        Ok(inner.tags.iter().cloned().collect())
    }

    fn add_comment(&self, slug: &Slug, comment: Comment) -> Result<CommentId> {
        let mut inner = self.write()?;
        inner.require_article(slug)?;
        let owner = inner.email_of(&comment.author.username)?;
        inner.insert_comment(owner, slug, comment)
    }

    fn post_comment(&self, author: &Email, slug: &Slug, mut comment: Comment) -> Result<Comment> {
        let mut inner = self.write()?;
        inner.require_article(slug)?;
        comment.author = inner.profile_of(author)?;
        comment.id = inner.insert_comment(author.clone(), slug, comment.clone())?;
        Ok(comment)
    }

    fn comments(&self, slug: &Slug) -> Result<Vec<Comment>> {
        let inner = self.read()?;
        inner.require_article(slug)?;
        Ok(inner
            .comments
            .get(slug)
            .map(|comments| comments.values().cloned().collect())
            .unwrap_or_default())
    }

    fn comment(&self, slug: &Slug, id: CommentId) -> Result<Comment> {
        let inner = self.read()?;
        inner.require_article(slug)?;
        inner
            .comments
            .get(slug)
            .and_then(|comments| comments.get(&id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::Comment, format!("{}#{}", slug, id)))
    }

    fn delete_comment(&self, slug: &Slug, id: CommentId) -> Result<()> {
        self.write()?.remove_comment(slug, id)
    }

    fn delete_own_comment(&self, editor: &Email, slug: &Slug, id: CommentId) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_comment_owner(slug, id, editor)?;
        inner.remove_comment(slug, id)
    }

    fn follow(&self, follower: &Username, followed: &Username) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_user(follower)?;
        inner.require_user(followed)?;

        inner
            .follows
            .entry(follower.clone())
            .or_default()
            .insert(followed.clone());

        tracing::debug!(%follower, %followed, "follow edge added");
        Ok(())
    }

    fn unfollow(&self, follower: &Username, followed: &Username) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_user(follower)?;
        inner.require_user(followed)?;

        if let Some(edges) = inner.follows.get_mut(follower) {
            if edges.remove(followed) {
                tracing::debug!(%follower, %followed, "follow edge removed");
            }
        }
        Ok(())
    }

    fn is_following(&self, follower: &Username, followed: &Username) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner
            .follows
            .get(follower)
            .is_some_and(|edges| edges.contains(followed)))
    }

    fn favorite(&self, slug: &Slug, username: &Username) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_article(slug)?;
        inner.require_user(username)?;

        inner
            .favorites
            .entry(slug.clone())
            .or_default()
            .insert(username.clone());
        inner.sync_favorites_count(slug);

        tracing::debug!(%slug, %username, "favorite edge added");
        Ok(())
    }

    fn unfavorite(&self, slug: &Slug, username: &Username) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_article(slug)?;
        inner.require_user(username)?;

        if let Some(fans) = inner.favorites.get_mut(slug) {
            if fans.remove(username) {
                tracing::debug!(%slug, %username, "favorite edge removed");
            }
        }
        inner.sync_favorites_count(slug);
        Ok(())
    }

    fn is_favorite(&self, slug: &Slug, username: &Username) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner
            .favorites
            .get(slug)
            .is_some_and(|fans| fans.contains(username)))
    }

    fn feed(&self, username: &Username, page: PageRequest) -> Result<Page<Article>> {
        let inner = self.read()?;
        inner.require_user(username)?;

        let Some(followed) = inner.follows.get(username).filter(|f| !f.is_empty()) else {
            return Ok(Page::empty());
        };

        // Match on accounts, so renamed authors stay in the feed.
        let followed: HashSet<&Email> = followed
            .iter()
            .filter_map(|name| inner.usernames.get(name))
            .collect();
        let matching: Vec<&Article> = inner
            .articles
            .values()
            .filter(|article| {
                inner
                    .article_owners
                    .get(&article.slug)
                    .is_some_and(|owner| followed.contains(owner))
            })
            .collect();

        Ok(page.apply(matching).map(Article::clone))
    }
}
