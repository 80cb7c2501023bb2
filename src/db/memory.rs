use std::collections::BTreeMap;
use std::future::ready;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use super::{DbError, DbFuture, PostDb, UserDb};
use crate::model::{NewPost, NewUser, Post, PostChanges, PostId, User, UserChanges, UserId, UserPost};

/// Longest accepted user name, in characters.
const NAME_MAX: usize = 128;

/// An in-process database holding the `users` and `posts` tables.
///
/// Enforces the constraints a relational schema for the two tables would:
/// required columns, unique user names, and posts referencing an existing
/// user. Removing a user cascades to their posts. Ids start at 1 and are
/// never reused.
#[derive(Debug, Default)]
pub struct MemoryDb {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Post>,
    last_user_id: UserId,
    last_post_id: PostId,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database preloaded with a fellowship of users and a few posts each.
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        for (name, lines) in SEED {
            let user_id = match tables.insert_user(NewUser { name: Some((*name).to_owned()) }) {
                Ok(id) => id,
                Err(e) => {
                    warn!(name = *name, "skipping seed user: {e}");
                    continue;
                }
            };
            for text in *lines {
                let post = NewPost { text: Some((*text).to_owned()), user_id: Some(user_id) };
                if let Err(e) = tables.insert_post(post) {
                    warn!(user_id, "skipping seed post: {e}");
                }
            }
        }
        Self { tables: RwLock::new(tables) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DbError> {
        self.tables.read().map_err(|_| DbError::Unavailable("tables lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DbError> {
        self.tables.write().map_err(|_| DbError::Unavailable("tables lock poisoned".into()))
    }
}

impl Tables {
    fn check_name(&self, name: Option<&str>, except: Option<UserId>) -> Result<String, DbError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DbError::Constraint("users.name may not be null".into()))?;
        if name.chars().count() > NAME_MAX {
            return Err(DbError::Constraint(format!("users.name longer than {NAME_MAX}")));
        }
        if self.users.values().any(|u| u.name == name && Some(u.id) != except) {
            return Err(DbError::Constraint(format!("users.name `{name}` already exists")));
        }
        Ok(name.to_owned())
    }

    fn check_text(text: Option<&str>) -> Result<String, DbError> {
        text.filter(|t| !t.trim().is_empty())
            .map(str::to_owned)
            .ok_or_else(|| DbError::Constraint("posts.text may not be null".into()))
    }

    fn check_author(&self, user_id: Option<UserId>) -> Result<UserId, DbError> {
        let user_id = user_id
            .ok_or_else(|| DbError::Constraint("posts.user_id may not be null".into()))?;
        if !self.users.contains_key(&user_id) {
            return Err(DbError::Constraint(format!("posts.user_id {user_id} references no user")));
        }
        Ok(user_id)
    }

    fn insert_user(&mut self, new: NewUser) -> Result<UserId, DbError> {
        let name = self.check_name(new.name.as_deref(), None)?;
        self.last_user_id += 1;
        let id = self.last_user_id;
        self.users.insert(id, User { id, name });
        Ok(id)
    }

    fn update_user(&mut self, id: UserId, changes: UserChanges) -> Result<u64, DbError> {
        if !self.users.contains_key(&id) {
            return Ok(0);
        }
        if changes.name.is_none() {
            return Err(DbError::Constraint("empty update".into()));
        }
        let name = self.check_name(changes.name.as_deref(), Some(id))?;
        if let Some(user) = self.users.get_mut(&id) {
            user.name = name;
        }
        Ok(1)
    }

    fn remove_user(&mut self, id: UserId) -> u64 {
        if self.users.remove(&id).is_none() {
            return 0;
        }
        self.posts.retain(|_, p| p.user_id != id);
        1
    }

    fn user_posts(&self, user_id: UserId) -> Vec<UserPost> {
        let Some(author) = self.users.get(&user_id) else {
            return Vec::new();
        };
        self.posts
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| UserPost { id: p.id, text: p.text.clone(), posted_by: author.name.clone() })
            .collect()
    }

    fn insert_post(&mut self, new: NewPost) -> Result<PostId, DbError> {
        let text = Self::check_text(new.text.as_deref())?;
        let user_id = self.check_author(new.user_id)?;
        self.last_post_id += 1;
        let id = self.last_post_id;
        self.posts.insert(id, Post { id, text, user_id });
        Ok(id)
    }

    fn update_post(&mut self, id: PostId, changes: PostChanges) -> Result<u64, DbError> {
        if !self.posts.contains_key(&id) {
            return Ok(0);
        }
        if changes.text.is_none() && changes.user_id.is_none() {
            return Err(DbError::Constraint("empty update".into()));
        }
        let text = changes.text.as_deref().map(|t| Self::check_text(Some(t))).transpose()?;
        let user_id = changes.user_id.map(|u| self.check_author(Some(u))).transpose()?;
        if let Some(post) = self.posts.get_mut(&id) {
            if let Some(text) = text {
                post.text = text;
            }
            if let Some(user_id) = user_id {
                post.user_id = user_id;
            }
        }
        Ok(1)
    }

    fn remove_post(&mut self, id: PostId) -> u64 {
        u64::from(self.posts.remove(&id).is_some())
    }
}

impl UserDb for MemoryDb {
    fn get_all(&self) -> DbFuture<'_, Vec<User>> {
        Box::pin(ready(self.read().map(|t| t.users.values().cloned().collect::<Vec<_>>())))
    }

    fn get(&self, id: UserId) -> DbFuture<'_, Option<User>> {
        Box::pin(ready(self.read().map(|t| t.users.get(&id).cloned())))
    }

    fn insert(&self, user: NewUser) -> DbFuture<'_, UserId> {
        Box::pin(ready(self.write().and_then(|mut t| t.insert_user(user))))
    }

    fn update(&self, id: UserId, changes: UserChanges) -> DbFuture<'_, u64> {
        Box::pin(ready(self.write().and_then(|mut t| t.update_user(id, changes))))
    }

    fn remove(&self, id: UserId) -> DbFuture<'_, u64> {
        Box::pin(ready(self.write().map(|mut t| t.remove_user(id))))
    }

    fn user_posts(&self, user_id: UserId) -> DbFuture<'_, Vec<UserPost>> {
        Box::pin(ready(self.read().map(|t| t.user_posts(user_id))))
    }
}

impl PostDb for MemoryDb {
    fn get_all(&self) -> DbFuture<'_, Vec<Post>> {
        Box::pin(ready(self.read().map(|t| t.posts.values().cloned().collect::<Vec<_>>())))
    }

    fn get(&self, id: PostId) -> DbFuture<'_, Option<Post>> {
        Box::pin(ready(self.read().map(|t| t.posts.get(&id).cloned())))
    }

    fn insert(&self, post: NewPost) -> DbFuture<'_, PostId> {
        Box::pin(ready(self.write().and_then(|mut t| t.insert_post(post))))
    }

    fn update(&self, id: PostId, changes: PostChanges) -> DbFuture<'_, u64> {
        Box::pin(ready(self.write().and_then(|mut t| t.update_post(id, changes))))
    }

    fn remove(&self, id: PostId) -> DbFuture<'_, u64> {
        Box::pin(ready(self.write().map(|mut t| t.remove_post(id))))
    }
}

const SEED: &[(&str, &[&str])] = &[
    ("Frodo Baggins", &[
        "I wish the ring had never come to me. I wish none of this had happened.",
        "I will take the Ring to Mordor.",
    ]),
    ("Samwise Gamgee", &[
        "There's some good in this world, Mr. Frodo, and it's worth fighting for.",
    ]),
    ("Gandalf", &[
        "All we have to decide is what to do with the time that is given us.",
        "Fly, you fools!",
    ]),
    ("Aragorn", &[]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser { name: Some(name.to_owned()) }
    }

    fn new_post(text: &str, user_id: UserId) -> NewPost {
        NewPost { text: Some(text.to_owned()), user_id: Some(user_id) }
    }

    #[tokio::test]
    async fn insert_then_get_user() {
        let db = MemoryDb::new();
        let id = UserDb::insert(&db, new_user("Frodo")).await.unwrap();
        assert_eq!(id, 1);
        let user = UserDb::get(&db, id).await.unwrap();
        assert_eq!(user, Some(User { id: 1, name: "Frodo".into() }));
        assert_eq!(UserDb::get(&db, 99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn user_name_constraints() {
        let db = MemoryDb::new();
        for bad in [NewUser::default(), new_user(""), new_user("   "), new_user(&"x".repeat(129))] {
            let err = UserDb::insert(&db, bad).await.unwrap_err();
            assert!(matches!(err, DbError::Constraint(_)), "{err}");
        }
        UserDb::insert(&db, new_user("Sam")).await.unwrap();
        let dup = UserDb::insert(&db, new_user("Sam")).await.unwrap_err();
        assert!(matches!(dup, DbError::Constraint(_)));
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let db = MemoryDb::new();
        let first = UserDb::insert(&db, new_user("Merry")).await.unwrap();
        assert_eq!(UserDb::remove(&db, first).await.unwrap(), 1);
        let second = UserDb::insert(&db, new_user("Pippin")).await.unwrap();
        assert_eq!(second, first + 1);
    }

    #[tokio::test]
    async fn update_user_counts_rows() {
        let db = MemoryDb::new();
        let id = UserDb::insert(&db, new_user("Strider")).await.unwrap();
        let changes = UserChanges { name: Some("Aragorn".into()) };
        assert_eq!(UserDb::update(&db, id, changes.clone()).await.unwrap(), 1);
        assert_eq!(UserDb::update(&db, 42, changes).await.unwrap(), 0);
        assert_eq!(UserDb::get(&db, id).await.unwrap().unwrap().name, "Aragorn");

        // Keeping your own name is not a duplicate.
        let same = UserChanges { name: Some("Aragorn".into()) };
        assert_eq!(UserDb::update(&db, id, same).await.unwrap(), 1);

        let empty = UserDb::update(&db, id, UserChanges::default()).await.unwrap_err();
        assert!(matches!(empty, DbError::Constraint(_)));

        // A missing row wins over an empty change set.
        assert_eq!(UserDb::update(&db, 42, UserChanges::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn posts_must_reference_a_user() {
        let db = MemoryDb::new();
        let orphan = PostDb::insert(&db, new_post("hello", 1)).await.unwrap_err();
        assert!(matches!(orphan, DbError::Constraint(_)));

        let uid = UserDb::insert(&db, new_user("Gimli")).await.unwrap();
        let no_text = PostDb::insert(&db, NewPost { text: None, user_id: Some(uid) }).await;
        assert!(matches!(no_text, Err(DbError::Constraint(_))));

        let pid = PostDb::insert(&db, new_post("And my axe!", uid)).await.unwrap();
        let moved = PostChanges { text: None, user_id: Some(uid + 1) };
        assert!(matches!(PostDb::update(&db, pid, moved).await, Err(DbError::Constraint(_))));
    }

    #[tokio::test]
    async fn update_post_applies_only_given_fields() {
        let db = MemoryDb::new();
        let uid = UserDb::insert(&db, new_user("Legolas")).await.unwrap();
        let pid = PostDb::insert(&db, new_post("They're taking the hobbits", uid)).await.unwrap();
        let changes = PostChanges { text: Some("to Isengard".into()), user_id: None };
        assert_eq!(PostDb::update(&db, pid, changes).await.unwrap(), 1);
        let post = PostDb::get(&db, pid).await.unwrap().unwrap();
        assert_eq!(post, Post { id: pid, text: "to Isengard".into(), user_id: uid });
        assert_eq!(PostDb::update(&db, 99, PostChanges { text: Some("x".into()), user_id: None }).await.unwrap(), 0);
        assert_eq!(PostDb::update(&db, 99, PostChanges::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn removing_a_user_removes_their_posts() {
        let db = MemoryDb::new();
        let boromir = UserDb::insert(&db, new_user("Boromir")).await.unwrap();
        let faramir = UserDb::insert(&db, new_user("Faramir")).await.unwrap();
        PostDb::insert(&db, new_post("One does not simply walk into Mordor", boromir)).await.unwrap();
        PostDb::insert(&db, new_post("A chance for Faramir", faramir)).await.unwrap();

        assert_eq!(UserDb::remove(&db, boromir).await.unwrap(), 1);
        assert_eq!(UserDb::remove(&db, boromir).await.unwrap(), 0);
        let left = PostDb::get_all(&db).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].user_id, faramir);
    }

    #[tokio::test]
    async fn user_posts_join_author_name() {
        let db = MemoryDb::seeded();
        let posts = UserDb::user_posts(&db, 1).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.posted_by == "Frodo Baggins"));
        assert!(UserDb::user_posts(&db, 4).await.unwrap().is_empty());
        assert!(UserDb::user_posts(&db, 404).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seed_loads_every_user() {
        let db = MemoryDb::seeded();
        assert_eq!(UserDb::get_all(&db).await.unwrap().len(), SEED.len());
        let posts: usize = SEED.iter().map(|(_, lines)| lines.len()).sum();
        assert_eq!(PostDb::get_all(&db).await.unwrap().len(), posts);
    }
}
