//! Database access layer.
//!
//! The API talks to persistence only through [`UserDb`] and [`PostDb`].
//! Every call returns a boxed future so implementations can be backed by a
//! real driver; [`MemoryDb`] is the in-process implementation used by the
//! binary and the tests.

mod memory;

pub use memory::MemoryDb;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::model::{NewPost, NewUser, Post, PostChanges, PostId, User, UserChanges, UserId, UserPost};

/// Errors a database call can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    /// The input violates a schema constraint (missing column, bad reference,
    /// duplicate). The caller sent something the store will never accept.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The store could not serve the call.
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

/// A boxed, `Send` database future.
pub type DbFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DbError>> + Send + 'a>>;

/// Access to the `users` table.
pub trait UserDb: Send + Sync {
    fn get_all(&self) -> DbFuture<'_, Vec<User>>;
    fn get(&self, id: UserId) -> DbFuture<'_, Option<User>>;
    /// Inserts a user and returns the id it was assigned.
    fn insert(&self, user: NewUser) -> DbFuture<'_, UserId>;
    /// Applies `changes`; resolves to the number of rows updated.
    fn update(&self, id: UserId, changes: UserChanges) -> DbFuture<'_, u64>;
    /// Resolves to the number of rows removed.
    fn remove(&self, id: UserId) -> DbFuture<'_, u64>;
    /// Posts written by `user_id`, joined with the author's name.
    fn user_posts(&self, user_id: UserId) -> DbFuture<'_, Vec<UserPost>>;
}

/// Access to the `posts` table.
pub trait PostDb: Send + Sync {
    fn get_all(&self) -> DbFuture<'_, Vec<Post>>;
    fn get(&self, id: PostId) -> DbFuture<'_, Option<Post>>;
    fn insert(&self, post: NewPost) -> DbFuture<'_, PostId>;
    fn update(&self, id: PostId, changes: PostChanges) -> DbFuture<'_, u64>;
    fn remove(&self, id: PostId) -> DbFuture<'_, u64>;
}

/// The handles a request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserDb>,
    pub posts: Arc<dyn PostDb>,
}

impl Store {
    pub fn new(users: Arc<dyn UserDb>, posts: Arc<dyn PostDb>) -> Self {
        Self { users, posts }
    }

    /// Both tables served by one [`MemoryDb`].
    pub fn memory(db: MemoryDb) -> Self {
        let db = Arc::new(db);
        Self { users: db.clone(), posts: db }
    }
}
