//! Records exchanged between the API and the database layer.
//!
//! Field names on the wire follow the table columns (`user_id`), except the
//! joined `postedBy` column of [`UserPost`].

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type PostId = u64;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// A row of the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub user_id: UserId,
}

/// A post joined with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPost {
    pub id: PostId,
    pub text: String,
    #[serde(rename = "postedBy")]
    pub posted_by: String,
}

/// Body of `POST /api/users`. Missing fields are the database's to reject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `PUT /api/users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserChanges {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Body of `PUT /api/posts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostChanges {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}
