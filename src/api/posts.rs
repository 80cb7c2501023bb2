//! `/api/posts` handlers, plus `/api/post/{id}` for a single post.

use tracing::{error, info};

use super::reply::{self, Messages};
use crate::db::Store;
use crate::model::{NewPost, PostChanges};
use crate::request::Request;
use crate::response::Response;

const POSTS: Messages = Messages {
    invalid: "Please provide text.",
    missing: "The post with the specified ID does not exist.",
};

const RETRIEVE_FAILED: &str = "The post information could not be retrieved.";
const SAVE_FAILED: &str = "There was an error while saving the post to the database";
const MODIFY_FAILED: &str = "The post information can not be modified.";
const REMOVE_FAILED: &str = "The post could not be removed";

// GET /api/posts
pub async fn index(store: Store, _req: Request) -> Response {
    match store.posts.get_all().await {
        Ok(posts) => reply::ok(posts),
        Err(e) => reply::db_error(e, &POSTS, RETRIEVE_FAILED),
    }
}

// GET /api/posts/{id} — `id` names the author; an author without posts is a 404
pub async fn by_user(store: Store, req: Request) -> Response {
    let Some(user_id) = req.param_as("id") else {
        return reply::not_found(POSTS.missing);
    };
    match store.users.user_posts(user_id).await {
        Ok(posts) if posts.is_empty() => reply::not_found(POSTS.missing),
        Ok(posts) => reply::ok(posts),
        Err(e) => reply::db_error(e, &POSTS, RETRIEVE_FAILED),
    }
}

// GET /api/post/{id}
pub async fn show(store: Store, req: Request) -> Response {
    let Some(id) = req.param_as("id") else {
        return reply::not_found(POSTS.missing);
    };
    reply::found(store.posts.get(id).await, &POSTS, RETRIEVE_FAILED)
}

// POST /api/posts → 201 with the stored post
pub async fn create(store: Store, req: Request) -> Response {
    let Ok(new) = req.json::<NewPost>() else {
        return reply::bad_request(POSTS.invalid);
    };
    let id = match store.posts.insert(new).await {
        Ok(id) => id,
        Err(e) => return reply::db_error(e, &POSTS, SAVE_FAILED),
    };
    match store.posts.get(id).await {
        Ok(Some(post)) => {
            info!(id, user_id = post.user_id, "post created");
            reply::created(post)
        }
        Ok(None) => {
            error!(id, "inserted post not found on read-back");
            reply::server_error(SAVE_FAILED)
        }
        Err(e) => {
            error!(id, "read-back after insert failed: {e}");
            reply::server_error(SAVE_FAILED)
        }
    }
}

// PUT /api/posts/{id} → 200 with the updated post
pub async fn update(store: Store, req: Request) -> Response {
    let Some(id) = req.param_as("id") else {
        return reply::not_found(POSTS.missing);
    };
    let Ok(changes) = req.json::<PostChanges>() else {
        return reply::bad_request(POSTS.invalid);
    };
    match store.posts.update(id, changes).await {
        Ok(0) => reply::not_found(POSTS.missing),
        Ok(_) => reply::found(store.posts.get(id).await, &POSTS, MODIFY_FAILED),
        Err(e) => reply::db_error(e, &POSTS, MODIFY_FAILED),
    }
}

// DELETE /api/posts/{id} → 200 with the removed post
pub async fn remove(store: Store, req: Request) -> Response {
    let Some(id) = req.param_as("id") else {
        return reply::not_found(POSTS.missing);
    };
    let post = match store.posts.get(id).await {
        Ok(Some(post)) => post,
        Ok(None) => return reply::not_found(POSTS.missing),
        Err(e) => return reply::db_error(e, &POSTS, REMOVE_FAILED),
    };
    match store.posts.remove(id).await {
        Ok(0) => reply::not_found(POSTS.missing),
        Ok(_) => {
            info!(id, "post removed");
            reply::ok(post)
        }
        Err(e) => reply::db_error(e, &POSTS, REMOVE_FAILED),
    }
}
