//! `/api/users` handlers.

use tracing::{error, info};

use super::reply::{self, Messages};
use crate::db::Store;
use crate::model::{NewUser, UserChanges, UserId};
use crate::request::Request;
use crate::response::Response;

const USERS: Messages = Messages {
    invalid: "Please provide a name.",
    missing: "The user with the specified ID does not exist.",
};

const RETRIEVE_FAILED: &str = "The user information could not be retrieved.";
const SAVE_FAILED: &str = "There was an error while saving the user to the database";
const MODIFY_FAILED: &str = "The user information can not be modified.";
const REMOVE_FAILED: &str = "The user could not be removed";

fn id(req: &Request) -> Option<UserId> {
    req.param_as("id")
}

// GET /api/users
pub async fn index(store: Store, _req: Request) -> Response {
    match store.users.get_all().await {
        Ok(users) => reply::ok(users),
        Err(e) => reply::db_error(e, &USERS, RETRIEVE_FAILED),
    }
}

// GET /api/users/{id}
pub async fn show(store: Store, req: Request) -> Response {
    let Some(id) = id(&req) else {
        return reply::not_found(USERS.missing);
    };
    reply::found(store.users.get(id).await, &USERS, RETRIEVE_FAILED)
}

// POST /api/users → 201 with the stored user
pub async fn create(store: Store, req: Request) -> Response {
    let Ok(new) = req.json::<NewUser>() else {
        return reply::bad_request(USERS.invalid);
    };
    let id = match store.users.insert(new).await {
        Ok(id) => id,
        Err(e) => return reply::db_error(e, &USERS, SAVE_FAILED),
    };
    match store.users.get(id).await {
        Ok(Some(user)) => {
            info!(id, "user created");
            reply::created(user)
        }
        Ok(None) => {
            error!(id, "inserted user not found on read-back");
            reply::server_error(SAVE_FAILED)
        }
        Err(e) => {
            error!(id, "read-back after insert failed: {e}");
            reply::server_error(SAVE_FAILED)
        }
    }
}

// PUT /api/users/{id} → 200 with the updated user
pub async fn update(store: Store, req: Request) -> Response {
    let Some(id) = id(&req) else {
        return reply::not_found(USERS.missing);
    };
    let Ok(changes) = req.json::<UserChanges>() else {
        return reply::bad_request(USERS.invalid);
    };
    match store.users.update(id, changes).await {
        Ok(0) => reply::not_found(USERS.missing),
        Ok(_) => reply::found(store.users.get(id).await, &USERS, MODIFY_FAILED),
        Err(e) => reply::db_error(e, &USERS, MODIFY_FAILED),
    }
}

// DELETE /api/users/{id} → 200 with the removed user
pub async fn remove(store: Store, req: Request) -> Response {
    let Some(id) = id(&req) else {
        return reply::not_found(USERS.missing);
    };
    let user = match store.users.get(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return reply::not_found(USERS.missing),
        Err(e) => return reply::db_error(e, &USERS, REMOVE_FAILED),
    };
    match store.users.remove(id).await {
        Ok(0) => reply::not_found(USERS.missing),
        Ok(_) => {
            info!(id, "user removed");
            reply::ok(user)
        }
        Err(e) => reply::db_error(e, &USERS, REMOVE_FAILED),
    }
}
