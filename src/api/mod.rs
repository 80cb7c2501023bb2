//! The users-and-posts REST API.
//!
//! | Verb | Path | Middleware |
//! |---|---|---|
//! | GET | `/api/users` | |
//! | GET | `/api/users/{id}` | |
//! | POST | `/api/users` | [`Uppercase`] |
//! | PUT | `/api/users/{id}` | [`Uppercase`] |
//! | DELETE | `/api/users/{id}` | |
//! | GET | `/api/posts` | |
//! | GET | `/api/posts/{id}` (posts by user) | [`Gatekeeper`] |
//! | GET | `/api/post/{id}` | |
//! | POST | `/api/posts` | |
//! | PUT | `/api/posts/{id}` | |
//! | DELETE | `/api/posts/{id}` | |
//!
//! Plus the `/healthz` and `/readyz` probes.

mod posts;
mod reply;
mod users;

use crate::db::Store;
use crate::handler::with_state;
use crate::health;
use crate::method::Method;
use crate::middleware::{Gatekeeper, Uppercase};
use crate::router::Router;

/// Builds the application router over `store`.
pub fn routes(store: Store, gate: Gatekeeper) -> Router {
    Router::new()
        .on(Method::Get, "/api/users", with_state(store.clone(), users::index))
        .on(Method::Get, "/api/users/{id}", with_state(store.clone(), users::show))
        .on_with(Method::Post, "/api/users", Uppercase, with_state(store.clone(), users::create))
        .on_with(Method::Put, "/api/users/{id}", Uppercase, with_state(store.clone(), users::update))
        .on(Method::Delete, "/api/users/{id}", with_state(store.clone(), users::remove))
        .on(Method::Get, "/api/posts", with_state(store.clone(), posts::index))
        .on_with(Method::Get, "/api/posts/{id}", gate, with_state(store.clone(), posts::by_user))
        .on(Method::Get, "/api/post/{id}", with_state(store.clone(), posts::show))
        .on(Method::Post, "/api/posts", with_state(store.clone(), posts::create))
        .on(Method::Put, "/api/posts/{id}", with_state(store.clone(), posts::update))
        .on(Method::Delete, "/api/posts/{id}", with_state(store.clone(), posts::remove))
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", with_state(store, health::readiness))
}
