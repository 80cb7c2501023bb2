//! # postboard
//!
//! A small REST API over two related resources, users and their posts.
//!
//! The crate is two layers:
//!
//! - A minimal HTTP toolkit on hyper and tokio: radix-tree [`Router`],
//!   per-route [`Middleware`](middleware::Middleware), typed [`Request`] /
//!   [`Response`], and a [`Server`] with graceful shutdown.
//! - The application itself: the [`api`] handlers, which map verbs and paths
//!   to calls on the [`db`] traits and map the outcomes to status codes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use postboard::{api, db::{MemoryDb, Store}, middleware::Gatekeeper, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), postboard::Error> {
//!     let store = Store::memory(MemoryDb::seeded());
//!     let app = api::routes(store, Gatekeeper::new("mellon"));
//!     Server::bind(([0, 0, 0, 0], 3000)).serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod db;
pub mod health;
pub mod middleware;
pub mod model;
pub mod telemetry;

pub use error::Error;
pub use handler::{Handler, with_state};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{DEFAULT_MAX_BODY, Server};
pub use status::Status;
