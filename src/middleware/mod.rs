//! Middleware layer.
//!
//! A middleware runs before a route handler and either forwards the request
//! (possibly rewritten) or answers it on the spot. Attach one to a route with
//! [`Router::on_with`](crate::Router::on_with).
//!
//! Built-in middleware:
//! - [`Uppercase`] — uppercases the `name` field of a JSON body
//! - [`Gatekeeper`] — admits only requests carrying the right `password` header

mod gatekeeper;
mod uppercase;

pub use gatekeeper::Gatekeeper;
pub use uppercase::Uppercase;

use crate::request::Request;
use crate::response::Response;

/// A request-processing step inserted before a route handler.
///
/// `Ok(req)` hands the request on; `Err(res)` short-circuits with `res` and
/// the handler never runs.
///
/// Any `Fn(Request) -> Result<Request, Response>` is a middleware too.
pub trait Middleware: Send + Sync + 'static {
    fn before(&self, req: Request) -> Result<Request, Response>;
}

impl<F> Middleware for F
where
    F: Fn(Request) -> Result<Request, Response> + Send + Sync + 'static,
{
    fn before(&self, req: Request) -> Result<Request, Response> {
        self(req)
    }
}
