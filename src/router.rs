//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler, optionally behind a [`Middleware`].

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler, Layered};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or drive it directly with [`Router::oneshot`].
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with an existing route.
    /// Routes are registered at startup, so this is a programming error.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Like [`on`](Router::on), but runs `middleware` before the handler.
    ///
    /// ```rust
    /// use postboard::{Method, Request, Response, Router, Status};
    ///
    /// fn needs_body(req: Request) -> Result<Request, Response> {
    ///     if req.body().is_empty() { Err(Response::status(Status::BadRequest)) } else { Ok(req) }
    /// }
    ///
    /// async fn create(_req: Request) -> Status { Status::Created }
    ///
    /// let app = Router::new().on_with(Method::Post, "/things", needs_body, create);
    /// ```
    pub fn on_with(
        self,
        method: Method,
        path: &str,
        middleware: impl Middleware,
        handler: impl Handler,
    ) -> Self {
        self.add(method, path, Layered::wrap(middleware, handler.into_boxed_handler()))
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Methods with a route matching `path`, in wire-name order.
    pub(crate) fn allowed(&self, path: &str) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.routes.get(m).is_some_and(|tree| tree.at(path).is_ok()))
            .collect()
    }

    /// Routes one request and produces one response.
    ///
    /// No route for the path is a `404`; a route under another method is a
    /// `405` with an `allow` header. A `HEAD` with no route of its own runs
    /// the `GET` route and drops the body.
    pub async fn oneshot(&self, req: Request) -> Response {
        if let Some((handler, params)) = self.lookup(req.method(), req.path()) {
            return handler.call(req.with_params(params)).await;
        }
        if req.method() == Method::Head {
            if let Some((handler, params)) = self.lookup(Method::Get, req.path()) {
                return handler.call(req.with_params(params)).await.without_body();
            }
        }
        let allowed = self.allowed(req.path());
        if allowed.is_empty() {
            Response::status(Status::NotFound)
        } else {
            Response::builder()
                .status(Status::MethodNotAllowed)
                .header("allow", &join(&allowed))
                .no_body()
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

pub(crate) fn join(methods: &[Method]) -> String {
    methods.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IntoResponse, Json};

    async fn echo_id(req: Request) -> Response {
        Json(serde_json::json!({ "id": req.param("id") })).into_response()
    }

    async fn created(_req: Request) -> Status {
        Status::Created
    }

    fn app() -> Router {
        Router::new()
            .on(Method::Get, "/things/{id}", echo_id)
            .on(Method::Delete, "/things/{id}", echo_id)
            .on(Method::Post, "/things", created)
    }

    #[tokio::test]
    async fn path_params_reach_the_handler() {
        let res = app().oneshot(Request::new(Method::Get, "/things/7")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), br#"{"id":"7"}"#);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let res = app().oneshot(Request::new(Method::Get, "/nothing")).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn wrong_method_is_405_with_allow() {
        let res = app().oneshot(Request::new(Method::Put, "/things/7")).await;
        assert_eq!(res.status_code(), 405);
        assert_eq!(res.header("allow"), Some("DELETE, GET"));
    }

    #[tokio::test]
    async fn head_falls_back_to_get_without_body() {
        let res = app().oneshot(Request::new(Method::Head, "/things/7")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert!(res.body().is_empty());

        let res = app().oneshot(Request::new(Method::Head, "/things")).await;
        assert_eq!(res.status_code(), 405);
    }

    #[tokio::test]
    async fn explicit_head_route_wins() {
        async fn head(_req: Request) -> Response {
            Response::builder().header("x-head", "1").no_body()
        }
        let app = app().on(Method::Head, "/things/{id}", head);
        let res = app.oneshot(Request::new(Method::Head, "/things/7")).await;
        assert_eq!(res.header("x-head"), Some("1"));
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let deny = |_req: Request| -> Result<Request, Response> {
            Err(Response::status(Status::Unauthorized))
        };
        let app = Router::new().on_with(Method::Post, "/things", deny, created);
        let res = app.oneshot(Request::new(Method::Post, "/things")).await;
        assert_eq!(res.status_code(), 401);
    }

    #[tokio::test]
    async fn middleware_can_rewrite_the_request() {
        async fn body(req: Request) -> Response {
            Response::text(String::from_utf8_lossy(req.body()).into_owned())
        }
        let stamp = |req: Request| -> Result<Request, Response> { Ok(req.with_body("stamped")) };
        let app = Router::new().on_with(Method::Post, "/things", stamp, body);
        let res = app.oneshot(Request::new(Method::Post, "/things").with_body("raw")).await;
        assert_eq!(res.body(), b"stamped");
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .on(Method::Get, "/things/{id}", echo_id)
            .on(Method::Get, "/things/{name}", echo_id);
    }
}
