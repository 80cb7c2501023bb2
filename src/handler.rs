//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in a single
//! `HashMap<Method, Tree>`, so every handler is erased behind
//! `dyn ErasedHandler`:
//!
//! ```text
//! async fn index(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::Get, "/", index)
//! index.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(index))                       ← stored as BoxedHandler
//!        ↓  optionally wrapped by Router::on_with
//! Arc::new(Layered { middleware, inner })
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//! ```
//!
//! Handlers that need shared state (a database handle, say) take it as a
//! first argument and are adapted with [`with_state`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Adapts `async fn(state, req)` into a [`Handler`].
///
/// The state is cloned into every call, so it should be cheap to clone —
/// typically a struct of `Arc`s.
///
/// ```rust
/// use postboard::{with_state, Method, Request, Response, Router};
///
/// #[derive(Clone)]
/// struct Greeting(&'static str);
///
/// async fn greet(state: Greeting, _req: Request) -> Response {
///     Response::text(state.0)
/// }
///
/// let app = Router::new().on(Method::Get, "/", with_state(Greeting("hi"), greet));
/// ```
pub fn with_state<S, F, Fut, R>(state: S, f: F) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req| f(state.clone(), req)
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Holds a concrete handler `F` and bridges it to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Runs a middleware in front of an already-erased handler.
pub(crate) struct Layered {
    middleware: Box<dyn Middleware>,
    inner: BoxedHandler,
}

impl Layered {
    pub(crate) fn wrap(middleware: impl Middleware, inner: BoxedHandler) -> BoxedHandler {
        Arc::new(Self { middleware: Box::new(middleware), inner })
    }
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        match self.middleware.before(req) {
            Ok(req) => self.inner.call(req),
            Err(res) => Box::pin(async move { res }),
        }
    }
}
