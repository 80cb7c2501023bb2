//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Router, join};
use crate::status::Status;

const ALLOW_HEADERS: &str = "content-type, password";

/// Default request-body cap: 100 KiB.
pub const DEFAULT_MAX_BODY: usize = 100 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    cors: bool,
    max_body: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. CORS headers are on by default and request bodies are
    /// capped at [`DEFAULT_MAX_BODY`].
    ///
    /// ```rust,no_run
    /// use postboard::Server;
    /// let server = Server::bind(([0, 0, 0, 0], 3000));
    /// ```
    pub fn bind(addr: impl Into<SocketAddr>) -> Self {
        Self { addr: addr.into(), cors: true, max_body: DEFAULT_MAX_BODY }
    }

    /// Largest request body accepted, in bytes. Larger bodies get `413`.
    pub fn max_body(mut self, bytes: usize) -> Self {
        self.max_body = bytes;
        self
    }

    /// Turns the permissive CORS headers on or off.
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but shuts down when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| Error::Bind { addr: self.addr, source })?;
        self.serve_listener(listener, router, signal).await
    }

    /// Serves on an already-bound listener; the configured address is ignored.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let router = Arc::new(router);
        let Self { cors, max_body, .. } = self;

        info!(addr = %listener.local_addr()?, cors, max_body, "postboard listening");

        // Tracks every spawned connection task so shutdown can wait for them.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(&router, req, cors, max_body).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("postboard stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one hyper request and produces one hyper response.
///
/// Every failure becomes a response, so hyper never sees an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<hyper::body::Incoming>,
    cors: bool,
    max_body: usize,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let started = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();

    let response = match into_request(req, max_body).await {
        Ok(req) if cors && req.method() == Method::Options => preflight(router, req).await,
        Ok(req) => router.oneshot(req).await,
        Err(res) => res,
    };
    let response = if cors {
        response.with_header("access-control-allow-origin", "*")
    } else {
        response
    };

    info!(
        %method,
        %path,
        status = response.status_code(),
        latency_us = started.elapsed().as_micros() as u64,
        "request"
    );
    Ok(response.into_inner())
}

/// Buffers at most `max_body` bytes of body and converts a hyper request
/// into a [`Request`].
async fn into_request(
    req: hyper::Request<hyper::body::Incoming>,
    max_body: usize,
) -> Result<Request, Response> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Err(Response::status(Status::MethodNotAllowed));
    };
    let path = req.uri().path().to_owned();
    let headers = req
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
        .collect::<Vec<_>>();

    let body = match Limited::new(req.into_body(), max_body).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(%path, max_body, "request body too large");
            return Err(Response::status(Status::ContentTooLarge));
        }
        Err(e) => {
            warn!(%path, "failed to read request body: {e}");
            return Err(Response::status(Status::BadRequest));
        }
    };

    let request = headers
        .into_iter()
        .fold(Request::new(method, path), |req, (name, value)| req.with_header(name, value))
        .with_body(body.to_vec());
    Ok(request)
}

/// Answers a CORS preflight, unless the application routes `OPTIONS` itself.
async fn preflight(router: &Router, req: Request) -> Response {
    if router.lookup(Method::Options, req.path()).is_some() {
        return router.oneshot(req).await;
    }
    let allowed = router.allowed(req.path());
    if allowed.is_empty() {
        return Response::status(Status::NotFound);
    }
    Response::builder()
        .status(Status::NoContent)
        .header("access-control-allow-methods", &join(&allowed))
        .header("access-control-allow-headers", ALLOW_HEADERS)
        .no_body()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C); Ctrl-C only off Unix.
///
/// A handler that cannot be installed is logged and that arm never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
