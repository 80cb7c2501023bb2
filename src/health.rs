//! Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Both are registered by [`api::routes`](crate::api::routes).

use tracing::warn;

use crate::db::Store;
use crate::{Request, Response, Status};

/// Liveness probe. Always `200 OK` with body `"ok"`; it has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe. `200 "ready"` when the store answers a lookup, `503`
/// otherwise.
pub async fn readiness(store: Store, _req: Request) -> Response {
    match store.users.get(0).await {
        Ok(_) => Response::text("ready"),
        Err(e) => {
            warn!("readiness check failed: {e}");
            Response::status(Status::ServiceUnavailable)
        }
    }
}
