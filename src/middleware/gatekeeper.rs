use serde_json::json;
use tracing::warn;

use super::Middleware;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

/// The header the gatekeeper reads.
const PASSWORD_HEADER: &str = "password";

/// Admits a request only when its `password` header matches the passphrase.
///
/// The comparison ignores case. Anything else is answered with
/// `401 {"you":"cannot pass!"}`.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    passphrase: String,
}

impl Gatekeeper {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self { passphrase: passphrase.into().to_lowercase() }
    }

    fn admits(&self, req: &Request) -> bool {
        req.header(PASSWORD_HEADER)
            .is_some_and(|given| given.to_lowercase() == self.passphrase)
    }
}

impl Middleware for Gatekeeper {
    fn before(&self, req: Request) -> Result<Request, Response> {
        if self.admits(&req) {
            return Ok(req);
        }
        warn!(path = req.path(), "gatekeeper rejected request");
        Err((Status::Unauthorized, Json(json!({ "you": "cannot pass!" }))).into_response())
    }
}
