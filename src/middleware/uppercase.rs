use serde_json::Value;
use tracing::debug;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Uppercases the `name` field of a JSON object body.
///
/// Bodies that are not a JSON object with a string `name` pass through
/// untouched; rejecting them is the handler's call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl Middleware for Uppercase {
    fn before(&self, req: Request) -> Result<Request, Response> {
        let Ok(mut body) = req.json::<Value>() else {
            return Ok(req);
        };
        let Some(Value::String(name)) = body.get_mut("name") else {
            return Ok(req);
        };
        *name = name.to_uppercase();

        match serde_json::to_vec(&body) {
            Ok(bytes) => Ok(req.with_body(bytes)),
            Err(e) => {
                debug!("uppercase: leaving body unchanged: {e}");
                Ok(req)
            }
        }
    }
}
