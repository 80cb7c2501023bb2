//! Mapping from database outcomes to HTTP responses.
//!
//! Every resource speaks the same three error shapes:
//!
//! | Status | Body |
//! |---|---|
//! | 400 | `{"errorMessage": …}` |
//! | 404 | `{"message": …}` |
//! | 500 | `{"error": …}` |

use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::db::DbError;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

/// The messages one resource answers with.
pub(crate) struct Messages {
    /// 400 — the input was rejected.
    pub invalid: &'static str,
    /// 404 — no record under that id.
    pub missing: &'static str,
}

pub(crate) fn ok<T: Serialize>(value: T) -> Response {
    Json(value).into_response()
}

pub(crate) fn created<T: Serialize>(value: T) -> Response {
    (Status::Created, Json(value)).into_response()
}

pub(crate) fn bad_request(message: &str) -> Response {
    (Status::BadRequest, Json(json!({ "errorMessage": message }))).into_response()
}

pub(crate) fn not_found(message: &str) -> Response {
    (Status::NotFound, Json(json!({ "message": message }))).into_response()
}

pub(crate) fn server_error(message: &str) -> Response {
    (Status::InternalServerError, Json(json!({ "error": message }))).into_response()
}

/// Maps a failed database call: a rejected input is the client's fault, any
/// other failure is ours and is logged.
pub(crate) fn db_error(err: DbError, messages: &Messages, failure: &str) -> Response {
    match err {
        DbError::Constraint(detail) => {
            warn!(%detail, "rejected input");
            bad_request(messages.invalid)
        }
        DbError::Unavailable(detail) => {
            error!(%detail, "{failure}");
            server_error(failure)
        }
    }
}

/// Maps a lookup: `Some` is a 200, `None` a 404.
pub(crate) fn found<T: Serialize>(
    outcome: Result<Option<T>, DbError>,
    messages: &Messages,
    failure: &str,
) -> Response {
    match outcome {
        Ok(Some(value)) => ok(value),
        Ok(None) => not_found(messages.missing),
        Err(e) => db_error(e, messages, failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGES: Messages = Messages { invalid: "bad", missing: "gone" };

    fn body(res: &Response) -> serde_json::Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[test]
    fn lookup_outcomes() {
        let hit = found(Ok(Some(json!({ "id": 1 }))), &MESSAGES, "boom");
        assert_eq!(hit.status_code(), 200);
        assert_eq!(body(&hit), json!({ "id": 1 }));

        let miss = found::<()>(Ok(None), &MESSAGES, "boom");
        assert_eq!(miss.status_code(), 404);
        assert_eq!(body(&miss), json!({ "message": "gone" }));
    }

    #[test]
    fn db_errors_split_by_kind() {
        let rejected = db_error(DbError::Constraint("x".into()), &MESSAGES, "boom");
        assert_eq!(rejected.status_code(), 400);
        assert_eq!(body(&rejected), json!({ "errorMessage": "bad" }));

        let broken = db_error(DbError::Unavailable("x".into()), &MESSAGES, "boom");
        assert_eq!(broken.status_code(), 500);
        assert_eq!(body(&broken), json!({ "error": "boom" }));
    }
}
