//! Unified error type.

use std::net::SocketAddr;

/// The error type returned by postboard's fallible infrastructure operations.
///
/// Application-level errors (400, 404, 500, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// failures that stop the process: binding to a port or accepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
