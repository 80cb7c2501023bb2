//! postboard server binary.
//!
//! Try:
//!   curl http://localhost:3000/api/users
//!   curl -X POST http://localhost:3000/api/users \
//!        -H 'content-type: application/json' -d '{"name":"bilbo"}'
//!   curl -H 'password: mellon' http://localhost:3000/api/posts/1

use clap::Parser;
use tracing::info;

use postboard::config::Config;
use postboard::db::{MemoryDb, Store};
use postboard::middleware::Gatekeeper;
use postboard::{Server, api, telemetry};

#[tokio::main]
async fn main() -> Result<(), postboard::Error> {
    let config = Config::parse();
    telemetry::init(config.log_format);

    let db = if config.seed { MemoryDb::seeded() } else { MemoryDb::new() };
    info!(seeded = config.seed, "in-memory store ready");

    let app = api::routes(Store::memory(db), Gatekeeper::new(config.gate_passphrase));

    Server::bind(config.addr)
        .cors(config.cors)
        .max_body(config.max_body)
        .serve(app)
        .await
}
