//! Process configuration: command-line flags with environment fallbacks.

use std::net::SocketAddr;

use clap::{ArgAction, Parser, ValueEnum};

use crate::server::DEFAULT_MAX_BODY;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, for local development.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// postboard — a users-and-posts REST API.
#[derive(Debug, Clone, Parser)]
#[command(name = "postboard", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "POSTBOARD_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Passphrase the `password` header must carry on gated routes.
    #[arg(long, env = "POSTBOARD_GATE_PASSPHRASE", default_value = "mellon", hide_env_values = true)]
    pub gate_passphrase: String,

    /// Log output format. Filtering follows `RUST_LOG` (default `info`).
    #[arg(long, env = "POSTBOARD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Send permissive CORS headers and answer preflight requests.
    #[arg(long, env = "POSTBOARD_CORS", default_value_t = true, action = ArgAction::Set)]
    pub cors: bool,

    /// Largest request body accepted, in bytes; larger bodies get `413`.
    #[arg(long, env = "POSTBOARD_MAX_BODY", default_value_t = DEFAULT_MAX_BODY)]
    pub max_body: usize,

    /// Start with a small demo data set instead of empty tables.
    #[arg(long, env = "POSTBOARD_SEED")]
    pub seed: bool,
}
