//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the payment orchestrator.

mod handlers;
mod rate_limit;
mod server;

pub use handlers::ApiError;
pub use rate_limit::{
    CLIENT_ID_HEADER, DEFAULT_REQUESTS_PER_MINUTE, PRUNE_INTERVAL, RateLimiterState,
};
pub use server::HttpServer;
