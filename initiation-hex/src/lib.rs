//! # Initiation Hex
//!
//! Payment orchestrator, funds check and adapters for the payment
//! initiation service.
//!
//! ## Architecture
//!
//! - `service` - Payment orchestrator (validation pipeline + status machine)
//! - `funds` - Fail-closed funds sufficiency check over the oracle port
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - HTTP client for the customer service (funds oracle)
//!
//! The orchestrator is generic over `S: PaymentStore` and `O: FundsOracle`,
//! so tests inject in-memory doubles and the binary injects real adapters.

pub mod funds;
pub mod inbound;
pub mod openapi;
pub mod outbound;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use funds::FundsChecker;
pub use service::{DailyTotalSource, PaymentService};
