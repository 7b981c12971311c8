//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod oracle;
mod store;

pub use oracle::{FundsOracle, OracleError};
pub use store::PaymentStore;
