//! Outbound adapters: implementations of ports that call other services.

mod customer_api;

pub use customer_api::HttpFundsOracle;
