//! Domain models for the payment initiation service.

pub mod account;
pub mod money;
pub mod payment;

pub use account::{AccountRef, AccountType, CustomerAccount};
pub use money::{Amount, CurrencyCode};
pub use payment::{PaymentId, PaymentInstruction, PaymentStatus};
