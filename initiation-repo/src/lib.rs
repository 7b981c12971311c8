//! # Initiation Repository
//!
//! Concrete Payment Store implementations (adapters) for the payment
//! initiation service. Every adapter implements the `PaymentStore` port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use initiation_types::{PaymentId, PaymentInstruction, PaymentStatus, PaymentStore, RepoError};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "postgres", feature = "sqlite"))]
mod types;


pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Unified store wrapper selected by database URL scheme.
pub enum Repo {
    Memory(InMemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
    #[cfg(feature = "postgres")]
    Postgres(PostgresStore),
}

/// Build and initialize a store from a database URL.
///
/// | URL                         | Backend            |
/// |-----------------------------|--------------------|
/// | `memory://`                 | in-process vector  |
/// | `sqlite://payments.db`      | SQLite (`sqlite`)  |
/// | `postgres://user@host/db`   | Postgres (`postgres`) |
///
/// SQL backends run their migrations before returning.
///
/// ```ignore
/// let repo = build_repo("sqlite://data/payments.db?mode=rwc").await?;
/// ```
pub async fn build_repo(database_url: &str) -> anyhow::Result<Repo> {
    Repo::new(database_url).await
}

impl Repo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        if database_url.starts_with("memory:") {
            tracing::info!("Using in-memory payment store");
            return Ok(Self::Memory(InMemoryStore::new()));
        }

        if database_url.starts_with("sqlite:") {
            #[cfg(feature = "sqlite")]
            {
                tracing::info!("Using SQLite payment store");
                return Ok(Self::Sqlite(SqliteStore::new(database_url).await?));
            }
            #[cfg(not(feature = "sqlite"))]
            anyhow::bail!("SQLite support not compiled in (enable the `sqlite` feature)");
        }

        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            #[cfg(feature = "postgres")]
            {
                tracing::info!("Using PostgreSQL payment store");
                return Ok(Self::Postgres(PostgresStore::new(database_url).await?));
            }
            #[cfg(not(feature = "postgres"))]
            anyhow::bail!("PostgreSQL support not compiled in (enable the `postgres` feature)");
        }

        anyhow::bail!("Unsupported DATABASE_URL scheme: {database_url}")
    }

    /// Short backend name for logs and health output.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => "postgres",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement PaymentStore for Repo (delegation)
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Repo::Memory($store) => $call,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($store) => $call,
            #[cfg(feature = "postgres")]
            Repo::Postgres($store) => $call,
        }
    };
}

#[async_trait]
impl PaymentStore for Repo {
    async fn insert(&self, instruction: &PaymentInstruction) -> Result<(), RepoError> {
        delegate!(self, store => store.insert(instruction).await)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentInstruction>, RepoError> {
        delegate!(self, store => store.find_by_id(id).await)
    }

    async fn find_all_ordered_by_created_at_desc(
        &self,
    ) -> Result<Vec<PaymentInstruction>, RepoError> {
        delegate!(self, store => store.find_all_ordered_by_created_at_desc().await)
    }

    async fn update(
        &self,
        instruction: &PaymentInstruction,
        expected: PaymentStatus,
    ) -> Result<(), RepoError> {
        delegate!(self, store => store.update(instruction, expected).await)
    }

    async fn sum_amount_for_debtor_since(
        &self,
        debtor_account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Decimal, RepoError> {
        delegate!(self, store => store.sum_amount_for_debtor_since(debtor_account_id, since).await)
    }
}
