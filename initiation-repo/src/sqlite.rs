//! SQLite Payment Store adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use initiation_types::{PaymentId, PaymentInstruction, PaymentStatus, PaymentStore, RepoError};

use crate::types::{
    PAYMENT_COLUMNS, SqlitePayment, db_error, format_date, format_timestamp,
    migration_statements,
};

const MIGRATION: &str = include_str!("../migrations/0001_create_payment_instructions.sql");

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists.
        if !in_memory {
            if let Some(path) = database_url.strip_prefix("sqlite://") {
                let path = path.split('?').next().unwrap_or(path);
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` opens its own database, so pin the
        // pool to one connection that never gets recycled.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for stmt in migration_statements(MIGRATION) {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for SqliteStore {
    async fn insert(&self, p: &PaymentInstruction) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payment_instructions (
                   id, debtor_account_id, debtor_account_type, debtor_iban, debtor_customer_id,
                   creditor_account_id, creditor_account_type, creditor_iban, creditor_customer_id,
                   amount_minor, currency, reference, requested_execution_date, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(p.id.to_string())
        .bind(&p.debtor_account.account_id)
        .bind(p.debtor_account.account_type.as_str())
        .bind(&p.debtor_account.iban)
        .bind(&p.debtor_account.customer_id)
        .bind(&p.creditor_account.account_id)
        .bind(p.creditor_account.account_type.as_str())
        .bind(&p.creditor_account.iban)
        .bind(&p.creditor_account.customer_id)
        .bind(p.amount.minor_units())
        .bind(p.currency.as_str())
        .bind(&p.reference)
        .bind(format_date(p.requested_execution_date))
        .bind(p.status.as_str())
        .bind(format_timestamp(p.created_at))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentInstruction>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment_instructions WHERE id = ?");
        let row: Option<SqlitePayment> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(SqlitePayment::into_domain).transpose()
    }

    async fn find_all_ordered_by_created_at_desc(
        &self,
    ) -> Result<Vec<PaymentInstruction>, RepoError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_instructions ORDER BY created_at DESC, seq DESC"
        );
        let rows: Vec<SqlitePayment> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(SqlitePayment::into_domain).collect()
    }

    async fn update(
        &self,
        instruction: &PaymentInstruction,
        expected: PaymentStatus,
    ) -> Result<(), RepoError> {
        let id = instruction.id.to_string();
        let result =
            sqlx::query(r#"UPDATE payment_instructions SET status = ? WHERE id = ? AND status = ?"#)
                .bind(instruction.status.as_str())
                .bind(&id)
                .bind(expected.as_str())
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let current: Option<String> =
            sqlx::query_scalar(r#"SELECT status FROM payment_instructions WHERE id = ?"#)
                .bind(&id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        match current {
            None => Err(RepoError::NotFound),
            Some(status) => Err(RepoError::Conflict(format!(
                "Payment {id} is {status}, expected {expected}"
            ))),
        }
    }

    async fn sum_amount_for_debtor_since(
        &self,
        debtor_account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Decimal, RepoError> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(amount_minor), 0) FROM payment_instructions
               WHERE debtor_account_id = ? AND status <> 'FAILED' AND created_at >= ?"#,
        )
        .bind(debtor_account_id)
        .bind(format_timestamp(since))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Decimal::new(total, 2))
    }
}
