//! PostgreSQL Payment Store adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use initiation_types::{PaymentId, PaymentInstruction, PaymentStatus, PaymentStore, RepoError};

use crate::types::{PAYMENT_COLUMNS, PgPayment, db_error, format_date, migration_statements};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Store
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL store implementation.
pub struct PostgresStore {
    pool: PgPool,
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    let sql = include_str!("../migrations/0001_create_payment_instructions_pg.sql");
    for stmt in migration_statements(sql) {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("Migration 0001 failed: {}", e))?;
    }
    Ok(())
}

impl PostgresStore {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PaymentStore for PostgresStore {
    async fn insert(&self, p: &PaymentInstruction) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payment_instructions (
                   id, debtor_account_id, debtor_account_type, debtor_iban, debtor_customer_id,
                   creditor_account_id, creditor_account_type, creditor_iban, creditor_customer_id,
                   amount_minor, currency, reference, requested_execution_date, status, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"#,
        )
        .bind(p.id.into_uuid())
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
        .bind(p.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentInstruction>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment_instructions WHERE id = $1");
        let row: Option<PgPayment> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(PgPayment::into_domain).transpose()
    }

    async fn find_all_ordered_by_created_at_desc(
        &self,
    ) -> Result<Vec<PaymentInstruction>, RepoError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_instructions ORDER BY created_at DESC, seq DESC"
        );
        let rows: Vec<PgPayment> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(PgPayment::into_domain).collect()
    }

    async fn update(
        &self,
        instruction: &PaymentInstruction,
        expected: PaymentStatus,
    ) -> Result<(), RepoError> {
        let id = instruction.id.into_uuid();

        // Single round trip: the CTE reports whether the row exists at all.
        let outcome: Option<(bool,)> = sqlx::query_as(
            r#"WITH updated AS (
                   UPDATE payment_instructions SET status = $1
                   WHERE id = $2 AND status = $3
                   RETURNING id
               )
               SELECT EXISTS (SELECT 1 FROM updated)
               FROM payment_instructions WHERE id = $2"#,
        )
        .bind(instruction.status.as_str())
        .bind(id)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match outcome {
            None => Err(RepoError::NotFound),
            Some((true,)) => Ok(()),
            Some((false,)) => Err(RepoError::Conflict(format!(
                "Payment {id} is no longer {expected}"
            ))),
        }
    }

    async fn sum_amount_for_debtor_since(
        &self,
        debtor_account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Decimal, RepoError> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(amount_minor), 0)::BIGINT FROM payment_instructions
               WHERE debtor_account_id = $1 AND status <> 'FAILED' AND created_at >= $2"#,
        )
        .bind(debtor_account_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Decimal::new(total, 2))
    }
}
