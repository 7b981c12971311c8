//! Row types and column conversions shared by the SQL backends.
//!
//! Postgres stores ids as `UUID` and creation times as `TIMESTAMPTZ`.
//! SQLite has neither, so it keeps them as text: timestamps are fixed-width
//! RFC 3339 UTC with nanoseconds, which makes lexical order equal
//! chronological order.

use chrono::{DateTime, NaiveDate, Utc};
#[cfg(feature = "sqlite")]
use chrono::SecondsFormat;
use sqlx::FromRow;
#[cfg(feature = "postgres")]
use uuid::Uuid;

use initiation_types::{
    AccountRef, AccountType, Amount, CurrencyCode, PaymentId, PaymentInstruction, PaymentStatus,
    RepoError,
};

/// Columns selected for every payment read.
pub const PAYMENT_COLUMNS: &str = "id, debtor_account_id, debtor_account_type, debtor_iban, \
     debtor_customer_id, creditor_account_id, creditor_account_type, creditor_iban, \
     creditor_customer_id, amount_minor, currency, reference, requested_execution_date, \
     status, created_at";

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs
// ─────────────────────────────────────────────────────────────────────────────

/// Columns stored the same way by every backend.
#[derive(FromRow)]
pub struct PaymentFields {
    pub debtor_account_id: String,
    pub debtor_account_type: String,
    pub debtor_iban: Option<String>,
    pub debtor_customer_id: Option<String>,
    pub creditor_account_id: String,
    pub creditor_account_type: String,
    pub creditor_iban: Option<String>,
    pub creditor_customer_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub reference: Option<String>,
    pub requested_execution_date: Option<String>,
    pub status: String,
}

/// Payment instruction row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqlitePayment {
    pub id: String,
    #[sqlx(flatten)]
    pub fields: PaymentFields,
    pub created_at: String,
}

#[cfg(feature = "sqlite")]
impl SqlitePayment {
    pub fn into_domain(self) -> Result<PaymentInstruction, RepoError> {
        let id = self
            .id
            .parse::<PaymentId>()
            .map_err(|e| RepoError::Database(e.to_string()))?;
        self.fields
            .into_domain(id, parse_timestamp(&self.created_at)?)
    }
}

/// Payment instruction row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgPayment {
    pub id: Uuid,
    #[sqlx(flatten)]
    pub fields: PaymentFields,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "postgres")]
impl PgPayment {
    pub fn into_domain(self) -> Result<PaymentInstruction, RepoError> {
        self.fields
            .into_domain(PaymentId::from_uuid(self.id), self.created_at)
    }
}

impl PaymentFields {
    fn into_domain(
        self,
        id: PaymentId,
        created_at: DateTime<Utc>,
    ) -> Result<PaymentInstruction, RepoError> {
        let debtor = account_ref(
            self.debtor_account_id,
            &self.debtor_account_type,
            self.debtor_iban,
            self.debtor_customer_id,
        )?;
        let creditor = account_ref(
            self.creditor_account_id,
            &self.creditor_account_type,
            self.creditor_iban,
            self.creditor_customer_id,
        )?;

        let requested_execution_date = self
            .requested_execution_date
            .map(|d| d.parse::<NaiveDate>())
            .transpose()
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(PaymentInstruction::from_parts(
            id,
            debtor,
            creditor,
            Amount::from_minor_units(self.amount_minor)?,
            CurrencyCode::new(&self.currency)?,
            self.reference,
            requested_execution_date,
            self.status.parse::<PaymentStatus>()?,
            created_at,
        ))
    }
}

fn account_ref(
    account_id: String,
    account_type: &str,
    iban: Option<String>,
    customer_id: Option<String>,
) -> Result<AccountRef, RepoError> {
    Ok(AccountRef {
        account_id,
        account_type: account_type.parse::<AccountType>()?,
        iban,
        customer_id,
    })
}

#[cfg(feature = "sqlite")]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(feature = "sqlite")]
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

pub fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Maps driver errors, surfacing unique-key violations as conflicts.
pub fn db_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(err.to_string()),
    }
}

/// Splits a migration file into statements (drivers differ on multi-statement
/// support).
pub fn migration_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}
