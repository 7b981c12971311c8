//! Configuration loading from environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use initiation_hex::DailyTotalSource;
use initiation_types::PolicySettings;
use rust_decimal::Decimal;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub customer_api_url: String,
    pub funds_check_timeout: Duration,
    pub policy: PolicySettings,
    pub daily_total_source: DailyTotalSource,
    pub rate_limit_per_minute: u32,
    /// OTLP export is switched on only when this is set.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = PolicySettings::default();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let policy = PolicySettings {
            single_payment_limit: parse_or(
                &lookup,
                "SINGLE_PAYMENT_LIMIT",
                defaults.single_payment_limit,
            )?,
            daily_payment_limit: parse_or(
                &lookup,
                "DAILY_PAYMENT_LIMIT",
                defaults.daily_payment_limit,
            )?,
            fraud_threshold: parse_or(&lookup, "FRAUD_THRESHOLD", defaults.fraud_threshold)?,
            scheme_currency: lookup("SCHEME_CURRENCY").unwrap_or(defaults.scheme_currency),
            scheme_max_amount: parse_or::<Decimal>(
                &lookup,
                "SCHEME_MAX_AMOUNT",
                defaults.scheme_max_amount,
            )?,
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url,
            customer_api_url: lookup("CUSTOMER_API_URL")
                .unwrap_or_else(|| "http://localhost:4001".to_string()),
            funds_check_timeout: Duration::from_millis(parse_or(
                &lookup,
                "FUNDS_CHECK_TIMEOUT_MS",
                2000,
            )?),
            policy,
            daily_total_source: parse_or(&lookup, "DAILY_TOTAL_SOURCE", DailyTotalSource::None)?,
            rate_limit_per_minute: parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 100)?,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}
