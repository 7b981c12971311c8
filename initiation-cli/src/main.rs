//! Payment Initiation CLI
//!
//! Command-line interface for the Payment Initiation API.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use initiation_client::InitiationClient;
use initiation_types::{AccountRef, AccountType, InitiatePaymentRequest, PaymentId, PaymentStatus};

#[derive(Parser)]
#[command(name = "payinit")]
#[command(author, version, about = "Payment Initiation API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Payment Initiation API
    #[arg(long, env = "PAYINIT_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Identity sent as X-Client-Id (rate limit bucket)
    #[arg(long, env = "PAYINIT_CLIENT_ID")]
    client_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Initiate a payment
    Initiate {
        /// Debtor account ID
        #[arg(long)]
        debtor: String,
        /// Customer owning the debtor account
        #[arg(long)]
        customer: String,
        /// Debtor account type (Current, Savings, External)
        #[arg(long, default_value = "Current")]
        debtor_type: String,
        #[arg(long)]
        debtor_iban: Option<String>,
        /// Creditor account ID
        #[arg(long)]
        creditor: String,
        #[arg(long, default_value = "Current")]
        creditor_type: String,
        #[arg(long)]
        creditor_iban: Option<String>,
        /// Amount in major units, e.g. 10.50
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "GBP")]
        currency: String,
        #[arg(long)]
        reference: Option<String>,
        /// Requested execution date (YYYY-MM-DD)
        #[arg(long)]
        execution_date: Option<NaiveDate>,
    },
    /// Get a payment initiation
    Get {
        /// Payment initiation ID (UUID)
        id: String,
    },
    /// List all payment initiations
    List,
    /// Execute a pending payment
    Execute {
        /// Payment initiation ID (UUID)
        id: String,
    },
    /// Send a status notification
    Notify {
        /// Payment initiation ID (UUID)
        id: String,
        /// New status (COMPLETED or FAILED); omit to only acknowledge
        #[arg(long)]
        status: Option<String>,
    },
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment initiation ID: {}", s))
}

fn account(id: String, kind: &str, iban: Option<String>) -> Result<AccountRef> {
    let kind: AccountType = kind.parse()?;
    let mut account = AccountRef::new(id, kind);
    if let Some(iban) = iban {
        account = account.with_iban(iban);
    }
    Ok(account)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = InitiationClient::new(&cli.api_url);
    if let Some(id) = cli.client_id {
        client = client.with_client_id(id);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Initiate {
            debtor,
            customer,
            debtor_type,
            debtor_iban,
            creditor,
            creditor_type,
            creditor_iban,
            amount,
            currency,
            reference,
            execution_date,
        } => {
            let req = InitiatePaymentRequest {
                debtor_account: account(debtor, &debtor_type, debtor_iban)?
                    .with_customer(customer),
                creditor_account: account(creditor, &creditor_type, creditor_iban)?,
                amount,
                currency: currency.to_uppercase(),
                reference,
                requested_execution_date: execution_date,
            };
            let created = client.initiate(&req).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }

        Commands::Get { id } => {
            let payment = client.get_payment(parse_payment_id(&id)?).await?;
            println!("{}", serde_json::to_string_pretty(&payment)?);
        }

        Commands::List => {
            let payments = client.list_payments().await?;
            println!("{}", serde_json::to_string_pretty(&payments)?);
        }

        Commands::Execute { id } => {
            let executed = client.execute(parse_payment_id(&id)?).await?;
            println!("{}", serde_json::to_string_pretty(&executed)?);
        }

        Commands::Notify { id, status } => {
            let status = status
                .map(|s| s.to_uppercase().parse::<PaymentStatus>())
                .transpose()?;
            let ack = client.notify(parse_payment_id(&id)?, status).await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);
        }
    }

    Ok(())
}
