//! # Payment Initiation Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize tracing (plus OTLP export when configured)
//! - Initialize the Payment Store adapter
//! - Create the funds check, policies and orchestrator
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use initiation_hex::{FundsChecker, PaymentService, inbound::HttpServer, outbound::HttpFundsOracle};
use initiation_repo::build_repo;
use initiation_types::PolicySet;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing; endpoint comes from OTEL_EXPORTER_OTLP_ENDPOINT
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("payment-initiation"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    let otel = match config.otlp_endpoint {
        Some(_) => Some(init_tracer()?),
        None => None,
    };
    let (otel_tracer, otel_provider) = match otel {
        Some((tracer, provider)) => (Some(tracer), Some(provider)),
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,initiation_app=debug,initiation_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(otel_tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
        .init();

    tracing::info!("Starting payment initiation server on port {}", config.port);

    // Build store (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    tracing::info!(backend = repo.backend(), "Payment store ready");

    // Funds check against the customer service
    let oracle = HttpFundsOracle::new(&config.customer_api_url);
    let funds = FundsChecker::with_timeout(oracle, config.funds_check_timeout);
    tracing::info!(
        customer_api = %config.customer_api_url,
        timeout_ms = config.funds_check_timeout.as_millis() as u64,
        "Funds oracle configured"
    );

    // Create the orchestrator
    let policies = PolicySet::from_settings(&config.policy)?;
    let service = PaymentService::new(repo, funds, policies)
        .with_daily_totals(config.daily_total_source);

    // Create and run the HTTP server
    let server = HttpServer::with_rate_limit(service, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        flush_traces(&provider);
    }
    Ok(())
}

/// Shuts the provider down, returning false (and logging) when spans may
/// have been lost.
fn flush_traces(provider: &sdktrace::SdkTracerProvider) -> bool {
    match provider.shutdown() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to flush traces on shutdown");
            false
        }
    }
}
