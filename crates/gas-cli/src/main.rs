//! Gas Glance - multi-chain gas price snapshot
//!
//! Runs one aggregation pass over the configured chains and prints the
//! resulting fee records as JSON on stdout.

mod settings;

use std::env;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gas_feed::{AggregatorConfig, GasAggregator};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = env::var("GAS_GLANCE_LOG_JSON").map(|v| v == "1" || v == "true").unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        }
        _ = terminate => {
            info!("Received termination signal");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    init_logging();

    info!("Starting Gas Glance v{}", env!("CARGO_PKG_VERSION"));

    let config = settings::load()?;
    let registry = config.registry()?;
    let aggregator_config = AggregatorConfig::from(&config);

    info!(
        "Querying {} chains (timeout {:?}, unit {})",
        registry.len(),
        aggregator_config.query_timeout,
        aggregator_config.fee_unit
    );

    let aggregator = GasAggregator::new(registry, aggregator_config);

    let outcome = tokio::select! {
        result = aggregator.query_all() => Some(result),
        _ = shutdown_signal() => None,
    };

    // Dispose before reporting so handles are released on every path
    aggregator.dispose().await;

    match outcome {
        Some(Ok(records)) => {
            let registered = aggregator.registry().len();
            if records.len() < registered {
                warn!("{} of {} chains reported", records.len(), registered);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        Some(Err(e)) => {
            error!("Aggregation failed: {}", e);
            Err(e.into())
        }
        None => {
            info!("Aggregation aborted");
            Ok(())
        }
    }
}
