mod cli;
mod metric_defs;

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use metrics_exporter_prometheus::PrometheusBuilder;
use metrics_util::MetricKindMask;
use roster_api::AppState;
use roster_lib::netutils::parse_addr;
use roster_lib::{ConfigLoader, MainConfig};
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

fn setup_logging_subscriber(format: &LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_env_var("ROSTER_LOG")
        .try_from_env()
        .unwrap_or_else(|_| {
            "info,rosterd=debug,roster_api=debug,tower_http=info,\
             request_response_tracing=off,\
             request_response_tracing_metadata=info"
                .into()
        });
    let builder = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_env_filter(env_filter);
    match format {
        | LogFormat::Pretty => builder.pretty().init(),
        | LogFormat::Compact => builder.compact().init(),
        | LogFormat::Json => builder.json().init(),
    }
}

fn setup_prometheus(config: &MainConfig) -> Result<()> {
    // Configure Metric Exporter
    let prometheus_sockaddr =
        parse_addr(&config.prometheus_address, config.prometheus_port)?;
    let builder = PrometheusBuilder::new();
    info!("Prometheus HTTP listener on {:?}", prometheus_sockaddr);
    builder
        .idle_timeout(
            MetricKindMask::HISTOGRAM,
            // Remove a metric from registry if it was not updated for 2
            // minutes.
            Some(Duration::from_secs(120)),
        )
        .with_http_listener(prometheus_sockaddr)
        .install()
        .expect("failed to install Prometheus recorder");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for the interrupt signal: {e}");
        return;
    }
    warn!("Received interrupt signal, terminating server...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    match dotenvy::dotenv() {
        | Ok(_) => {}
        // .env files are optional
        | Err(e) if e.not_found() => {}
        | Err(e) => bail!("Failed to load .env file: {e}"),
    };

    let opts = cli::CliOpts::parse();
    setup_logging_subscriber(&opts.log_format);

    info!("** {} **", "roster".magenta());
    trace!(config = opts.config, "Loading configuration");
    let config = ConfigLoader::from_path(&opts.config).load()?;

    // Configure Metric Exporter
    setup_prometheus(&config.main)?;
    // Install metric definitions
    metric_defs::install_metrics();

    let state = AppState::in_memory(config);
    roster_api::start_api_server(state, shutdown_signal()).await
}
