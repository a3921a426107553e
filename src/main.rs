//! Cloud configuration refresher.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   GET + If-None-Match   ┌──────────────┐
//!   │  scheduler   │────────────────────────▶│  transport   │────▶ config server
//!   └──────┬───────┘                         └──────────────┘
//!          │ gunzipped YAML
//!          ▼
//!   ┌──────────────┐  atomic swap   ┌──────────────┐  trust pool   ┌──────────────┐
//!   │   updater    │───────────────▶│ live config  │──────────────▶│ fronted      │
//!   └──────────────┘                └──────────────┘               │ routing      │
//!                                                                  └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast;

use config_refresh::fetch::{ConfigFetcher, DirectTransport};
use config_refresh::observability::{logging, metrics};
use config_refresh::security::FrontedRouter;
use config_refresh::settings::load_settings;
use config_refresh::{RefreshContext, RefreshScheduler, RefreshSettings, Refresher};

#[derive(Parser)]
#[command(name = "config-refresh")]
#[command(about = "Keeps the client configuration in sync with the cloud copy", long_about = None)]
struct Cli {
    /// Settings file (TOML). Compiled-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single refresh cycle and exit.
    #[arg(long)]
    once: bool,

    /// Print the live configuration as JSON before exiting.
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => RefreshSettings::default(),
    };

    logging::init_logging(&settings.observability.log_level);
    tracing::info!("config-refresh v0.1.0 starting");

    tracing::info!(
        primary_url = %settings.endpoints.primary_url,
        interval_secs = settings.schedule.interval_secs,
        etag_policy = ?settings.fetch.etag_policy,
        "Settings loaded"
    );

    if settings.observability.metrics_enabled {
        if let Ok(addr) = settings.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %settings.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let transport = Arc::new(DirectTransport::new(Duration::from_secs(settings.fetch.timeout_secs))?);
    let fetcher = ConfigFetcher::new(transport, &settings)?;
    let context = Arc::new(RefreshContext::default());
    let router = Arc::new(FrontedRouter::new());
    let refresher = Arc::new(Refresher::new(context.clone(), fetcher, router));

    // The embedded defaults must yield a working trust pool.
    let pool = refresher.bootstrap().await?;
    tracing::info!(trusted_roots = pool.len(), "Bootstrap security settings applied");

    let scheduler = RefreshScheduler::new(refresher, &settings.schedule);

    if cli.once {
        let outcome = scheduler.tick().await;
        tracing::info!(outcome = ?outcome, "Single refresh cycle finished");
    } else {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
        handle.await?;
    }

    if cli.print {
        println!("{}", serde_json::to_string_pretty(context.snapshot().as_ref())?);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
