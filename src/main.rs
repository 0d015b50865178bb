//! Probe Monitoring Agent (v0.1)
//!
//! Synthetic monitoring agent whose probe configuration stays live:
//! local config files are re-read on filesystem change notifications and
//! remote config URLs are polled on a fixed interval, with every accepted
//! document atomically replacing the shared snapshot the rest of the
//! process reads.
//!
//! # Architecture Overview
//!
//! ```text
//!   --config file.json ──▶ FileWatcher ─┐
//!   --config https://…  ──▶ UrlPoller  ─┼──▶ ConfigApplier ──▶ SharedConfig
//!   --config …          ──▶ …          ─┘        (validate,        ▲
//!                                                 atomic swap)     │ current()
//!                                                                  │ subscribe()
//!                                                        configuration consumers
//! ```
//!
//! The binary wires the watch subsystem together and logs every accepted
//! reload; probe execution consumes the snapshot through the library API.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use probe_monitor::config::snapshot::{ConfigApplier, SharedConfig};
use probe_monitor::watch::registry::WatcherRegistry;
use probe_monitor::watch::source::ConfigLocation;

/// Synthetic monitoring agent with live configuration reload.
#[derive(Debug, Parser)]
#[command(name = "probe-monitor", version)]
struct Cli {
    /// Configuration locations: local JSON files or http(s) URLs.
    #[arg(short = 'c', long = "config", required = true, num_args = 1..)]
    config: Vec<String>,

    /// Seconds between polls of URL config locations.
    #[arg(long = "config-interval", default_value_t = 900)]
    config_interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "probe_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("probe-monitor v0.1.0 starting");

    let shared = Arc::new(SharedConfig::new());
    let applier = ConfigApplier::new(shared.clone());
    let registry = WatcherRegistry::new(applier, Duration::from_secs(cli.config_interval));

    let locations: Vec<ConfigLocation> = cli
        .config
        .iter()
        .map(|raw| ConfigLocation::classify(raw))
        .collect();

    let report = registry.start(locations);
    if report.handles.is_empty() {
        return Err("no config watcher could be started".into());
    }

    tracing::info!(
        watchers = report.handles.len(),
        failed = report.failures.len(),
        config_interval_secs = cli.config_interval,
        "Config watchers running"
    );

    let mut updates = shared.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let generation = *updates.borrow_and_update();
                if let Some(config) = shared.current() {
                    tracing::info!(
                        generation,
                        probes = config.probes.len(),
                        version = config.version.as_deref().unwrap_or(""),
                        "Configuration applied"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, stopping watchers");
                break;
            }
        }
    }

    for handle in &report.handles {
        handle.cancel();
    }
    for handle in report.handles {
        handle.join().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
