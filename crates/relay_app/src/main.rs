mod cli;
mod config;
mod progress;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use relay_core::ServerSet;
use relay_engine::{Scheduler, SinkHandle, SinkService};
use relay_logging::{relay_error, relay_info, relay_warn};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::RelayConfig;
use crate::progress::TerminalProgress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = RelayConfig::from_cli(&cli).context("could not load configuration")?;
    relay_logging::initialize(config.log_destination(), config.log_level());

    let servers = resolve_servers(&config)?;
    let sink = start_sink(&config).await;

    let progress = Arc::new(TerminalProgress::new());
    let mut scheduler = Scheduler::new(config.scheduler_settings(servers), progress)
        .context("could not build http client")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            relay_info!("Interrupted, stopping after the current cycle");
            on_signal.cancel();
        }
    });

    relay_info!("start running the tasks...");
    scheduler.run(cancel).await;

    if let Some(sink) = sink {
        tokio::task::spawn_blocking(move || sink.shutdown())
            .await
            .context("image sink did not shut down cleanly")?;
    }
    Ok(())
}

/// A bad server list is fatal only when distribution will actually use it.
fn resolve_servers(config: &RelayConfig) -> anyhow::Result<ServerSet> {
    match config.server_set() {
        Ok(servers) => Ok(servers),
        Err(err) if config.distribute => Err(err).context("invalid server list"),
        Err(err) => {
            relay_warn!("Ignoring server list: {}", err);
            Ok(ServerSet::empty())
        }
    }
}

async fn start_sink(config: &RelayConfig) -> Option<SinkHandle> {
    if !config.start_sink {
        return None;
    }
    relay_info!("starting local web server to receive images...");
    match SinkService::start(config.sink_settings()).await {
        Ok(handle) => {
            relay_info!("Local web server receiving at {}", handle.base_url());
            Some(handle)
        }
        Err(err) => {
            relay_error!("Failed to start local web server! {}", err);
            None
        }
    }
}
