use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use npe_server::app;
use npe_server::cli::Cli;
use npe_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting nagios_plugin_exporter"
    );

    let state = AppState::new(&cli).context("setting up telemetry")?;

    state
        .store
        .reload(&cli.config_file)
        .context("loading config")?;

    if cli.config_check {
        info!("Config file is ok exiting...");
        return Ok(());
    }

    info!(config_file = %cli.config_file.display(), "Loaded config file");

    watch_config(state.clone())?;

    let listener = tokio::net::TcpListener::bind(&cli.listen_address)
        .await
        .with_context(|| format!("binding {}", cli.listen_address))?;
    info!(address = %cli.listen_address, "Listening on");

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

/// Re-reads the configuration whenever the process receives SIGHUP.
fn watch_config(state: AppState) -> anyhow::Result<()> {
    let mut hup = unix_signal(SignalKind::hangup()).context("installing SIGHUP handler")?;

    tokio::spawn(async move {
        while hup.recv().await.is_some() {
            match state.reload() {
                Ok(()) => info!("Reloaded config file"),
                Err(err) => error!(%err, "Error reloading config"),
            }
        }
    });

    Ok(())
}

async fn shutdown_signal() {
    let mut term = match unix_signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            error!(%err, "Unable to install SIGTERM handler");
            return signal::ctrl_c().await.unwrap_or_default();
        }
    };

    tokio::select! {
        _ = signal::ctrl_c() => {}
        _ = term.recv() => {}
    }

    info!("Received SIGTERM, exiting gracefully...");
}
