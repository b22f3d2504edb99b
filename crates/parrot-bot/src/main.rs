//! parrot - trigger-and-reply bot on a console transport.
//!
//! # Configuration
//!
//! - `PARROT_CONFIG` - optional store config file (.toml/.json/.yaml)
//! - `PARROT_BACKEND` - `sqlite` (default) or `flat_file`
//! - `PARROT_STORE_PATH` - store location, defaults to `~/.parrot/`
//! - `PARROT_CHAT_ID`, `PARROT_USERNAME` - identity of the console user
//!
//! Replies are printed to stdout as JSON lines; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use parrot_bot::{console, BotConfig, ConsoleTransport, Dispatcher, Sender};
use parrot_core::TriggerService;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs to stderr, stdout carries the transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotConfig::from_env()?;
    info!(
        backend = %config.store.backend,
        path = %config.store.resolved_path().display(),
        chat_id = config.chat_id,
        "Starting parrot"
    );

    let service =
        TriggerService::from_config(&config.store).context("failed to open trigger store")?;
    let dispatcher = Dispatcher::new(Arc::new(service));
    let mut transport = ConsoleTransport::new(config.chat_id, Sender::new(0, config.username));

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = console::run(&dispatcher, &mut transport, stdin, stdout) => {
            let handled = result?;
            info!(handled, "Input closed, stopping");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
