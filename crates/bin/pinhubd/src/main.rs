//! # pinhubd: pinhub daemon
//!
//! Composition root that wires all adapters together and serves the
//! platform over stdin/stdout.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the tracing subscriber (stderr; stdout carries the protocol)
//! - Open the settings file and build the device registry over it
//! - Build the command table and the stdio session
//! - Stop every device on EOF or SIGINT so offline events go out
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use anyhow::Context;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use pinhub_adapter_settings_json::JsonSettingsStore;
use pinhub_adapter_stdio::Session;
use pinhub_app::commands::CommandTable;
use pinhub_app::event_bus::InProcessEventBus;
use pinhub_app::registry::DeviceRegistry;
use pinhub_domain::pin::Pin;

use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let store = JsonSettingsStore::open(&config.storage.data_dir)
        .context("failed to open settings file")?;
    tracing::info!(path = %store.path().display(), "settings file ready");

    let (bus, outbound) = InProcessEventBus::channel();
    let registry = DeviceRegistry::new(store, bus.clone(), bus)
        .with_board_pins(config.board.pins.iter().copied().map(Pin::new));
    let commands = CommandTable::new()?;
    let mut session = Session::new(registry, commands, outbound);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        result = session.run(stdin, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupt received"),
    }

    session.shutdown(&mut stdout).await?;
    tracing::info!("pinhubd stopped");
    Ok(())
}
