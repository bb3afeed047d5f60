//! Reconnect coordinator simulation.
//!
//! Wires the coordinator to in-memory collaborators and replays a short
//! outage followed by a long one:
//!
//! ```text
//! resync-sim [config.toml]
//! ```

mod collaborators;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use resync_bus::{BusEvent, EventBus, HostEvent, Subscription};
use resync_coordinator::{
    CoordinatorConfig, CoordinatorDeps, CoordinatorSlot, RELOAD_THRESHOLD_SECS, Route, RouteTable,
};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::collaborators::{LoggingHost, LoggingStore, SkewedClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting resync simulation");

    let config = load_config(std::env::args_os().nth(1).map(PathBuf::from));

    let bus = EventBus::new();
    let host_events = EventBus::new();
    let clock = Arc::new(SkewedClock::default());
    let deps = CoordinatorDeps::new(
        Arc::new(LoggingStore::new(Duration::from_millis(50))),
        Arc::new(config.routes),
        Arc::new(LoggingHost),
        bus.clone(),
        host_events.clone(),
    )
    .with_clock(clock.clone());

    let (route_tx, route_rx) = watch::channel(Route::named("home"));
    let slot = CoordinatorSlot::new(deps);
    let coordinator = slot.get_instance(route_rx, Some(config.filters));
    coordinator.activate();

    let mut ui = bus.subscribe();

    // Short outage on the conversation list.
    bus.emit(BusEvent::Disconnect);
    tokio::time::sleep(Duration::from_secs(1)).await;
    host_events.emit(HostEvent::Online);
    bus.emit(BusEvent::Reconnect);
    wait_for_completion(&mut ui).await?;

    // Short outage while on the notification center.
    route_tx.send_replace(Route::named("notifications_index"));
    bus.emit(BusEvent::Disconnect);
    tokio::time::sleep(Duration::from_millis(200)).await;
    bus.emit(BusEvent::Reconnect);
    wait_for_completion(&mut ui).await?;

    // Long outage: the online signal forces a reload.
    bus.emit(BusEvent::Disconnect);
    tokio::time::sleep(Duration::from_millis(50)).await;
    clock.skip(RELOAD_THRESHOLD_SECS as i64 + 60);
    host_events.emit(HostEvent::Online);
    tokio::time::sleep(Duration::from_millis(50)).await;

    tracing::info!(phase = ?coordinator.phase(), "simulation finished");
    slot.reset_instance();
    Ok(())
}

/// Reads the config file if one was given, falling back to the built-in
/// routes when it is absent or unreadable.
fn load_config(path: Option<PathBuf>) -> CoordinatorConfig {
    let Some(path) = path else {
        tracing::warn!("no config given, using built-in routes");
        return default_config();
    };
    match CoordinatorConfig::load(&path) {
        Ok(c) => {
            tracing::info!(path = %path.display(), "configuration loaded");
            c
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            default_config()
        }
    }
}

async fn wait_for_completion(rx: &mut Subscription<BusEvent>) -> anyhow::Result<()> {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .context("timed out waiting for resync")?
            .context("signal bus closed")?;
        if event == BusEvent::ReconnectCompleted {
            tracing::info!("UI: reconnect completed");
            return Ok(());
        }
    }
}

fn names(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_config() -> CoordinatorConfig {
    CoordinatorConfig {
        routes: RouteTable {
            conversation: names(&["conversation_through_inbox", "inbox_conversation"]),
            conversation_base: names(&["home", "inbox_dashboard"]),
            inbox_view: names(&["inbox_view_conversation"]),
            inbox_view_base: names(&["inbox_view"]),
            notification: names(&["notifications_index"]),
        },
        ..CoordinatorConfig::default()
    }
}
