//! Spectate - headless viewer for a live battle.
//!
//! Follows the live-state stream with the same connection manager the browser
//! viewer uses and logs what happens in the arena.

mod config;
mod tracker;

use client::{Action, ConnectionManager, TransportEvent};
use config::SpectatorConfig;
use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracker::BattleLog;

/// Reported when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;
/// Reported for a close frame without a status code.
const NO_STATUS: u16 = 1005;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Arena spectator v{}", env!("CARGO_PKG_VERSION"));

    let config = SpectatorConfig::load()?;
    let endpoint = config.endpoint();
    info!("Loaded configuration");
    info!("  Endpoint: {}", endpoint.url());
    info!("  Reconnect delay: {}ms", config.client.reconnect_delay_ms);

    let mut manager = ConnectionManager::new(endpoint.url(), config.client.reconnect_delay());
    let mut log = BattleLog::new();

    tokio::select! {
        _ = run(&mut manager, &mut log) => {
            warn!("Connection manager went idle");
        }
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down");
        }
    }

    info!(
        attempts = manager.attempts(),
        dropped = manager.dropped_messages(),
        snapshots = log.snapshots(),
        "Spectator finished"
    );
    Ok(())
}

/// Carry out the manager's actions until it has nothing left to ask for.
async fn run(manager: &mut ConnectionManager, log: &mut BattleLog) {
    let mut next = Some(manager.start());
    while let Some(action) = next.take() {
        next = match action {
            Action::Connect(url) => watch(manager, log, &url).await,
            Action::ScheduleReconnect(delay) => {
                tokio::time::sleep(delay).await;
                Some(manager.reconnect_due())
            }
            Action::Publish(snapshot) => {
                log.observe(&snapshot);
                None
            }
        };
    }
}

/// One connection, from handshake to close. Returns the manager's follow-up.
async fn watch(manager: &mut ConnectionManager, log: &mut BattleLog, url: &str) -> Option<Action> {
    let mut stream = match connect_async(url).await {
        Ok((stream, _response)) => stream,
        Err(e) => return manager.handle(TransportEvent::Error(e.to_string())),
    };
    if let Some(action) = manager.handle(TransportEvent::Open) {
        return Some(action);
    }

    while let Some(message) = stream.next().await {
        let event = match message {
            Ok(Message::Text(text)) => TransportEvent::Message(text.as_str().to_owned()),
            Ok(Message::Close(frame)) => TransportEvent::Closed {
                code: frame.map(|f| u16::from(f.code)).unwrap_or(NO_STATUS),
            },
            Ok(_) => continue,
            Err(e) => TransportEvent::Error(e.to_string()),
        };
        match manager.handle(event) {
            Some(Action::Publish(snapshot)) => {
                log.observe(&snapshot);
            }
            Some(action) => return Some(action),
            None => {}
        }
    }

    manager.handle(TransportEvent::Closed {
        code: ABNORMAL_CLOSURE,
    })
}
