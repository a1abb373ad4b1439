//! Graceful shutdown on SIGTERM/SIGINT.

use std::sync::Arc;

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::sync::Notify;

/// Spawns a task that listens for SIGTERM/SIGINT and notifies `shutdown`
/// the first time either arrives.
pub fn spawn_signal_listener(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        let Ok(mut signals) = Signals::new([SIGTERM, SIGINT]) else {
            tracing::error!("failed to register signal handler");
            return;
        };
        if let Some(signal) = signals.next().await {
            tracing::info!(signal, "received shutdown signal");
            shutdown.notify_waiters();
        }
    });
}
