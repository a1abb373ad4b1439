//! Progress reporting (spec §4.5 "Progress contract"): emitted after every
//! processed file and at ≤5s intervals otherwise, forwarded by the MCP tool
//! handler as RPC notifications.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;

pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub stage: &'static str,
    pub current: usize,
    pub total: usize,
    pub message: String,
    pub eta_seconds: Option<f64>,
}

/// Throttled emitter: forces through after every processed file, or at
/// worst every [`PROGRESS_INTERVAL`].
pub struct ProgressReporter {
    tx: broadcast::Sender<ProgressEvent>,
    started_at: Instant,
    last_emit: Instant,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(tx: broadcast::Sender<ProgressEvent>) -> Self {
        let now = Instant::now();
        Self {
            tx,
            started_at: now,
            last_emit: now,
        }
    }

    pub fn emit_for_file(&mut self, stage: &'static str, current: usize, total: usize, message: String) {
        self.emit(stage, current, total, message);
    }

    pub fn emit_if_due(&mut self, stage: &'static str, current: usize, total: usize, message: String) {
        if self.last_emit.elapsed() >= PROGRESS_INTERVAL {
            self.emit(stage, current, total, message);
        }
    }

    fn emit(&mut self, stage: &'static str, current: usize, total: usize, message: String) {
        let eta_seconds = if current == 0 || total == 0 {
            None
        } else {
            let elapsed = self.started_at.elapsed().as_secs_f64();
            let remaining = total.saturating_sub(current) as f64;
            Some(remaining * (elapsed / current as f64))
        };
        self.last_emit = Instant::now();
        // A closed receiver (no subscriber) is not an error condition.
        let _ = self.tx.send(ProgressEvent {
            stage,
            current,
            total,
            message,
            eta_seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eta_is_none_before_any_progress() {
        let (tx, mut rx) = broadcast::channel(8);
        let mut reporter = ProgressReporter::new(tx);
        reporter.emit_for_file("parse", 0, 10, "starting".to_string());
        let event = rx.try_recv().unwrap();
        assert!(event.eta_seconds.is_none());
    }
}
