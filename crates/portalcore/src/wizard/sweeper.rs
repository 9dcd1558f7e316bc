//! Background task that expires idle wizard sessions.
//!
//! Runs as a `tokio::spawn`ed task, emitting an [`ExpiryNotice`] per removed
//! session through an mpsc channel. The Telegram layer receives these and
//! tells the users their setup timed out.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::orchestrator::WizardOrchestrator;
use super::store::ExpiryNotice;

/// Start the expiry sweeper.
///
/// The task stops when `shutdown` is cancelled or when the returned receiver
/// is dropped.
pub fn start_sweeper(
    orchestrator: Arc<WizardOrchestrator>,
    every: Duration,
    shutdown: CancellationToken,
) -> (JoinHandle<()>, mpsc::UnboundedReceiver<ExpiryNotice>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Session sweeper started (interval: {}s, timeout: {}s)",
            every.as_secs(),
            orchestrator.config().session_timeout.as_secs()
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("Session sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let notices = orchestrator.sweep_expired(Utc::now());
                    if !notices.is_empty() {
                        log::info!("Expired {} wizard session(s)", notices.len());
                    }
                    for notice in notices {
                        if tx.send(notice).is_err() {
                            log::warn!("Expiry channel closed, stopping sweeper");
                            return;
                        }
                    }
                }
            }
        }
    });

    (handle, rx)
}
