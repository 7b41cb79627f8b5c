//! Keyed polling loop
//!
//! Fires a task immediately for the current key and then on a fixed
//! cadence. A key change drops the running ticker and starts over, so each
//! new key gets exactly one immediate fetch and a fresh cadence.

use super::PollTask;
use crate::models::LineId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Polling loop for one view
pub struct Poller {
    task: Arc<dyn PollTask>,
    /// `None` polls on key change only
    interval: Option<Duration>,
    keys: watch::Receiver<Option<LineId>>,
}

impl Poller {
    pub fn new(
        task: Arc<dyn PollTask>,
        interval: Option<Duration>,
        keys: watch::Receiver<Option<LineId>>,
    ) -> Self {
        Self {
            task,
            interval,
            keys,
        }
    }

    /// Run the loop on its own task
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> PollerHandle {
        PollerHandle {
            handle: tokio::spawn(self.run(shutdown)),
        }
    }

    /// Run until shutdown is signalled
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            view = self.task.name(),
            interval_secs = self.interval.map(|i| i.as_secs()),
            "Starting poller"
        );

        // Once every sender is gone the key can no longer change
        let mut keys_open = true;

        loop {
            let key = *self.keys.borrow_and_update();
            let mut ticker = match key {
                Some(key) => {
                    self.task.on_select(key).await;
                    self.fire(key);
                    self.interval.map(ticker_after)
                }
                None => None,
            };

            loop {
                tokio::select! {
                    _ = next_tick(&mut ticker) => {
                        if let Some(key) = key {
                            self.fire(key);
                        }
                    }
                    changed = self.keys.changed(), if keys_open => {
                        match changed {
                            Ok(()) => {
                                debug!(view = self.task.name(), "Poll key changed, restarting ticker");
                                break;
                            }
                            Err(_) => keys_open = false,
                        }
                    }
                    _ = shutdown.recv() => {
                        info!(view = self.task.name(), "Shutting down poller");
                        return;
                    }
                }
            }
        }
    }

    /// Start one tick on its own task so slow responses never delay the cadence
    fn fire(&self, key: LineId) {
        let task = Arc::clone(&self.task);
        tokio::spawn(async move {
            task.run(key).await;
        });
    }
}

/// First tick one full period from now
fn ticker_after(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Wait for the next tick, or forever when there is no ticker
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Owns a running poller; stopping or dropping it cancels the loop
#[derive(Debug)]
pub struct PollerHandle {
    handle: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
