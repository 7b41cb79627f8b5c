//! Polling scheduler
//!
//! Each view runs one [`Poller`] that re-fetches its data on the view's own
//! cadence and restarts whenever the selected line changes.

mod scheduler;


pub use scheduler::{Poller, PollerHandle};

use crate::models::LineId;
use async_trait::async_trait;

/// Work performed on every tick of a poller
///
/// `run` handles its own errors; a failed tick never stops the loop.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    /// Name used in logs and metrics
    fn name(&self) -> &str;

    /// Called once per key before its first tick
    async fn on_select(&self, _key: LineId) {}

    async fn run(&self, key: LineId);
}
