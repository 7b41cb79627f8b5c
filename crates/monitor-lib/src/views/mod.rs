//! Per-view subscriptions
//!
//! A view pairs a [`ViewFetcher`] (what to request and how to derive its
//! payload) with a [`SharedView`](crate::reconcile::SharedView) and a
//! poller on the view's cadence.

mod fetchers;
mod runner;


pub use fetchers::{
    AnalyticsFetcher, BatchesFetcher, ChartFetcher, DashboardFetcher, MaintenanceFetcher,
    OeeFetcher, QualityFetcher, QualitySummaryFetcher, QualitySummaryView,
};
pub use runner::{LineListTask, Monitor, MonitorOptions, ViewContext, ViewTask, Views};

use crate::gateway::{GatewayError, LineDataSource};
use crate::models::LineId;
use async_trait::async_trait;
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Dashboard,
    Oee,
    Maintenance,
    Quality,
    Batches,
    Chart,
    QualitySummary,
    Analytics,
}

impl ViewKind {
    pub const ALL: [ViewKind; 8] = [
        ViewKind::Dashboard,
        ViewKind::Oee,
        ViewKind::Maintenance,
        ViewKind::Quality,
        ViewKind::Batches,
        ViewKind::Chart,
        ViewKind::QualitySummary,
        ViewKind::Analytics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Dashboard => "dashboard",
            ViewKind::Oee => "oee",
            ViewKind::Maintenance => "maintenance",
            ViewKind::Quality => "quality",
            ViewKind::Batches => "batches",
            ViewKind::Chart => "chart",
            ViewKind::QualitySummary => "quality-summary",
            ViewKind::Analytics => "analytics",
        }
    }

    /// Refresh period; `None` refreshes on selection or range change only
    pub fn cadence(&self) -> Option<Duration> {
        let secs = match self {
            ViewKind::Dashboard => 10,
            ViewKind::Oee => 30,
            ViewKind::Maintenance => 60,
            ViewKind::Quality => 30,
            ViewKind::Batches => 45,
            ViewKind::Chart => 60,
            ViewKind::QualitySummary => 60,
            ViewKind::Analytics => return None,
        };
        Some(Duration::from_secs(secs))
    }

    /// Whether the view follows the selected production line
    pub fn is_line_scoped(&self) -> bool {
        !matches!(
            self,
            ViewKind::Batches | ViewKind::Chart | ViewKind::QualitySummary
        )
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view `{0}`")]
pub struct UnknownView(pub String);

impl FromStr for ViewKind {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

/// Fetches and derives one view's payload for a line
#[async_trait]
pub trait ViewFetcher: Send + Sync + 'static {
    type Payload: Clone + Serialize + Send + Sync + 'static;

    fn kind(&self) -> ViewKind;

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        line: LineId,
    ) -> Result<Self::Payload, GatewayError>;

    /// Whether a finished payload still matches the view's parameters
    fn is_current(&self, _payload: &Self::Payload) -> bool {
        true
    }

    /// Called after a payload has been applied to the view
    fn on_applied(&self, _line: LineId, _payload: &Self::Payload, _ctx: &ViewContext) {}
}
