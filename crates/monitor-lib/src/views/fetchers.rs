use super::{ViewContext, ViewFetcher, ViewKind};
use crate::derive::{
    build_analytics, build_maintenance, build_quality, derive_oee, summarize_quality,
    AnalyticsSnapshot, DerivedOee, MaintenanceSnapshot, MetricSet, OeeInputs, QualityOverview,
    QualitySnapshot, SharedNoise, TimeRange,
};
use crate::gateway::{GatewayError, LineDataSource};
use crate::models::{BatchList, ChartSeries, LineId, LineMetricsResponse, QualitySummary};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;

async fn line_samples(source: &dyn LineDataSource, line: LineId) -> Result<MetricSet, GatewayError> {
    Ok(MetricSet::new(source.line_metrics(line).await?.metrics))
}

/// Raw real-time metric cards of the selected line
#[derive(Debug, Default)]
pub struct DashboardFetcher;

#[async_trait]
impl ViewFetcher for DashboardFetcher {
    type Payload = LineMetricsResponse;

    fn kind(&self) -> ViewKind {
        ViewKind::Dashboard
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        line: LineId,
    ) -> Result<LineMetricsResponse, GatewayError> {
        source.line_metrics(line).await
    }
}

#[derive(Debug)]
pub struct OeeFetcher {
    noise: SharedNoise,
}

impl OeeFetcher {
    pub fn new(noise: SharedNoise) -> Self {
        Self { noise }
    }
}

#[async_trait]
impl ViewFetcher for OeeFetcher {
    type Payload = DerivedOee;

    fn kind(&self) -> ViewKind {
        ViewKind::Oee
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        line: LineId,
    ) -> Result<DerivedOee, GatewayError> {
        let inputs = OeeInputs::from_samples(&line_samples(source, line).await?);
        Ok(self.noise.with(|noise| derive_oee(inputs, noise)))
    }

    fn on_applied(&self, line: LineId, payload: &DerivedOee, ctx: &ViewContext) {
        ctx.metrics.set_oee(line, payload.oee);
        ctx.logger.log_oee(line, payload.oee, payload.status.as_str());
    }
}

#[derive(Debug)]
pub struct MaintenanceFetcher {
    noise: SharedNoise,
}

impl MaintenanceFetcher {
    pub fn new(noise: SharedNoise) -> Self {
        Self { noise }
    }
}

#[async_trait]
impl ViewFetcher for MaintenanceFetcher {
    type Payload = MaintenanceSnapshot;

    fn kind(&self) -> ViewKind {
        ViewKind::Maintenance
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        line: LineId,
    ) -> Result<MaintenanceSnapshot, GatewayError> {
        let samples = line_samples(source, line).await?;
        let today = Utc::now().date_naive();
        Ok(self
            .noise
            .with(|noise| build_maintenance(&samples, today, noise)))
    }
}

#[derive(Debug)]
pub struct QualityFetcher {
    noise: SharedNoise,
}

impl QualityFetcher {
    pub fn new(noise: SharedNoise) -> Self {
        Self { noise }
    }
}

#[async_trait]
impl ViewFetcher for QualityFetcher {
    type Payload = QualitySnapshot;

    fn kind(&self) -> ViewKind {
        ViewKind::Quality
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        line: LineId,
    ) -> Result<QualitySnapshot, GatewayError> {
        let samples = line_samples(source, line).await?;
        let now = Utc::now();
        Ok(self
            .noise
            .with(|noise| build_quality(line, &samples, now, noise)))
    }
}

/// Recent batches across the plant
#[derive(Debug)]
pub struct BatchesFetcher {
    limit: u32,
}

impl BatchesFetcher {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl ViewFetcher for BatchesFetcher {
    type Payload = BatchList;

    fn kind(&self) -> ViewKind {
        ViewKind::Batches
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        _line: LineId,
    ) -> Result<BatchList, GatewayError> {
        source.batches(self.limit).await
    }
}

#[derive(Debug, Default)]
pub struct ChartFetcher;

#[async_trait]
impl ViewFetcher for ChartFetcher {
    type Payload = ChartSeries;

    fn kind(&self) -> ViewKind {
        ViewKind::Chart
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        _line: LineId,
    ) -> Result<ChartSeries, GatewayError> {
        source.production_chart().await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QualitySummaryView {
    pub summary: QualitySummary,
    pub overview: QualityOverview,
}

#[derive(Debug, Default)]
pub struct QualitySummaryFetcher;

#[async_trait]
impl ViewFetcher for QualitySummaryFetcher {
    type Payload = QualitySummaryView;

    fn kind(&self) -> ViewKind {
        ViewKind::QualitySummary
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        _line: LineId,
    ) -> Result<QualitySummaryView, GatewayError> {
        let summary = source.quality_metrics().await?;
        let overview = summarize_quality(&summary);
        Ok(QualitySummaryView { summary, overview })
    }
}

/// Analytics for the selected line over the selected range
///
/// A payload computed for a range that has since been replaced is not
/// current and gets discarded.
#[derive(Debug)]
pub struct AnalyticsFetcher {
    noise: SharedNoise,
    range: watch::Receiver<TimeRange>,
}

impl AnalyticsFetcher {
    pub fn new(noise: SharedNoise, range: watch::Receiver<TimeRange>) -> Self {
        Self { noise, range }
    }

    pub fn range(&self) -> TimeRange {
        *self.range.borrow()
    }
}

#[async_trait]
impl ViewFetcher for AnalyticsFetcher {
    type Payload = AnalyticsSnapshot;

    fn kind(&self) -> ViewKind {
        ViewKind::Analytics
    }

    async fn fetch(
        &self,
        source: &dyn LineDataSource,
        line: LineId,
    ) -> Result<AnalyticsSnapshot, GatewayError> {
        let range = self.range();
        let samples = line_samples(source, line).await?;
        Ok(self
            .noise
            .with(|noise| build_analytics(&samples, range, noise)))
    }

    fn is_current(&self, payload: &AnalyticsSnapshot) -> bool {
        payload.range == self.range()
    }
}
