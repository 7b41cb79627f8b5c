//! View tasks and the monitor that runs them

use super::fetchers::{
    AnalyticsFetcher, BatchesFetcher, ChartFetcher, DashboardFetcher, MaintenanceFetcher,
    OeeFetcher, QualityFetcher, QualitySummaryFetcher, QualitySummaryView,
};
use super::{ViewFetcher, ViewKind};
use crate::derive::{
    AnalyticsSnapshot, DerivedOee, MaintenanceSnapshot, QualitySnapshot, SharedNoise, TimeRange,
};
use crate::gateway::{GatewayError, LineDataSource};
use crate::health::{components, HealthRegistry};
use crate::models::{BatchList, ChartSeries, LineId, LineMetricsResponse, ProductionLine};
use crate::observability::{MonitorMetrics, StructuredLogger};
use crate::poller::{PollTask, Poller, PollerHandle};
use crate::reconcile::{ApplyOutcome, Selection, SelectionError, SharedView, GLOBAL_SCOPE};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Shared sinks every view reports into
#[derive(Clone)]
pub struct ViewContext {
    pub health: HealthRegistry,
    pub metrics: MonitorMetrics,
    pub logger: StructuredLogger,
}

/// Polls one view: fetch, derive, reconcile
pub struct ViewTask<F: ViewFetcher> {
    fetcher: F,
    source: Arc<dyn LineDataSource>,
    view: SharedView<F::Payload>,
    ctx: ViewContext,
}

impl<F: ViewFetcher> ViewTask<F> {
    pub fn new(
        fetcher: F,
        source: Arc<dyn LineDataSource>,
        view: SharedView<F::Payload>,
        ctx: ViewContext,
    ) -> Self {
        Self {
            fetcher,
            source,
            view,
            ctx,
        }
    }

    pub fn view(&self) -> &SharedView<F::Payload> {
        &self.view
    }

    /// Fetch once for `line` and apply the result if it is still wanted
    pub async fn refresh(&self, line: LineId) -> ApplyOutcome {
        let name = self.fetcher.kind().name();
        let start = Instant::now();
        let result = self.fetcher.fetch(self.source.as_ref(), line).await;
        let elapsed = start.elapsed();
        self.ctx
            .metrics
            .observe_poll_latency(name, elapsed.as_secs_f64());

        let outcome = match result {
            Ok(payload) => {
                if !self.fetcher.is_current(&payload) {
                    debug!(view = name, line, "Discarding payload for outdated parameters");
                    self.ctx.metrics.inc_stale_discards(name);
                    return ApplyOutcome::Discarded {
                        selected: line,
                        response: line,
                    };
                }

                let mut state = self.view.write().await;
                let outcome = state.apply_success(line, payload);
                if let (ApplyOutcome::Applied, Some(data)) = (outcome, state.data.as_ref()) {
                    self.fetcher.on_applied(line, data, &self.ctx);
                }
                drop(state);

                if outcome.is_applied() {
                    self.ctx.health.set_healthy(name).await;
                    self.ctx
                        .logger
                        .log_tick_applied(name, line, elapsed.as_millis());
                }
                outcome
            }
            Err(err) => self.record_failure(name, line, err).await,
        };

        if let ApplyOutcome::Discarded { selected, response } = outcome {
            self.ctx.metrics.inc_stale_discards(name);
            self.ctx.logger.log_stale_response(name, selected, response);
        }
        outcome
    }

    async fn record_failure(&self, name: &str, line: LineId, err: GatewayError) -> ApplyOutcome {
        let kind = err.kind().as_str();
        self.ctx.metrics.inc_poll_errors(name, kind);

        let message = err.to_string();
        let outcome = self.view.apply_failure(line, &message).await;
        if outcome.is_applied() {
            self.ctx.health.set_degraded(name, message.as_str()).await;
            self.ctx.logger.log_tick_failed(name, line, kind, &message);
        }
        outcome
    }
}

#[async_trait]
impl<F: ViewFetcher> PollTask for ViewTask<F> {
    fn name(&self) -> &str {
        self.fetcher.kind().name()
    }

    async fn on_select(&self, key: LineId) {
        self.view.select(key).await;
    }

    async fn run(&self, key: LineId) {
        self.refresh(key).await;
    }
}

/// Keeps the production-line list and the selection in sync
pub struct LineListTask {
    source: Arc<dyn LineDataSource>,
    selection: Arc<Selection>,
    ctx: ViewContext,
}

impl LineListTask {
    pub fn new(source: Arc<dyn LineDataSource>, selection: Arc<Selection>, ctx: ViewContext) -> Self {
        Self {
            source,
            selection,
            ctx,
        }
    }

    pub async fn refresh(&self) -> Result<Vec<ProductionLine>, GatewayError> {
        match self.source.production_lines().await {
            Ok(list) => {
                let lines = list.production_lines;
                let previous = self.selection.current();
                if let Some(fallback) = self.selection.set_lines(lines.clone()) {
                    self.ctx.metrics.set_selected_line(fallback);
                    self.ctx.logger.log_selection_changed(previous, fallback);
                }
                self.ctx.health.set_healthy(components::LINE_LIST).await;
                self.ctx.health.set_ready(true).await;
                debug!(lines = lines.len(), "Production line list refreshed");
                Ok(lines)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load production line list");
                self.ctx
                    .metrics
                    .inc_poll_errors(components::LINE_LIST, err.kind().as_str());
                self.ctx
                    .health
                    .set_unhealthy(components::LINE_LIST, err.to_string())
                    .await;
                Err(err)
            }
        }
    }
}

#[async_trait]
impl PollTask for LineListTask {
    fn name(&self) -> &str {
        components::LINE_LIST
    }

    async fn run(&self, _key: LineId) {
        let _ = self.refresh().await;
    }
}

/// The reconciled state of every view
#[derive(Clone)]
pub struct Views {
    pub dashboard: SharedView<LineMetricsResponse>,
    pub oee: SharedView<DerivedOee>,
    pub maintenance: SharedView<MaintenanceSnapshot>,
    pub quality: SharedView<QualitySnapshot>,
    pub batches: SharedView<BatchList>,
    pub chart: SharedView<ChartSeries>,
    pub quality_summary: SharedView<QualitySummaryView>,
    pub analytics: SharedView<AnalyticsSnapshot>,
}

impl Views {
    fn new(initial: LineId) -> Self {
        Self {
            dashboard: SharedView::new(initial),
            oee: SharedView::new(initial),
            maintenance: SharedView::new(initial),
            quality: SharedView::new(initial),
            batches: SharedView::new(GLOBAL_SCOPE),
            chart: SharedView::new(GLOBAL_SCOPE),
            quality_summary: SharedView::new(GLOBAL_SCOPE),
            analytics: SharedView::new(initial),
        }
    }

    /// Current state of a view as JSON
    pub async fn state_json(&self, kind: ViewKind) -> Result<serde_json::Value, serde_json::Error> {
        match kind {
            ViewKind::Dashboard => serde_json::to_value(self.dashboard.snapshot().await),
            ViewKind::Oee => serde_json::to_value(self.oee.snapshot().await),
            ViewKind::Maintenance => serde_json::to_value(self.maintenance.snapshot().await),
            ViewKind::Quality => serde_json::to_value(self.quality.snapshot().await),
            ViewKind::Batches => serde_json::to_value(self.batches.snapshot().await),
            ViewKind::Chart => serde_json::to_value(self.chart.snapshot().await),
            ViewKind::QualitySummary => {
                serde_json::to_value(self.quality_summary.snapshot().await)
            }
            ViewKind::Analytics => serde_json::to_value(self.analytics.snapshot().await),
        }
    }

    async fn select_line(&self, line: LineId) {
        self.dashboard.select(line).await;
        self.oee.select(line).await;
        self.maintenance.select(line).await;
        self.quality.select(line).await;
        self.analytics.select(line).await;
    }
}

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub batch_limit: u32,
    pub analytics_range: TimeRange,
    pub initial_line: Option<LineId>,
    pub noise_seed: Option<u64>,
    pub line_list_refresh: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            batch_limit: 10,
            analytics_range: TimeRange::Day,
            initial_line: None,
            noise_seed: None,
            line_list_refresh: Duration::from_secs(60),
        }
    }
}

/// Every view of the selected production line, kept fresh by its poller
pub struct Monitor {
    selection: Arc<Selection>,
    views: Views,
    range: watch::Sender<TimeRange>,
    line_list: Arc<LineListTask>,
    analytics: Arc<ViewTask<AnalyticsFetcher>>,
    tasks: Vec<(ViewKind, Arc<dyn PollTask>)>,
    options: MonitorOptions,
    ctx: ViewContext,
}

impl Monitor {
    pub fn new(source: Arc<dyn LineDataSource>, options: MonitorOptions, ctx: ViewContext) -> Self {
        let noise = SharedNoise::from_seed(options.noise_seed);
        let selection = Arc::new(Selection::new(options.initial_line));
        let views = Views::new(options.initial_line.unwrap_or(GLOBAL_SCOPE));
        let (range, range_rx) = watch::channel(options.analytics_range);

        let analytics = Arc::new(ViewTask::new(
            AnalyticsFetcher::new(noise.clone(), range_rx),
            Arc::clone(&source),
            views.analytics.clone(),
            ctx.clone(),
        ));

        let tasks = vec![
            (
                ViewKind::Dashboard,
                view_task(DashboardFetcher, &source, &views.dashboard, &ctx),
            ),
            (
                ViewKind::Oee,
                view_task(OeeFetcher::new(noise.clone()), &source, &views.oee, &ctx),
            ),
            (
                ViewKind::Maintenance,
                view_task(
                    MaintenanceFetcher::new(noise.clone()),
                    &source,
                    &views.maintenance,
                    &ctx,
                ),
            ),
            (
                ViewKind::Quality,
                view_task(QualityFetcher::new(noise.clone()), &source, &views.quality, &ctx),
            ),
            (
                ViewKind::Batches,
                view_task(
                    BatchesFetcher::new(options.batch_limit),
                    &source,
                    &views.batches,
                    &ctx,
                ),
            ),
            (
                ViewKind::Chart,
                view_task(ChartFetcher, &source, &views.chart, &ctx),
            ),
            (
                ViewKind::QualitySummary,
                view_task(QualitySummaryFetcher, &source, &views.quality_summary, &ctx),
            ),
            (ViewKind::Analytics, analytics.clone() as Arc<dyn PollTask>),
        ];

        let line_list = Arc::new(LineListTask::new(source, Arc::clone(&selection), ctx.clone()));

        Self {
            selection,
            views,
            range,
            line_list,
            analytics,
            tasks,
            options,
            ctx,
        }
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn current_line(&self) -> Option<LineId> {
        self.selection.current()
    }

    pub fn lines(&self) -> Vec<ProductionLine> {
        self.selection.lines()
    }

    pub fn analytics_range(&self) -> TimeRange {
        *self.range.borrow()
    }

    /// Fetch the production-line list once
    pub async fn refresh_lines(&self) -> Result<Vec<ProductionLine>, GatewayError> {
        self.line_list.refresh().await
    }

    /// Select a production line for every line-scoped view
    pub async fn select(&self, line: LineId) -> Result<bool, SelectionError> {
        let previous = self.selection.current();
        let changed = self.selection.select(line)?;
        if changed {
            self.views.select_line(line).await;
            self.ctx.metrics.set_selected_line(line);
            self.ctx.logger.log_selection_changed(previous, line);
        }
        Ok(changed)
    }

    /// Switch the analytics range and recompute for the selected line
    pub async fn set_analytics_range(&self, range: TimeRange) -> bool {
        let changed = self.range.send_if_modified(|current| {
            if *current == range {
                false
            } else {
                *current = range;
                true
            }
        });

        if let (true, Some(line)) = (changed, self.selection.current()) {
            info!(range = %range, line, "Analytics range changed");
            self.views.analytics.write().await.loading = true;
            let task = Arc::clone(&self.analytics);
            tokio::spawn(async move {
                task.refresh(line).await;
            });
        }
        changed
    }

    /// Spawn the line-list poller and one poller per view
    pub async fn start(&self, shutdown: &broadcast::Sender<()>) -> Vec<PollerHandle> {
        self.ctx.health.register(components::LINE_LIST).await;
        for (kind, _) in &self.tasks {
            self.ctx.health.register(kind.name()).await;
        }

        let mut handles = Vec::with_capacity(self.tasks.len() + 1);
        handles.push(
            Poller::new(
                self.line_list.clone(),
                Some(self.options.line_list_refresh),
                global_key(),
            )
            .spawn(shutdown.subscribe()),
        );

        for (kind, task) in &self.tasks {
            let keys = if kind.is_line_scoped() {
                self.selection.subscribe()
            } else {
                global_key()
            };
            handles.push(Poller::new(Arc::clone(task), kind.cadence(), keys).spawn(shutdown.subscribe()));
        }

        info!(views = self.tasks.len(), "Started view pollers");
        handles
    }
}

fn view_task<F: ViewFetcher>(
    fetcher: F,
    source: &Arc<dyn LineDataSource>,
    view: &SharedView<F::Payload>,
    ctx: &ViewContext,
) -> Arc<dyn PollTask> {
    Arc::new(ViewTask::new(
        fetcher,
        Arc::clone(source),
        view.clone(),
        ctx.clone(),
    ))
}

/// A key receiver that stays on the global scope forever
fn global_key() -> watch::Receiver<Option<LineId>> {
    watch::channel(Some(GLOBAL_SCOPE)).1
}
