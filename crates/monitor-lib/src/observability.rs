//! Observability infrastructure for the line monitor
//!
//! Provides:
//! - Prometheus metrics (poll latency, poll errors, stale discards, OEE)
//! - Structured JSON logging with tracing

use crate::models::LineId;
use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    GaugeVec, HistogramVec, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for backend round trips (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0];

static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

struct MonitorMetricsInner {
    poll_latency_seconds: HistogramVec,
    poll_errors: IntCounterVec,
    stale_discards: IntCounterVec,
    oee_percent: GaugeVec,
    selected_line: IntGauge,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            poll_latency_seconds: register_histogram_vec!(
                "line_monitor_poll_latency_seconds",
                "Time spent fetching and deriving one view tick",
                &["view"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register poll_latency_seconds"),

            poll_errors: register_int_counter_vec!(
                "line_monitor_poll_errors_total",
                "Total number of failed view ticks",
                &["view", "kind"]
            )
            .expect("Failed to register poll_errors"),

            stale_discards: register_int_counter_vec!(
                "line_monitor_stale_responses_total",
                "Responses discarded because the selected line changed",
                &["view"]
            )
            .expect("Failed to register stale_discards"),

            oee_percent: register_gauge_vec!(
                "line_monitor_oee_percent",
                "Latest derived OEE per production line",
                &["line"]
            )
            .expect("Failed to register oee_percent"),

            selected_line: register_int_gauge!(
                "line_monitor_selected_line",
                "Currently selected production line id"
            )
            .expect("Failed to register selected_line"),
        }
    }
}

/// Handle to the process-wide monitor metrics; clones share the registry
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new)
    }

    pub fn observe_poll_latency(&self, view: &str, duration_secs: f64) {
        self.inner()
            .poll_latency_seconds
            .with_label_values(&[view])
            .observe(duration_secs);
    }

    pub fn inc_poll_errors(&self, view: &str, kind: &str) {
        self.inner()
            .poll_errors
            .with_label_values(&[view, kind])
            .inc();
    }

    pub fn inc_stale_discards(&self, view: &str) {
        self.inner().stale_discards.with_label_values(&[view]).inc();
    }

    pub fn set_oee(&self, line: LineId, oee: f64) {
        self.inner()
            .oee_percent
            .with_label_values(&[&line.to_string()])
            .set(oee);
    }

    pub fn set_selected_line(&self, line: LineId) {
        self.inner().selected_line.set(i64::from(line));
    }
}

/// Event-tagged logging for monitor activity
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, api_endpoint: &str) {
        info!(
            event = "monitor_started",
            instance = %self.instance,
            version = %version,
            api_endpoint = %api_endpoint,
            "Line monitor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "monitor_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Line monitor shutting down"
        );
    }

    pub fn log_selection_changed(&self, from: Option<LineId>, to: LineId) {
        info!(
            event = "selection_changed",
            instance = %self.instance,
            from = ?from,
            to = to,
            "Production line selected"
        );
    }

    pub fn log_tick_applied(&self, view: &str, line: LineId, elapsed_ms: u128) {
        debug!(
            event = "tick_applied",
            instance = %self.instance,
            view = %view,
            line = line,
            elapsed_ms = elapsed_ms as u64,
            "View refreshed"
        );
    }

    pub fn log_tick_failed(&self, view: &str, line: LineId, kind: &str, error: &str) {
        warn!(
            event = "tick_failed",
            instance = %self.instance,
            view = %view,
            line = line,
            kind = %kind,
            error = %error,
            "View refresh failed, keeping last data"
        );
    }

    pub fn log_stale_response(&self, view: &str, selected: LineId, response: LineId) {
        info!(
            event = "stale_response_discarded",
            instance = %self.instance,
            view = %view,
            selected_line = selected,
            response_line = response,
            "Discarded response for a line that is no longer selected"
        );
    }

    pub fn log_oee(&self, line: LineId, oee: f64, status: &str) {
        debug!(
            event = "oee_derived",
            instance = %self.instance,
            line = line,
            oee = oee,
            status = %status,
            "OEE derived"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_metrics_creation() {
        let metrics = MonitorMetrics::new();
        let again = MonitorMetrics::new();

        metrics.observe_poll_latency("oee", 0.012);
        metrics.inc_poll_errors("oee", "status");
        again.inc_stale_discards("dashboard");
        again.set_oee(1, 42.3);
        metrics.set_selected_line(2);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("line-monitor-test");
        assert_eq!(logger.instance, "line-monitor-test");
    }
}
