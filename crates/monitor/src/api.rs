//! HTTP API for health checks, Prometheus metrics and view state

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use monitor_lib::{
    derive::TimeRange,
    health::{ComponentStatus, HealthRegistry},
    LineId, Monitor, SelectionError, ViewKind,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub monitor: Arc<Monitor>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, monitor: Arc<Monitor>) -> Self {
        Self {
            health_registry,
            monitor,
        }
    }
}

/// JSON error body with a matching status code
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::UnknownLine(_) => ApiError::NotFound(err.to_string()),
            SelectionError::LinesNotLoaded => ApiError::Unavailable(err.to_string()),
        }
    }
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still serving last good data
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

async fn lines(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "production_lines": state.monitor.lines() }))
}

async fn selection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "line_id": state.monitor.current_line(),
        "analytics_range": state.monitor.analytics_range(),
    }))
}

async fn select_line(
    State(state): State<Arc<AppState>>,
    Path(line_id): Path<LineId>,
) -> Result<impl IntoResponse, ApiError> {
    let changed = state.monitor.select(line_id).await?;
    Ok(Json(json!({ "line_id": line_id, "changed": changed })))
}

async fn view_state(
    State(state): State<Arc<AppState>>,
    Path(view): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind: ViewKind = view
        .parse()
        .map_err(|e: monitor_lib::views::UnknownView| ApiError::NotFound(e.to_string()))?;

    let body = state.monitor.views().state_json(kind).await.map_err(|e| {
        error!(view = %kind, error = %e, "Failed to serialize view state");
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(body))
}

async fn set_analytics_range(
    State(state): State<Arc<AppState>>,
    Path(range): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let range: TimeRange = range
        .parse()
        .map_err(|e: monitor_lib::derive::analytics::ParseTimeRangeError| {
            ApiError::BadRequest(e.to_string())
        })?;

    let changed = state.monitor.set_analytics_range(range).await;
    Ok(Json(json!({ "range": range, "changed": changed })))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/lines", get(lines))
        .route("/api/selection", get(selection))
        .route("/api/selection/:line_id", put(select_line))
        .route("/api/views/:view", get(view_state))
        .route("/api/analytics/range/:range", put(set_analytics_range))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use monitor_lib::gateway::{async_trait, GatewayError, LineDataSource};
    use monitor_lib::{
        BatchList, ChartSeries, LineMetricsResponse, LineStatus, MetricSample, MonitorMetrics,
        MonitorOptions, ProductionLine, ProductionLineList, QualitySummary, StructuredLogger,
        Trend, ViewContext,
    };
    use tower::ServiceExt;

    struct StaticSource;

    fn line(id: LineId) -> ProductionLine {
        ProductionLine {
            id,
            name: format!("Production Line {}", id),
            product: "Ibuprofen 200mg".to_string(),
            status: LineStatus::Running,
            batches_range: "1-250".to_string(),
            total_batches: 250,
        }
    }

    #[async_trait]
    impl LineDataSource for StaticSource {
        async fn production_lines(&self) -> Result<ProductionLineList, GatewayError> {
            Ok(ProductionLineList {
                production_lines: vec![line(1), line(2), line(3)],
                timestamp: None,
            })
        }

        async fn line_metrics(&self, line: LineId) -> Result<LineMetricsResponse, GatewayError> {
            let sample = |title: &str, value: &str| MetricSample {
                title: title.to_string(),
                value: value.to_string(),
                unit: String::new(),
                change: "+0.5%".to_string(),
                trend: Trend::Up,
                color: String::new(),
            };
            Ok(LineMetricsResponse {
                line_id: Some(line),
                line_name: None,
                metrics: vec![
                    sample("Tablet Production Rate", "210"),
                    sample("Quality Score", "96"),
                ],
                raw_data: None,
                timestamp: None,
            })
        }

        async fn batches(&self, _limit: u32) -> Result<BatchList, GatewayError> {
            Ok(BatchList {
                batches: vec![],
                total_batches: 0,
                line_id: None,
                line_name: None,
                timestamp: None,
            })
        }

        async fn production_chart(&self) -> Result<ChartSeries, GatewayError> {
            Ok(ChartSeries {
                data: vec![],
                line_id: None,
                line_name: None,
                timestamp: None,
            })
        }

        async fn quality_metrics(&self) -> Result<QualitySummary, GatewayError> {
            Ok(QualitySummary {
                quality_score: 96.0,
                api_content: 98.5,
                impurities: 0.3,
                compression_force: 11.8,
                timestamp: None,
            })
        }
    }

    async fn setup_test_app(load_lines: bool) -> (Router, Arc<AppState>) {
        let health_registry = HealthRegistry::new();
        let ctx = ViewContext {
            health: health_registry.clone(),
            metrics: MonitorMetrics::new(),
            logger: StructuredLogger::new("api-test"),
        };
        let options = MonitorOptions {
            noise_seed: Some(9),
            ..Default::default()
        };
        let monitor = Arc::new(Monitor::new(Arc::new(StaticSource), options, ctx));
        if load_lines {
            tokio_test::assert_ok!(monitor.refresh_lines().await);
        }

        let state = Arc::new(AppState::new(health_registry, monitor));
        (create_router(state.clone()), state)
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_readyz_before_and_after_line_list() {
        let (app, _) = setup_test_app(false).await;
        let (status, _) = send(app, "GET", "/readyz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (app, _) = setup_test_app(true).await;
        let (status, body) = send(app, "GET", "/readyz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
    }

    #[tokio::test]
    async fn test_healthz_ok_when_degraded() {
        let (app, state) = setup_test_app(true).await;
        state.health_registry.set_degraded("oee", "HTTP 502").await;

        let (status, body) = send(app, "GET", "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        MonitorMetrics::new().inc_stale_discards("oee");
        let (app, _) = setup_test_app(true).await;

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("line_monitor_stale_responses_total"));
    }

    #[tokio::test]
    async fn test_lines_and_selection() {
        let (app, state) = setup_test_app(true).await;

        let (status, body) = send(app.clone(), "GET", "/api/lines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["production_lines"].as_array().unwrap().len(), 3);

        let (status, body) = send(app.clone(), "PUT", "/api/selection/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], true);
        assert_eq!(state.monitor.current_line(), Some(2));

        let (_, body) = send(app.clone(), "PUT", "/api/selection/2").await;
        assert_eq!(body["changed"], false);

        let (status, body) = send(app.clone(), "GET", "/api/selection").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["line_id"], 2);
        assert_eq!(body["analytics_range"], "24h");

        let (status, _) = send(app, "PUT", "/api/selection/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_selection_before_lines_load() {
        let (app, _) = setup_test_app(false).await;
        let (status, body) = send(app, "PUT", "/api/selection/1").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("not been loaded"));
    }

    #[tokio::test]
    async fn test_view_state() {
        let (app, state) = setup_test_app(true).await;
        state
            .monitor
            .views()
            .quality_summary
            .apply_success(0, {
                let summary = StaticSource.quality_metrics().await.unwrap();
                monitor_lib::views::QualitySummaryView {
                    overview: monitor_lib::derive::summarize_quality(&summary),
                    summary,
                }
            })
            .await;

        let (status, body) = send(app.clone(), "GET", "/api/views/quality-summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loading"], false);
        assert_eq!(body["data"]["overview"]["counts"]["pass"], 3);

        let (status, body) = send(app.clone(), "GET", "/api/views/oee").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["loading"], true);
        assert!(body["data"].is_null());

        let (status, _) = send(app, "GET", "/api/views/pareto").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analytics_range() {
        let (app, state) = setup_test_app(true).await;

        let (status, body) = send(app.clone(), "PUT", "/api/analytics/range/7d").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"], "7d");
        assert_eq!(body["changed"], true);
        assert_eq!(state.monitor.analytics_range(), TimeRange::Week);

        let (status, _) = send(app, "PUT", "/api/analytics/range/1y").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
