//! HTTP client for the PharmaMind backend
//!
//! One method per resource. Every call issues exactly one request, with no
//! caching, retry or deduplication; polling cadence belongs to the caller.

use super::error::GatewayError;
use super::upload::ImageUpload;
use crate::models::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default backend location (the reference backend listens on port 8000)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for the gateway client
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Upper bound for a single request, connect included
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Typed request functions against the backend
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| GatewayError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.url(path)?;
        debug!(resource, url = %url, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { resource, source })?;

        decode(resource, response).await
    }

    /// List configured production lines
    pub async fn production_lines(&self) -> Result<ProductionLineList, GatewayError> {
        self.get("production lines", "api/production-lines", &[]).await
    }

    /// Real-time metrics for one line (the feed the line views derive from)
    pub async fn line_metrics(&self, line: LineId) -> Result<LineMetricsResponse, GatewayError> {
        self.get(
            "production line metrics",
            &format!("api/realtime/production-line/{}/metrics", line),
            &[],
        )
        .await
    }

    /// Batch-averaged metrics snapshot for one line
    pub async fn line_snapshot_metrics(
        &self,
        line: LineId,
    ) -> Result<LineMetricsResponse, GatewayError> {
        self.get(
            "production line snapshot",
            &format!("api/production-lines/{}/metrics", line),
            &[],
        )
        .await
    }

    pub async fn line_batches(&self, line: LineId, limit: u32) -> Result<BatchList, GatewayError> {
        self.get(
            "production line batches",
            &format!("api/production-lines/{}/batches", line),
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn line_chart(&self, line: LineId) -> Result<ChartSeries, GatewayError> {
        self.get(
            "production line chart",
            &format!("api/production-lines/{}/chart", line),
            &[],
        )
        .await
    }

    pub async fn batches(&self, limit: u32) -> Result<BatchList, GatewayError> {
        self.get("batches", "api/batches", &[("limit", limit.to_string())])
            .await
    }

    pub async fn quality_metrics(&self) -> Result<QualitySummary, GatewayError> {
        self.get("quality metrics", "api/quality/metrics", &[]).await
    }

    pub async fn production_chart(&self) -> Result<ChartSeries, GatewayError> {
        self.get("production chart", "api/production/chart", &[]).await
    }

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, GatewayError> {
        self.get("dashboard metrics", "api/dashboard/metrics", &[]).await
    }

    pub async fn realtime_status(&self) -> Result<RealtimeStatus, GatewayError> {
        self.get("real-time status", "api/realtime/status", &[]).await
    }

    pub async fn realtime_data(&self, file_number: u32) -> Result<RealtimeData, GatewayError> {
        self.get(
            "real-time data",
            &format!("api/realtime/data/{}", file_number),
            &[],
        )
        .await
    }

    pub async fn vision_status(&self) -> Result<VisionStatus, GatewayError> {
        self.get("VisionQC status", "api/visionqc/status", &[]).await
    }

    pub async fn vision_history(&self) -> Result<VisionHistory, GatewayError> {
        self.get("VisionQC history", "api/visionqc/history", &[]).await
    }

    /// Submit an inspection image as a single multipart `file` field
    pub async fn analyze_image(&self, upload: ImageUpload) -> Result<AnalysisResult, GatewayError> {
        const RESOURCE: &str = "image analysis";

        let url = self.url("api/visionqc/analyze")?;
        let (file_name, content_type, bytes) = upload.into_parts();
        debug!(resource = RESOURCE, url = %url, file_name = %file_name, size = bytes.len(), "POST");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|source| GatewayError::Transport {
                resource: RESOURCE,
                source,
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                resource: RESOURCE,
                source,
            })?;

        decode(RESOURCE, response).await
    }

    /// Validate raw bytes and submit them; rejected files never hit the network
    pub async fn analyze_bytes(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AnalysisResult, GatewayError> {
        let upload = ImageUpload::new(file_name, content_type, bytes)?;
        self.analyze_image(upload).await
    }
}

/// Parse a base URL, making sure relative joins extend its path
fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    Url::parse(&normalized).map_err(|source| GatewayError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

async fn decode<T: DeserializeOwned>(
    resource: &'static str,
    response: Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status { resource, status });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| GatewayError::Transport { resource, source })?;

    serde_json::from_slice(&body).map_err(|source| GatewayError::Parse { resource, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = GatewayClient::new(GatewayConfig::new("http://backend:8000/pharma")).unwrap();
        let url = client.url("api/production-lines").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/pharma/api/production-lines");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = GatewayClient::new(GatewayConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl { .. }));
    }
}
