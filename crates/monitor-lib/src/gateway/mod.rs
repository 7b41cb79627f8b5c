//! Remote data gateway
//!
//! Typed, stateless request functions against the PharmaMind backend plus
//! the client-side validation of inspection image uploads.

mod client;
mod error;
mod upload;


pub use client::{GatewayClient, GatewayConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ErrorKind, GatewayError, UploadError};
pub use upload::{content_type_for, validate, ImageUpload, MAX_IMAGE_BYTES};

use crate::models::{
    BatchList, ChartSeries, LineId, LineMetricsResponse, ProductionLineList, QualitySummary,
};

pub use async_trait::async_trait;

/// The resources polled by the monitor views
#[async_trait]
pub trait LineDataSource: Send + Sync {
    async fn production_lines(&self) -> Result<ProductionLineList, GatewayError>;

    async fn line_metrics(&self, line: LineId) -> Result<LineMetricsResponse, GatewayError>;

    async fn batches(&self, limit: u32) -> Result<BatchList, GatewayError>;

    async fn production_chart(&self) -> Result<ChartSeries, GatewayError>;

    async fn quality_metrics(&self) -> Result<QualitySummary, GatewayError>;
}

#[async_trait]
impl LineDataSource for GatewayClient {
    async fn production_lines(&self) -> Result<ProductionLineList, GatewayError> {
        GatewayClient::production_lines(self).await
    }

    async fn line_metrics(&self, line: LineId) -> Result<LineMetricsResponse, GatewayError> {
        GatewayClient::line_metrics(self, line).await
    }

    async fn batches(&self, limit: u32) -> Result<BatchList, GatewayError> {
        GatewayClient::batches(self, limit).await
    }

    async fn production_chart(&self) -> Result<ChartSeries, GatewayError> {
        GatewayClient::production_chart(self).await
    }

    async fn quality_metrics(&self) -> Result<QualitySummary, GatewayError> {
        GatewayClient::quality_metrics(self).await
    }
}
