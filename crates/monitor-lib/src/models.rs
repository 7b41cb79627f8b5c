//! Wire models for the production-line backend
//!
//! Shapes mirror the JSON bodies returned by the PharmaMind API. Field
//! names follow the backend (snake_case, except the two camelCase batch
//! timestamps).

use serde::{Deserialize, Serialize};

/// Stable identifier of a production line (the backend numbers them from 1)
pub type LineId = u32;

/// Operating status of a production line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Running,
    Stopped,
    Maintenance,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineStatus::Running => write!(f, "running"),
            LineStatus::Stopped => write!(f, "stopped"),
            LineStatus::Maintenance => write!(f, "maintenance"),
            LineStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One configured manufacturing line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub id: LineId,
    pub name: String,
    pub product: String,
    pub status: LineStatus,
    pub batches_range: String,
    pub total_batches: u32,
}

/// Response of `GET /api/production-lines`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLineList {
    pub production_lines: Vec<ProductionLine>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ProductionLineList {
    pub fn contains(&self, line: LineId) -> bool {
        self.production_lines.iter().any(|l| l.id == line)
    }
}

/// Direction of a metric's recent change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// A single real-time metric as reported by the backend
///
/// `value` and `change` are numeric-encoded strings (`"200"`, `"+8.2%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub change: String,
    pub trend: Trend,
    #[serde(default)]
    pub color: String,
}

/// Response of the per-line metric endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMetricsResponse {
    #[serde(default)]
    pub line_id: Option<LineId>,
    #[serde(default)]
    pub line_name: Option<String>,
    pub metrics: Vec<MetricSample>,
    #[serde(default)]
    pub raw_data: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `GET /api/dashboard/metrics`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub metrics: Vec<MetricSample>,
    #[serde(default)]
    pub current_batch: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A manufacturing batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: String,
    pub product: String,
    pub status: String,
    pub progress: u32,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "estimatedEnd")]
    pub estimated_end: String,
    pub quality: Option<f64>,
    pub production: Option<f64>,
    pub drug_release: f64,
    pub compression_force: f64,
    pub api_content: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<LineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
}

/// Response of the batch list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchList {
    pub batches: Vec<BatchRecord>,
    pub total_batches: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<LineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One hourly point of a production chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: String,
    pub production: f64,
    pub quality: f64,
    pub target: f64,
}

/// Response of the production chart endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub data: Vec<ChartPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<LineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `GET /api/quality/metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub quality_score: f64,
    pub api_content: f64,
    pub impurities: f64,
    pub compression_force: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `GET /api/realtime/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeStatus {
    pub simulation_active: bool,
    pub current_time: String,
    pub files_loaded: u32,
    pub refresh_interval: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `GET /api/realtime/data/{file}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeData {
    pub file_number: u32,
    pub data: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `GET /api/visionqc/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionStatus {
    pub system_active: bool,
    pub camera_available: bool,
    pub model_loaded: bool,
    pub processing_speed: String,
    #[serde(default)]
    pub supported_objects: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Quality grade assigned to a detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionGrade {
    Excellent,
    Good,
    Warning,
    Defective,
}

impl DetectionGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionGrade::Excellent => "excellent",
            DetectionGrade::Good => "good",
            DetectionGrade::Warning => "warning",
            DetectionGrade::Defective => "defective",
        }
    }
}

/// Physical dimensions of a detection, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub aspect_ratio: f64,
}

/// One object detected in an inspection image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: String,
    pub label: String,
    pub confidence: f64,
    /// `[x, y, width, height]`
    pub bbox: [f64; 4],
    pub quality: DetectionGrade,
    #[serde(default)]
    pub defects: Vec<String>,
    pub dimensions: Dimensions,
    pub timestamp: String,
}

/// Aggregate quality block of a vision analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionQualityMetrics {
    pub overall_score: f64,
    pub dimensional_accuracy: f64,
    pub surface_quality: f64,
    pub structural_integrity: f64,
    pub defect_count: u32,
}

/// Response of `POST /api/visionqc/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detection: DetectionResult,
    #[serde(default)]
    pub all_detections: Option<Vec<DetectionResult>>,
    pub quality_metrics: VisionQualityMetrics,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub processing_time: f64,
    #[serde(default)]
    pub ml_model: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    pub timestamp: String,
}

/// Past vision analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisHistoryEntry {
    pub id: String,
    pub timestamp: String,
    pub object_type: String,
    pub quality: String,
    pub confidence: f64,
    pub defect_count: u32,
    pub processing_time: f64,
}

/// Response of `GET /api/visionqc/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionHistory {
    pub history: Vec<AnalysisHistoryEntry>,
    pub total_analyses: u32,
    pub success_rate: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}
