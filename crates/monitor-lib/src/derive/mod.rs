//! Metric derivation engine
//!
//! Pure functions from raw samples to display-ready metrics. Every random
//! component is drawn from an injected [`NoiseSource`].

pub mod analytics;
pub mod kpi;
pub mod maintenance;
pub mod noise;
pub mod oee;
pub mod quality;
pub mod samples;
pub mod vision;

pub use analytics::{build_analytics, AnalyticsSnapshot, EfficiencyMetrics, TimeRange, TimeSeries};
pub use kpi::{classify, Kpi, KpiDirection, KpiStatus};
pub use maintenance::{
    build_maintenance, AlertKind, AlertSeverity, AlertStatus, EquipmentHealth, MaintenanceAlert,
    MaintenanceSnapshot,
};
pub use noise::{NoiseSource, SeededNoise, SharedNoise, ThreadNoise};
pub use oee::{derive_oee, DerivedOee, HealthBand, OeeInputs};
pub use quality::{
    build_quality, summarize_quality, GradeCounts, QualityGrade, QualityMetric, QualityOverview,
    QualitySnapshot, QualityTest, QualityTrend, TargetBand,
};
pub use samples::MetricSet;
pub use vision::normalize_analysis;
