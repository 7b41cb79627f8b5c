//! Display label lookup
//!
//! Presentation code asks for labels by key; which language or wording
//! comes back is up to the resolver.

use std::collections::HashMap;

/// Label keys used by the bundled presenters
pub mod keys {
    pub const OEE_OVERALL: &str = "oee.overall.score";
    pub const OEE_AVAILABILITY: &str = "oee.availability";
    pub const OEE_PERFORMANCE: &str = "oee.performance";
    pub const OEE_QUALITY: &str = "oee.quality";
    pub const MAINTENANCE_EQUIPMENT: &str = "maintenance.equipment";
    pub const MAINTENANCE_ALERTS: &str = "maintenance.alerts";
    pub const QUALITY_METRICS: &str = "quality.metrics";
    pub const QUALITY_TESTS: &str = "quality.tests";
    pub const ANALYTICS_KPIS: &str = "analytics.kpis";
    pub const ANALYTICS_EFFICIENCY: &str = "analytics.efficiency";
}

pub trait LabelResolver: Send + Sync {
    fn resolve(&self, key: &str) -> String;
}

/// Returns the key itself
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityLabels;

impl LabelResolver for IdentityLabels {
    fn resolve(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Table-backed labels; unknown keys resolve to themselves
#[derive(Debug, Default, Clone)]
pub struct MapLabels {
    labels: HashMap<String, String>,
}

impl MapLabels {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }

    /// English labels for every key in [`keys`]
    pub fn english() -> Self {
        let labels = [
            (keys::OEE_OVERALL, "Overall OEE"),
            (keys::OEE_AVAILABILITY, "Availability"),
            (keys::OEE_PERFORMANCE, "Performance"),
            (keys::OEE_QUALITY, "Quality"),
            (keys::MAINTENANCE_EQUIPMENT, "Equipment Health"),
            (keys::MAINTENANCE_ALERTS, "Predictive Alerts"),
            (keys::QUALITY_METRICS, "Quality Metrics"),
            (keys::QUALITY_TESTS, "Recent QC Tests"),
            (keys::ANALYTICS_KPIS, "Key Performance Indicators"),
            (keys::ANALYTICS_EFFICIENCY, "Efficiency"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { labels }
    }

    /// Overlay `overrides` on top of the current table
    pub fn merged(mut self, overrides: HashMap<String, String>) -> Self {
        self.labels.extend(overrides);
        self
    }
}

impl LabelResolver for MapLabels {
    fn resolve(&self, key: &str) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
