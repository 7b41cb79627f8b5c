//! Daemon configuration

use anyhow::Result;
use monitor_lib::derive::TimeRange;
use monitor_lib::LineId;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Line monitor configuration, read from `MONITOR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Instance name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// API server port for health/metrics/views
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// PharmaMind backend base URL
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Line to select before the line list has loaded
    #[serde(default)]
    pub initial_line: Option<LineId>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Rows requested by the batch table view
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,

    /// `24h`, `7d` or `30d`
    #[serde(default = "default_analytics_range")]
    pub analytics_range: String,

    /// Seed for reproducible display jitter
    #[serde(default)]
    pub noise_seed: Option<u64>,

    #[serde(default = "default_line_list_refresh")]
    pub line_list_refresh_secs: u64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "line-monitor".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_api_endpoint() -> String {
    monitor_lib::gateway::DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_batch_limit() -> u32 {
    10
}

fn default_analytics_range() -> String {
    "24h".to_string()
}

fn default_line_list_refresh() -> u64 {
    60
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            api_endpoint: default_api_endpoint(),
            initial_line: None,
            request_timeout_secs: default_request_timeout(),
            batch_limit: default_batch_limit(),
            analytics_range: default_analytics_range(),
            noise_seed: None,
            line_list_refresh_secs: default_line_list_refresh(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MONITOR").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|e| {
            warn!(error = %e, "Invalid MONITOR_* configuration, using defaults");
            MonitorConfig::default()
        }))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn line_list_refresh(&self) -> Duration {
        Duration::from_secs(self.line_list_refresh_secs.max(1))
    }

    /// Configured analytics range, falling back to 24h when unparsable
    pub fn analytics_range(&self) -> TimeRange {
        self.analytics_range.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to 24h analytics range");
            TimeRange::Day
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.api_endpoint, "http://localhost:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.analytics_range(), TimeRange::Day);
        assert_eq!(config.initial_line, None);
    }

    #[test]
    fn test_bad_range_falls_back() {
        let config = MonitorConfig {
            analytics_range: "1y".to_string(),
            ..Default::default()
        };
        assert_eq!(config.analytics_range(), TimeRange::Day);

        let config = MonitorConfig {
            analytics_range: "7d".to_string(),
            ..Default::default()
        };
        assert_eq!(config.analytics_range(), TimeRange::Week);
    }
}
