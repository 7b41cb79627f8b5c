//! Production analytics over a synthetic hourly window
//!
//! The backend only reports the current samples of a line, so the trend
//! series are synthesized around them: a slow sinusoid plus bounded noise,
//! one point per hour of the selected range.

use super::kpi::{Kpi, KpiDirection};
use super::noise::NoiseSource;
use super::oee::round1;
use super::samples::{titles, MetricSet};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fallback production rate when the sample is missing (tablets/min)
pub const DEFAULT_PRODUCTION_RATE: f64 = 200.0;

/// Fallback quality score when the sample is missing (percent)
pub const DEFAULT_QUALITY_SCORE: f64 = 95.0;

/// KPI goals
pub mod targets {
    pub const PRODUCTION_RATE: f64 = 250.0;
    pub const QUALITY_SCORE: f64 = 95.0;
    pub const UPTIME: f64 = 90.0;
    pub const CYCLE_TIME_SECS: f64 = 0.24;
}

/// Selectable analytics window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    /// Number of hourly points in the window
    pub fn points(&self) -> usize {
        match self {
            TimeRange::Day => 24,
            TimeRange::Week => 168,
            TimeRange::Month => 720,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }

    /// Axis label of the `hour`-th point
    pub fn label(&self, hour: usize) -> String {
        let day = hour / 24 + 1;
        match self {
            TimeRange::Day => format!("{}:00", hour),
            TimeRange::Week => format!("Day {} {}:00", day, hour % 24),
            TimeRange::Month => format!("Day {}", day),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time range `{0}` (expected 24h, 7d or 30d)")]
pub struct ParseTimeRangeError(String);

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" => Ok(TimeRange::Day),
            "7d" => Ok(TimeRange::Week),
            "30d" => Ok(TimeRange::Month),
            other => Err(ParseTimeRangeError(other.to_string())),
        }
    }
}

/// Parallel label/value series; both always have the same length
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    labels: Vec<String>,
    data: Vec<f64>,
}

impl TimeSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            labels: Vec::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, label: String, value: f64) {
        self.labels.push(label);
        self.data.push(value);
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean(&self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    /// Percent
    pub uptime: f64,
    /// Mean production rate (tablets/min)
    pub throughput: f64,
    /// Mean quality score (percent)
    #[serde(rename = "yield")]
    pub yield_rate: f64,
    /// Seconds per tablet
    pub cycle_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub range: TimeRange,
    pub production_trend: TimeSeries,
    pub quality_trend: TimeSeries,
    pub efficiency: EfficiencyMetrics,
    pub kpis: Vec<Kpi>,
}

/// Arithmetic mean, zero for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Seconds per tablet at a throughput in tablets/min
pub fn cycle_time(throughput: f64) -> f64 {
    if throughput <= 0.0 || !throughput.is_finite() {
        return 0.0;
    }
    60.0 / throughput
}

/// Build the analytics view for one line and range
pub fn build_analytics(
    samples: &MetricSet,
    range: TimeRange,
    noise: &mut dyn NoiseSource,
) -> AnalyticsSnapshot {
    let rate = samples.value_or(titles::PRODUCTION_RATE, DEFAULT_PRODUCTION_RATE);
    let quality = samples.value_or(titles::QUALITY_SCORE, DEFAULT_QUALITY_SCORE);

    let points = range.points();
    let mut production_trend = TimeSeries::with_capacity(points);
    let mut quality_trend = TimeSeries::with_capacity(points);

    for i in 0..points {
        let label = range.label(i);
        let x = i as f64;

        let production = rate + (x * 0.1).sin() * (rate * 0.2) + noise.unit() * (rate * 0.1);
        production_trend.push(label.clone(), production.round());

        let q = quality + (x * 0.05).sin() * 2.0 + noise.unit();
        quality_trend.push(label, round1(q));
    }

    let throughput = production_trend.mean();
    let yield_rate = quality_trend.mean();
    let efficiency = EfficiencyMetrics {
        uptime: round1(noise.range(85.0, 95.0)),
        throughput,
        yield_rate,
        cycle_time: cycle_time(throughput),
    };

    let kpis = vec![
        Kpi::new(
            "Production Rate",
            efficiency.throughput,
            targets::PRODUCTION_RATE,
            "tablets/min",
            KpiDirection::HigherIsBetter,
        ),
        Kpi::new(
            "Quality Score",
            efficiency.yield_rate,
            targets::QUALITY_SCORE,
            "%",
            KpiDirection::HigherIsBetter,
        ),
        Kpi::new(
            "Uptime",
            efficiency.uptime,
            targets::UPTIME,
            "%",
            KpiDirection::HigherIsBetter,
        ),
        Kpi::new(
            "Cycle Time",
            efficiency.cycle_time,
            targets::CYCLE_TIME_SECS,
            "sec/tablet",
            KpiDirection::LowerIsBetter,
        ),
    ];

    AnalyticsSnapshot {
        range,
        production_trend,
        quality_trend,
        efficiency,
        kpis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::kpi::KpiStatus;
    use crate::derive::noise::{FixedNoise, SeededNoise};

    #[test]
    fn test_series_length_matches_range() {
        let mut noise = FixedNoise::new(0.5);
        for (range, expected) in [
            (TimeRange::Day, 24),
            (TimeRange::Week, 168),
            (TimeRange::Month, 720),
        ] {
            let snapshot = build_analytics(&MetricSet::default(), range, &mut noise);
            assert_eq!(snapshot.production_trend.len(), expected);
            assert_eq!(snapshot.quality_trend.len(), expected);
            assert_eq!(
                snapshot.production_trend.labels().len(),
                snapshot.production_trend.data().len()
            );
            assert_eq!(
                snapshot.quality_trend.labels().len(),
                snapshot.quality_trend.data().len()
            );
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(TimeRange::Day.label(0), "0:00");
        assert_eq!(TimeRange::Day.label(23), "23:00");
        assert_eq!(TimeRange::Week.label(25), "Day 2 1:00");
        assert_eq!(TimeRange::Month.label(719), "Day 30");
    }

    #[test]
    fn test_parse_time_range() {
        assert_eq!("24h".parse::<TimeRange>().unwrap(), TimeRange::Day);
        assert_eq!("7D".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert!("1y".parse::<TimeRange>().is_err());
        assert_eq!(
            serde_json::to_value(TimeRange::Week).unwrap(),
            serde_json::json!("7d")
        );
    }

    #[test]
    fn test_aggregates_are_means_of_series() {
        let snapshot = build_analytics(&MetricSet::default(), TimeRange::Day, &mut SeededNoise::new(3));

        assert_eq!(snapshot.efficiency.throughput, mean(snapshot.production_trend.data()));
        assert_eq!(snapshot.efficiency.yield_rate, mean(snapshot.quality_trend.data()));
        assert_eq!(snapshot.efficiency.cycle_time, 60.0 / snapshot.efficiency.throughput);
    }

    #[test]
    fn test_kpis_follow_direction() {
        let snapshot = build_analytics(&MetricSet::default(), TimeRange::Day, &mut FixedNoise::new(0.0));

        let cycle = snapshot.kpis.iter().find(|k| k.name == "Cycle Time").unwrap();
        assert_eq!(cycle.direction, KpiDirection::LowerIsBetter);
        assert!(cycle.value > cycle.target);
        assert_ne!(cycle.status, KpiStatus::AboveTarget);

        let uptime = snapshot.kpis.iter().find(|k| k.name == "Uptime").unwrap();
        assert_eq!(uptime.value, 85.0);
        assert_eq!(uptime.status, KpiStatus::OnTarget);
    }

    #[test]
    fn test_mean_and_cycle_time_edges() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(cycle_time(0.0), 0.0);
        assert_eq!(cycle_time(300.0), 0.2);
    }

    #[test]
    fn test_pinned_noise_is_idempotent() {
        let a = build_analytics(&MetricSet::default(), TimeRange::Week, &mut SeededNoise::new(11));
        let b = build_analytics(&MetricSet::default(), TimeRange::Week, &mut SeededNoise::new(11));
        assert_eq!(a, b);
    }
}
