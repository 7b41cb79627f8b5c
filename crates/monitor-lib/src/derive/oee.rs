//! Overall Equipment Effectiveness decomposition
//!
//! OEE = availability × performance × quality, each expressed as a
//! percentage and derived from the line's real-time samples:
//!
//! - availability: production rate against the 300 tablets/min theoretical
//!   maximum
//! - performance: the 0.2 s/tablet standard cycle time against the actual
//!   cycle time (`60 / rate`)
//! - quality: the reported quality score

use super::noise::NoiseSource;
use super::samples::{titles, MetricSet};
use crate::models::Trend;
use serde::{Deserialize, Serialize};

/// Theoretical maximum production rate (tablets/min)
pub const THEORETICAL_MAX_RATE: f64 = 300.0;

/// Standard cycle time (seconds per tablet)
pub const STANDARD_CYCLE_TIME_SECS: f64 = 0.2;

/// Draws above this value show an upward trend arrow
const TREND_UP_ABOVE: f64 = 0.3;

/// Four-level status band shared by OEE and equipment health
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Critical,
    Warning,
    Good,
    Excellent,
}

impl HealthBand {
    pub const EXCELLENT_FROM: f64 = 85.0;
    pub const GOOD_FROM: f64 = 70.0;
    pub const WARNING_FROM: f64 = 50.0;

    /// Band a 0–100 score; each lower bound is inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= Self::EXCELLENT_FROM {
            HealthBand::Excellent
        } else if score >= Self::GOOD_FROM {
            HealthBand::Good
        } else if score >= Self::WARNING_FROM {
            HealthBand::Warning
        } else {
            HealthBand::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthBand::Excellent => "excellent",
            HealthBand::Good => "good",
            HealthBand::Warning => "warning",
            HealthBand::Critical => "critical",
        }
    }

    /// Excellent or good
    pub fn is_healthy(&self) -> bool {
        *self >= HealthBand::Good
    }
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OEE and its three components, all rounded to one decimal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedOee {
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
    pub trend: Trend,
    pub status: HealthBand,
}

/// Raw inputs of an OEE computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OeeInputs {
    /// Tablets per minute
    pub production_rate: f64,
    /// Percent
    pub quality_score: f64,
}

impl OeeInputs {
    /// Missing or non-numeric samples count as zero
    pub fn from_samples(samples: &MetricSet) -> Self {
        Self {
            production_rate: samples.value_or(titles::PRODUCTION_RATE, 0.0),
            quality_score: samples.value_or(titles::QUALITY_SCORE, 0.0),
        }
    }
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn availability(production_rate: f64) -> f64 {
    if !production_rate.is_finite() || production_rate <= 0.0 {
        return 0.0;
    }
    (production_rate / THEORETICAL_MAX_RATE * 100.0).min(100.0)
}

pub fn performance(production_rate: f64) -> f64 {
    if !production_rate.is_finite() || production_rate <= 0.0 {
        return 0.0;
    }
    let actual_cycle_time = 60.0 / production_rate;
    (STANDARD_CYCLE_TIME_SECS / actual_cycle_time * 100.0).min(100.0)
}

/// Combine already-computed components into a [`DerivedOee`]
///
/// Components are rounded first and OEE is computed from the rounded
/// values, so `oee == round1(a * p * q / 10000)` holds on the output.
pub fn compose(availability: f64, performance: f64, quality: f64, trend: Trend) -> DerivedOee {
    let availability = round1(availability);
    let performance = round1(performance);
    let quality = round1(quality);
    let oee = round1(availability * performance * quality / 10_000.0);

    DerivedOee {
        availability,
        performance,
        quality,
        oee,
        trend,
        status: HealthBand::from_score(oee),
    }
}

/// Derive OEE for one tick
pub fn derive_oee(inputs: OeeInputs, noise: &mut dyn NoiseSource) -> DerivedOee {
    let trend = if noise.unit() > TREND_UP_ABOVE {
        Trend::Up
    } else {
        Trend::Down
    };

    compose(
        availability(inputs.production_rate),
        performance(inputs.production_rate),
        inputs.quality_score,
        trend,
    )
}
