//! KPI target banding

use serde::{Deserialize, Serialize};

/// Fraction of the target that still counts as on-target
pub const ON_TARGET_RATIO: f64 = 0.9;

/// Whether a larger value is an improvement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiDirection {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KpiStatus {
    AboveTarget,
    OnTarget,
    BelowTarget,
}

impl KpiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiStatus::AboveTarget => "above-target",
            KpiStatus::OnTarget => "on-target",
            KpiStatus::BelowTarget => "below-target",
        }
    }
}

impl std::fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a measured value against its goal
///
/// Higher-is-better: above when `value >= target`, on when
/// `value >= 0.9 * target`. Lower-is-better mirrors the ratio: above when
/// `value <= target`, on when `value <= target / 0.9`.
pub fn classify(value: f64, target: f64, direction: KpiDirection) -> KpiStatus {
    match direction {
        KpiDirection::HigherIsBetter => {
            if value >= target {
                KpiStatus::AboveTarget
            } else if value >= ON_TARGET_RATIO * target {
                KpiStatus::OnTarget
            } else {
                KpiStatus::BelowTarget
            }
        }
        KpiDirection::LowerIsBetter => {
            if value <= target {
                KpiStatus::AboveTarget
            } else if value <= target / ON_TARGET_RATIO {
                KpiStatus::OnTarget
            } else {
                KpiStatus::BelowTarget
            }
        }
    }
}

/// A measured indicator with its goal and band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub value: f64,
    pub target: f64,
    pub unit: String,
    pub direction: KpiDirection,
    pub status: KpiStatus,
}

impl Kpi {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        target: f64,
        unit: impl Into<String>,
        direction: KpiDirection,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            target,
            unit: unit.into(),
            direction,
            status: classify(value, target, direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_higher_is_better_bands() {
        let d = KpiDirection::HigherIsBetter;
        assert_eq!(classify(250.0, 250.0, d), KpiStatus::AboveTarget);
        assert_eq!(classify(260.0, 250.0, d), KpiStatus::AboveTarget);
        assert_eq!(classify(226.0, 250.0, d), KpiStatus::OnTarget);
        assert_eq!(classify(224.0, 250.0, d), KpiStatus::BelowTarget);
    }

    #[test]
    fn test_lower_is_better_bands() {
        let d = KpiDirection::LowerIsBetter;
        assert_eq!(classify(0.24, 0.24, d), KpiStatus::AboveTarget);
        assert_eq!(classify(0.2, 0.24, d), KpiStatus::AboveTarget);
        assert_eq!(classify(0.26, 0.24, d), KpiStatus::OnTarget);
        assert_eq!(classify(0.27, 0.24, d), KpiStatus::BelowTarget);
    }

    #[test]
    fn test_kpi_new_classifies() {
        let kpi = Kpi::new("Quality Score", 93.0, 95.0, "%", KpiDirection::HigherIsBetter);
        assert_eq!(kpi.status, KpiStatus::OnTarget);
        assert_eq!(
            serde_json::to_value(kpi.status).unwrap(),
            serde_json::json!("on-target")
        );
    }
}
