//! Line quality metrics, QC test log and the plant quality summary

use super::analytics::DEFAULT_QUALITY_SCORE;
use super::kpi::{classify, KpiDirection, KpiStatus};
use super::noise::NoiseSource;
use super::samples::{titles, MetricSet};
use crate::models::{LineId, QualitySummary};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fallback drug release rate (percent)
pub const DEFAULT_DRUG_RELEASE: f64 = 85.0;

/// Fallback API content (percent)
pub const DEFAULT_API_CONTENT: f64 = 98.0;

pub const QC_TESTS: [&str; 10] = [
    "Visual Inspection",
    "Weight Variation",
    "Content Uniformity",
    "Dissolution Test",
    "Disintegration Test",
    "Friability Test",
    "Hardness Test",
    "Moisture Content",
    "pH Measurement",
    "Viscosity Test",
];

pub const OPERATORS: [&str; 4] = [
    "Dr. Sarah Chen",
    "Dr. Michael Rodriguez",
    "Dr. Emily Johnson",
    "Dr. David Kim",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityGrade {
    Pass,
    Warning,
    Fail,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::Pass => "pass",
            QualityGrade::Warning => "warning",
            QualityGrade::Fail => "fail",
        }
    }

    /// Result column of a QC test
    pub fn result_label(&self) -> &'static str {
        match self {
            QualityGrade::Pass => "PASS",
            QualityGrade::Warning => "MARGINAL",
            QualityGrade::Fail => "FAIL",
        }
    }
}

impl From<KpiStatus> for QualityGrade {
    fn from(status: KpiStatus) -> Self {
        match status {
            KpiStatus::AboveTarget => QualityGrade::Pass,
            KpiStatus::OnTarget => QualityGrade::Warning,
            KpiStatus::BelowTarget => QualityGrade::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTrend {
    Up,
    Down,
    Stable,
}

/// Acceptance threshold of a quality metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bound", content = "value", rename_all = "snake_case")]
pub enum TargetBand {
    AtLeast(f64),
    AtMost(f64),
}

impl TargetBand {
    pub fn limit(&self) -> f64 {
        match self {
            TargetBand::AtLeast(v) | TargetBand::AtMost(v) => *v,
        }
    }

    pub fn direction(&self) -> KpiDirection {
        match self {
            TargetBand::AtLeast(_) => KpiDirection::HigherIsBetter,
            TargetBand::AtMost(_) => KpiDirection::LowerIsBetter,
        }
    }

    /// Pass inside the band, warning within the 90 % tolerance, else fail
    pub fn grade(&self, value: f64) -> QualityGrade {
        classify(value, self.limit(), self.direction()).into()
    }

    /// `≥95`, `≤5`
    pub fn symbol(&self) -> &'static str {
        match self {
            TargetBand::AtLeast(_) => "≥",
            TargetBand::AtMost(_) => "≤",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetric {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub status: QualityGrade,
    pub target: TargetBand,
    pub trend: QualityTrend,
}

impl QualityMetric {
    fn graded(name: &str, value: f64, unit: &str, target: TargetBand, trend: QualityTrend) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            status: target.grade(value),
            target,
            trend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTest {
    pub id: String,
    pub name: String,
    pub result: String,
    pub status: QualityGrade,
    pub timestamp: DateTime<Utc>,
    pub operator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub line_id: LineId,
    pub metrics: Vec<QualityMetric>,
    pub tests: Vec<QualityTest>,
}

impl QualitySnapshot {
    pub fn counts(&self) -> GradeCounts {
        GradeCounts::from_grades(self.metrics.iter().map(|m| m.status))
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn line_metrics(samples: &MetricSet, noise: &mut dyn NoiseSource) -> Vec<QualityMetric> {
    let quality = samples.value_or(titles::QUALITY_SCORE, DEFAULT_QUALITY_SCORE);
    let drug_release = samples.value_or(titles::DRUG_RELEASE, DEFAULT_DRUG_RELEASE);
    let api_content = samples.value_or(titles::API_CONTENT, DEFAULT_API_CONTENT);

    vec![
        QualityMetric::graded(
            "Purity",
            round_to(quality + noise.range(-1.0, 1.0), 2),
            "%",
            TargetBand::AtLeast(95.0),
            QualityTrend::Up,
        ),
        QualityMetric::graded(
            "Dissolution",
            round_to(drug_release + noise.range(-2.5, 2.5), 1),
            "%",
            TargetBand::AtLeast(80.0),
            QualityTrend::Stable,
        ),
        QualityMetric::graded(
            "Content Uniformity",
            round_to(api_content + noise.range(-0.5, 0.5), 2),
            "%",
            TargetBand::AtLeast(95.0),
            QualityTrend::Up,
        ),
        QualityMetric::graded(
            "Disintegration Time",
            round_to(noise.range(2.0, 5.0), 1),
            "min",
            TargetBand::AtMost(5.0),
            QualityTrend::Down,
        ),
        QualityMetric::graded(
            "Friability",
            round_to(noise.range(0.1, 0.4), 3),
            "%",
            TargetBand::AtMost(1.0),
            QualityTrend::Stable,
        ),
        QualityMetric::graded(
            "Hardness",
            round_to(noise.range(8.0, 12.0), 1),
            "N",
            TargetBand::AtLeast(6.0),
            QualityTrend::Up,
        ),
    ]
}

fn test_grade(noise: &mut dyn NoiseSource) -> QualityGrade {
    let draw = noise.unit();
    if draw < 0.98 + noise.unit() * 0.02 {
        QualityGrade::Pass
    } else if draw < 0.995 {
        QualityGrade::Warning
    } else {
        QualityGrade::Fail
    }
}

fn qc_tests(line: LineId, now: DateTime<Utc>, noise: &mut dyn NoiseSource) -> Vec<QualityTest> {
    QC_TESTS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let status = test_grade(noise);
            let age = Duration::seconds(noise.range(0.0, 86_400.0) as i64);
            QualityTest {
                id: format!("QC-{}-{}", line, i + 1),
                name: name.to_string(),
                result: status.result_label().to_string(),
                status,
                timestamp: now - age,
                operator: OPERATORS[noise.index(OPERATORS.len())].to_string(),
            }
        })
        .collect()
}

/// Build the quality view of one line
pub fn build_quality(
    line: LineId,
    samples: &MetricSet,
    now: DateTime<Utc>,
    noise: &mut dyn NoiseSource,
) -> QualitySnapshot {
    QualitySnapshot {
        line_id: line,
        metrics: line_metrics(samples, noise),
        tests: qc_tests(line, now, noise),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub pass: usize,
    pub warning: usize,
    pub fail: usize,
}

impl GradeCounts {
    pub fn from_grades(grades: impl IntoIterator<Item = QualityGrade>) -> Self {
        grades.into_iter().fold(Self::default(), |mut counts, grade| {
            match grade {
                QualityGrade::Pass => counts.pass += 1,
                QualityGrade::Warning => counts.warning += 1,
                QualityGrade::Fail => counts.fail += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.pass + self.warning + self.fail
    }
}

/// Plant quality summary with each figure graded against its goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityOverview {
    pub metrics: Vec<QualityMetric>,
    /// Compression force has no acceptance band and is reported as-is (kN)
    pub compression_force: f64,
    pub counts: GradeCounts,
}

pub fn summarize_quality(summary: &QualitySummary) -> QualityOverview {
    let metrics = vec![
        QualityMetric::graded(
            "Quality Score",
            summary.quality_score,
            "%",
            TargetBand::AtLeast(95.0),
            QualityTrend::Stable,
        ),
        QualityMetric::graded(
            "API Content",
            summary.api_content,
            "%",
            TargetBand::AtLeast(95.0),
            QualityTrend::Stable,
        ),
        QualityMetric::graded(
            "Impurities",
            summary.impurities,
            "%",
            TargetBand::AtMost(1.0),
            QualityTrend::Stable,
        ),
    ];
    let counts = GradeCounts::from_grades(metrics.iter().map(|m| m.status));

    QualityOverview {
        metrics,
        compression_force: summary.compression_force,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::noise::{FixedNoise, SeededNoise, SequenceNoise};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_target_band_grades() {
        let at_least = TargetBand::AtLeast(95.0);
        assert_eq!(at_least.grade(96.0), QualityGrade::Pass);
        assert_eq!(at_least.grade(95.0), QualityGrade::Pass);
        assert_eq!(at_least.grade(90.0), QualityGrade::Warning);
        assert_eq!(at_least.grade(80.0), QualityGrade::Fail);

        let at_most = TargetBand::AtMost(5.0);
        assert_eq!(at_most.grade(4.0), QualityGrade::Pass);
        assert_eq!(at_most.grade(5.5), QualityGrade::Warning);
        assert_eq!(at_most.grade(6.0), QualityGrade::Fail);
    }

    #[test]
    fn test_line_quality_ids_and_results() {
        let snapshot = build_quality(3, &MetricSet::default(), now(), &mut SeededNoise::new(5));

        assert_eq!(snapshot.metrics.len(), 6);
        assert_eq!(snapshot.tests.len(), QC_TESTS.len());
        for (i, test) in snapshot.tests.iter().enumerate() {
            assert_eq!(test.id, format!("QC-3-{}", i + 1));
            assert_eq!(test.name, QC_TESTS[i]);
            assert_eq!(test.result, test.status.result_label());
            assert!(test.timestamp <= now());
            assert!(test.timestamp > now() - Duration::hours(24));
            assert!(OPERATORS.contains(&test.operator.as_str()));
        }
    }

    #[test]
    fn test_metric_status_matches_band() {
        for seed in 0..50 {
            let snapshot = build_quality(1, &MetricSet::default(), now(), &mut SeededNoise::new(seed));
            for metric in &snapshot.metrics {
                assert_eq!(metric.status, metric.target.grade(metric.value));
            }
        }
    }

    #[test]
    fn test_pinned_noise_metrics() {
        let snapshot = build_quality(1, &MetricSet::default(), now(), &mut FixedNoise::new(0.5));

        let purity = &snapshot.metrics[0];
        assert_eq!(purity.value, 95.0);
        assert_eq!(purity.status, QualityGrade::Pass);

        let disintegration = &snapshot.metrics[3];
        assert_eq!(disintegration.value, 3.5);
        assert_eq!(disintegration.target, TargetBand::AtMost(5.0));
        assert_eq!(disintegration.status, QualityGrade::Pass);
    }

    #[test]
    fn test_qc_grade_draws() {
        assert_eq!(test_grade(&mut SequenceNoise::new([0.5, 0.0])), QualityGrade::Pass);
        assert_eq!(test_grade(&mut SequenceNoise::new([0.99, 0.0])), QualityGrade::Warning);
        assert_eq!(test_grade(&mut SequenceNoise::new([0.999, 0.0])), QualityGrade::Fail);
        assert_eq!(QualityGrade::Warning.result_label(), "MARGINAL");
    }

    #[test]
    fn test_summarize_quality_counts() {
        let overview = summarize_quality(&QualitySummary {
            quality_score: 97.2,
            api_content: 88.0,
            impurities: 2.5,
            compression_force: 12.4,
            timestamp: None,
        });

        assert_eq!(overview.metrics[0].status, QualityGrade::Pass);
        assert_eq!(overview.metrics[1].status, QualityGrade::Warning);
        assert_eq!(overview.metrics[2].status, QualityGrade::Fail);
        assert_eq!(
            overview.counts,
            GradeCounts {
                pass: 1,
                warning: 1,
                fail: 1
            }
        );
        assert_eq!(overview.counts.total(), 3);
        assert_eq!(overview.compression_force, 12.4);
    }
}
