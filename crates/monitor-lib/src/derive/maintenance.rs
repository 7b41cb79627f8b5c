//! Predictive maintenance: equipment health and generated alerts

use super::analytics::{DEFAULT_PRODUCTION_RATE, DEFAULT_QUALITY_SCORE};
use super::noise::NoiseSource;
use super::oee::{round1, HealthBand};
use super::samples::{titles, MetricSet};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Equipment on every tablet line, in display order
pub const EQUIPMENT: [&str; 6] = [
    "Tablet Press #1",
    "Coating Machine",
    "Granulator",
    "Blender",
    "Dryer",
    "Packaging Unit",
];

pub const ALERT_MESSAGES: [&str; 6] = [
    "Bearing temperature rising above normal range",
    "Vibration levels increasing, schedule inspection",
    "Lubrication system requires maintenance",
    "Motor current fluctuation detected",
    "Filter replacement recommended",
    "Belt tension adjustment needed",
];

/// Health lost per position in the equipment list
const POSITION_PENALTY: f64 = 1.5;

/// Maximum jitter added on top of the base health
const HEALTH_JITTER: f64 = 10.0;

/// Line-wide base health from production and quality
///
/// `(rate / 250) * 40 + (quality / 100) * 40 + 20`, clamped to `[60, 100]`.
pub fn base_health(production_rate: f64, quality_score: f64) -> f64 {
    let raw = (production_rate / 250.0) * 40.0 + (quality_score / 100.0) * 40.0 + 20.0;
    if raw.is_nan() {
        return 60.0;
    }
    raw.clamp(60.0, 100.0)
}

/// Health of the equipment at `position`, in `[0, 100]`
pub fn equipment_health_score(base: f64, jitter: f64, position: usize) -> f64 {
    round1((base + jitter - position as f64 * POSITION_PENALTY).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentHealth {
    pub name: String,
    pub health: f64,
    pub status: HealthBand,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    /// Percent
    pub uptime: f64,
    /// Percent
    pub performance: f64,
}

impl EquipmentHealth {
    /// Days from `today` until the next scheduled maintenance, negative when overdue
    pub fn days_until_maintenance(&self, today: NaiveDate) -> i64 {
        (self.next_maintenance - today).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Critical,
    Info,
}

impl AlertKind {
    pub fn severity(&self) -> AlertSeverity {
        match self {
            AlertKind::Critical => AlertSeverity::High,
            AlertKind::Warning => AlertSeverity::Medium,
            AlertKind::Info => AlertSeverity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Warning => "warning",
            AlertKind::Critical => "critical",
            AlertKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
    Scheduled,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Scheduled => "scheduled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceAlert {
    pub id: String,
    pub equipment: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub predicted_date: NaiveDate,
    /// Percent
    pub confidence: f64,
    pub status: AlertStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSnapshot {
    pub equipment: Vec<EquipmentHealth>,
    pub alerts: Vec<MaintenanceAlert>,
}

impl MaintenanceSnapshot {
    /// Equipment currently banded excellent or good
    pub fn healthy_count(&self) -> usize {
        self.equipment.iter().filter(|e| e.status.is_healthy()).count()
    }

    /// Equipment whose next maintenance falls within `days` of `today`
    pub fn due_within(&self, today: NaiveDate, days: i64) -> Vec<&EquipmentHealth> {
        self.equipment
            .iter()
            .filter(|e| e.days_until_maintenance(today) <= days)
            .collect()
    }

    /// The soonest upcoming maintenance across all equipment
    pub fn next_due(&self) -> Option<&EquipmentHealth> {
        self.equipment.iter().min_by_key(|e| e.next_maintenance)
    }
}

fn alert_kind(noise: &mut dyn NoiseSource) -> AlertKind {
    if noise.unit() > 0.7 {
        AlertKind::Critical
    } else if noise.unit() > 0.4 {
        AlertKind::Warning
    } else {
        AlertKind::Info
    }
}

/// Whole days in `[low, high)`, at least one
fn days_between(noise: &mut dyn NoiseSource, low: f64, high: f64) -> Duration {
    Duration::days((noise.range(low, high) as i64).max(1))
}

fn equipment_health(
    position: usize,
    name: &str,
    base: f64,
    today: NaiveDate,
    noise: &mut dyn NoiseSource,
) -> EquipmentHealth {
    let health = equipment_health_score(base, noise.range(0.0, HEALTH_JITTER), position);
    let last_maintenance = today - Duration::days(noise.range(0.0, 30.0) as i64);
    let next_maintenance = last_maintenance + days_between(noise, 30.0, 90.0);

    EquipmentHealth {
        name: name.to_string(),
        health,
        status: HealthBand::from_score(health),
        last_maintenance,
        next_maintenance,
        uptime: round1(noise.range(85.0, 100.0)),
        performance: round1(noise.range(80.0, 100.0)),
    }
}

fn maintenance_alert(n: usize, today: NaiveDate, noise: &mut dyn NoiseSource) -> MaintenanceAlert {
    let equipment = EQUIPMENT[noise.index(EQUIPMENT.len())];
    let kind = alert_kind(noise);
    let message = ALERT_MESSAGES[noise.index(ALERT_MESSAGES.len())];
    let predicted_date = today + days_between(noise, 1.0, 15.0);
    let confidence = round1(noise.range(70.0, 95.0));
    let status = if noise.unit() > 0.8 {
        AlertStatus::Scheduled
    } else {
        AlertStatus::Active
    };

    MaintenanceAlert {
        id: format!("alert-{}", n),
        equipment: equipment.to_string(),
        kind,
        message: message.to_string(),
        severity: kind.severity(),
        predicted_date,
        confidence,
        status,
    }
}

/// Build equipment health and 1–4 predicted alerts for one tick
pub fn build_maintenance(
    samples: &MetricSet,
    today: NaiveDate,
    noise: &mut dyn NoiseSource,
) -> MaintenanceSnapshot {
    let rate = samples.value_or(titles::PRODUCTION_RATE, DEFAULT_PRODUCTION_RATE);
    let quality = samples.value_or(titles::QUALITY_SCORE, DEFAULT_QUALITY_SCORE);
    let base = base_health(rate, quality);

    let equipment = EQUIPMENT
        .iter()
        .enumerate()
        .map(|(i, name)| equipment_health(i, name, base, today, noise))
        .collect();

    let alert_count = noise.index(4) + 1;
    let alerts = (1..=alert_count)
        .map(|n| maintenance_alert(n, today, noise))
        .collect();

    MaintenanceSnapshot { equipment, alerts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::noise::{FixedNoise, SeededNoise, SequenceNoise};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_base_health_clamps() {
        assert_eq!(base_health(0.0, 0.0), 60.0);
        assert_eq!(base_health(1000.0, 100.0), 100.0);
        // 200/250*40 + 95/100*40 + 20 = 32 + 38 + 20
        assert!((base_health(200.0, 95.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_decreases_with_position() {
        assert_eq!(equipment_health_score(90.0, 0.0, 0), 90.0);
        assert_eq!(equipment_health_score(90.0, 0.0, 2), 87.0);
        assert_eq!(equipment_health_score(100.0, 9.9, 0), 100.0);
        assert_eq!(equipment_health_score(0.0, 0.0, 5), 0.0);
    }

    #[test]
    fn test_snapshot_invariants_hold_for_many_seeds() {
        for seed in 0..200 {
            let snapshot = build_maintenance(&MetricSet::default(), today(), &mut SeededNoise::new(seed));

            assert_eq!(snapshot.equipment.len(), EQUIPMENT.len());
            for (equipment, name) in snapshot.equipment.iter().zip(EQUIPMENT) {
                assert_eq!(equipment.name, name);
                assert!((0.0..=100.0).contains(&equipment.health));
                assert_eq!(equipment.status, HealthBand::from_score(equipment.health));
                assert!(equipment.next_maintenance > equipment.last_maintenance);
                assert!(equipment.last_maintenance <= today());
            }

            assert!((1..=4).contains(&snapshot.alerts.len()));
            for alert in &snapshot.alerts {
                assert!(alert.predicted_date > today());
                assert_eq!(alert.severity, alert.kind.severity());
                assert!((70.0..=95.0).contains(&alert.confidence));
                assert_ne!(alert.status, AlertStatus::Resolved);
            }
        }
    }

    #[test]
    fn test_severity_follows_kind() {
        assert_eq!(AlertKind::Critical.severity(), AlertSeverity::High);
        assert_eq!(AlertKind::Warning.severity(), AlertSeverity::Medium);
        assert_eq!(AlertKind::Info.severity(), AlertSeverity::Low);
    }

    #[test]
    fn test_alert_kind_draws() {
        assert_eq!(alert_kind(&mut SequenceNoise::new([0.9])), AlertKind::Critical);
        assert_eq!(alert_kind(&mut SequenceNoise::new([0.5, 0.5])), AlertKind::Warning);
        assert_eq!(alert_kind(&mut SequenceNoise::new([0.5, 0.1])), AlertKind::Info);
    }

    #[test]
    fn test_pinned_noise_is_deterministic() {
        let snapshot = build_maintenance(&MetricSet::default(), today(), &mut FixedNoise::new(0.0));

        assert_eq!(snapshot.alerts.len(), 1);
        assert_eq!(snapshot.alerts[0].id, "alert-1");
        assert_eq!(snapshot.alerts[0].kind, AlertKind::Info);
        assert_eq!(snapshot.alerts[0].predicted_date, today() + Duration::days(1));
        assert_eq!(snapshot.alerts[0].status, AlertStatus::Active);

        assert_eq!(snapshot.equipment[0].health, 90.0);
        assert_eq!(snapshot.equipment[0].status, HealthBand::Excellent);
        assert_eq!(snapshot.equipment[5].health, 82.5);
        assert_eq!(snapshot.equipment[5].status, HealthBand::Good);
        assert_eq!(snapshot.healthy_count(), 6);
    }

    #[test]
    fn test_due_within_and_next_due() {
        let snapshot = build_maintenance(&MetricSet::default(), today(), &mut FixedNoise::new(0.0));

        // last = today, next = today + 30 days for every unit
        assert_eq!(snapshot.equipment[0].days_until_maintenance(today()), 30);
        assert_eq!(snapshot.due_within(today(), 29).len(), 0);
        assert_eq!(snapshot.due_within(today(), 30).len(), 6);
        assert_eq!(snapshot.next_due().map(|e| e.name.as_str()), Some("Tablet Press #1"));
    }

    #[test]
    fn test_alert_serializes_kind_as_type() {
        let snapshot = build_maintenance(&MetricSet::default(), today(), &mut FixedNoise::new(0.0));
        let json = serde_json::to_value(&snapshot.alerts[0]).unwrap();
        assert_eq!(json["type"], "info");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["predicted_date"], "2024-03-16");
    }
}
