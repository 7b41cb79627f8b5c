//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use monitor_lib::derive::{AlertSeverity, HealthBand, KpiStatus, QualityGrade};
use monitor_lib::{LineStatus, Trend};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_rows<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a percentage with one decimal
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn trend_arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "↑",
        Trend::Down => "↓",
    }
}

pub fn color_band(band: HealthBand) -> String {
    let label = band.as_str();
    match band {
        HealthBand::Excellent => label.green().bold().to_string(),
        HealthBand::Good => label.green().to_string(),
        HealthBand::Warning => label.yellow().to_string(),
        HealthBand::Critical => label.red().bold().to_string(),
    }
}

pub fn color_kpi(status: KpiStatus) -> String {
    let label = status.as_str();
    match status {
        KpiStatus::AboveTarget => label.green().to_string(),
        KpiStatus::OnTarget => label.yellow().to_string(),
        KpiStatus::BelowTarget => label.red().to_string(),
    }
}

pub fn color_grade(grade: QualityGrade) -> String {
    color_by_grade(grade.as_str(), grade)
}

/// Paint arbitrary text in the color of `grade`
pub fn color_by_grade(label: &str, grade: QualityGrade) -> String {
    match grade {
        QualityGrade::Pass => label.green().to_string(),
        QualityGrade::Warning => label.yellow().to_string(),
        QualityGrade::Fail => label.red().to_string(),
    }
}

pub fn color_severity(severity: AlertSeverity) -> String {
    let label = severity.as_str();
    match severity {
        AlertSeverity::High => label.red().bold().to_string(),
        AlertSeverity::Medium => label.yellow().to_string(),
        AlertSeverity::Low => label.blue().to_string(),
    }
}

/// Color a status string reported by the backend
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "running" | "completed" | "excellent" | "good" => status.green().to_string(),
        "in progress" | "pending" | "maintenance" | "warning" => status.yellow().to_string(),
        "stopped" | "failed" | "defective" => status.red().to_string(),
        _ => status.to_string(),
    }
}

pub fn color_line_status(status: LineStatus) -> String {
    color_status(&status.to_string())
}
