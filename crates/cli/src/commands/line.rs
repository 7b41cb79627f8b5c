//! Line-scoped commands: raw samples and the views derived from them

use anyhow::{Context as _, Result};
use chrono::Utc;
use colored::Colorize;
use monitor_lib::derive::{
    build_analytics, build_maintenance, build_quality, derive_oee, MetricSet, OeeInputs,
    TimeRange,
};
use monitor_lib::labels::{keys, LabelResolver};
use monitor_lib::{LineId, MetricSample};
use tabled::Tabled;

use super::Context;
use crate::output::{
    color_band, color_by_grade, color_grade, color_kpi, color_severity, format_percent,
    print_heading, print_json, print_rows, print_success, trend_arrow, OutputFormat,
};

#[derive(Tabled)]
pub(crate) struct SampleRow {
    #[tabled(rename = "Metric")]
    title: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Change")]
    change: String,
}

#[derive(Tabled)]
struct EquipmentRow {
    #[tabled(rename = "Equipment")]
    name: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Next Maintenance")]
    next_maintenance: String,
}

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Equipment")]
    equipment: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
}

#[derive(Tabled)]
struct QualityMetricRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct QualityTestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Test")]
    name: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Time")]
    time: String,
}

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "KPI")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub(crate) fn sample_rows(samples: Vec<MetricSample>) -> Vec<SampleRow> {
    samples
        .into_iter()
        .map(|m| SampleRow {
            value: format!("{} {}", m.value, m.unit).trim_end().to_string(),
            change: format!("{} {}", trend_arrow(m.trend), m.change),
            title: m.title,
        })
        .collect()
}

async fn fetch_samples(ctx: &Context, line: LineId) -> Result<MetricSet> {
    let response = ctx
        .client
        .line_metrics(line)
        .await
        .with_context(|| format!("Failed to fetch metrics for line {}", line))?;
    Ok(MetricSet::new(response.metrics))
}

/// Show the raw samples of a line, live or batch-averaged
pub async fn show_metrics(ctx: &mut Context, line: LineId, snapshot: bool) -> Result<()> {
    let result = if snapshot {
        ctx.client.line_snapshot_metrics(line).await
    } else {
        ctx.client.line_metrics(line).await
    }
    .with_context(|| format!("Failed to fetch metrics for line {}", line))?;

    match ctx.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let name = result
                .line_name
                .clone()
                .unwrap_or_else(|| format!("Line {}", line));
            let title = if snapshot { "Snapshot" } else { "Real-time" };
            print_heading(&format!("{} Metrics: {}", title, name));
            print_rows(sample_rows(result.metrics));
        }
    }

    Ok(())
}

/// Derive and show OEE for a line
pub async fn show_oee(ctx: &mut Context, line: LineId) -> Result<()> {
    let samples = fetch_samples(ctx, line).await?;
    let oee = derive_oee(OeeInputs::from_samples(&samples), ctx.noise.as_mut());

    match ctx.format {
        OutputFormat::Json => print_json(&oee)?,
        OutputFormat::Table => {
            let labels = &ctx.labels;
            print_heading(&format!("{} - Line {}", labels.resolve(keys::OEE_OVERALL), line));
            println!(
                "{:<24}{} {}  [{}]",
                labels.resolve(keys::OEE_OVERALL),
                format_percent(oee.oee).bold(),
                trend_arrow(oee.trend),
                color_band(oee.status)
            );
            println!(
                "{:<24}{}",
                labels.resolve(keys::OEE_AVAILABILITY),
                format_percent(oee.availability)
            );
            println!(
                "{:<24}{}",
                labels.resolve(keys::OEE_PERFORMANCE),
                format_percent(oee.performance)
            );
            println!(
                "{:<24}{}",
                labels.resolve(keys::OEE_QUALITY),
                format_percent(oee.quality)
            );
        }
    }

    Ok(())
}

/// Derive and show equipment health and predictive alerts for a line
pub async fn show_maintenance(ctx: &mut Context, line: LineId) -> Result<()> {
    let samples = fetch_samples(ctx, line).await?;
    let today = Utc::now().date_naive();
    let snapshot = build_maintenance(&samples, today, ctx.noise.as_mut());

    match ctx.format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => {
            print_heading(&format!(
                "{} - Line {}",
                ctx.labels.resolve(keys::MAINTENANCE_EQUIPMENT),
                line
            ));
            println!(
                "Healthy: {}/{}",
                snapshot.healthy_count(),
                snapshot.equipment.len()
            );
            if let Some(next) = snapshot.next_due() {
                println!(
                    "Next due: {} in {} days",
                    next.name.cyan(),
                    next.days_until_maintenance(today)
                );
            }
            println!();

            let rows = snapshot
                .equipment
                .iter()
                .map(|e| EquipmentRow {
                    name: e.name.clone(),
                    health: format_percent(e.health),
                    status: color_band(e.status),
                    uptime: format_percent(e.uptime),
                    next_maintenance: e.next_maintenance.to_string(),
                })
                .collect();
            print_rows::<EquipmentRow>(rows);
            println!();

            println!("{}", ctx.labels.resolve(keys::MAINTENANCE_ALERTS).bold());
            if snapshot.alerts.is_empty() {
                print_success("No predictive alerts");
            } else {
                let rows = snapshot
                    .alerts
                    .iter()
                    .map(|a| AlertRow {
                        id: a.id.clone(),
                        equipment: a.equipment.clone(),
                        severity: color_severity(a.severity),
                        message: a.message.clone(),
                        predicted: a.predicted_date.to_string(),
                    })
                    .collect();
                print_rows::<AlertRow>(rows);
            }
        }
    }

    Ok(())
}

/// Derive and show quality metrics and recent QC tests for a line
pub async fn show_quality(ctx: &mut Context, line: LineId) -> Result<()> {
    let samples = fetch_samples(ctx, line).await?;
    let snapshot = build_quality(line, &samples, Utc::now(), ctx.noise.as_mut());

    match ctx.format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => {
            print_heading(&format!(
                "{} - Line {}",
                ctx.labels.resolve(keys::QUALITY_METRICS),
                line
            ));
            let rows = snapshot
                .metrics
                .iter()
                .map(|m| QualityMetricRow {
                    name: m.name.clone(),
                    value: format!("{:.1}{}", m.value, m.unit),
                    target: format!("{}{}{}", m.target.symbol(), m.target.limit(), m.unit),
                    status: color_grade(m.status),
                })
                .collect();
            print_rows::<QualityMetricRow>(rows);
            println!();

            let counts = snapshot.counts();
            println!(
                "{}  pass {}  warning {}  fail {}",
                ctx.labels.resolve(keys::QUALITY_TESTS).bold(),
                counts.pass.to_string().green(),
                counts.warning.to_string().yellow(),
                counts.fail.to_string().red()
            );
            let rows = snapshot
                .tests
                .iter()
                .map(|t| QualityTestRow {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    result: color_by_grade(&t.result, t.status),
                    operator: t.operator.clone(),
                    time: t.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            print_rows::<QualityTestRow>(rows);
        }
    }

    Ok(())
}

/// Derive and show trends, efficiency and KPIs for a line
pub async fn show_analytics(ctx: &mut Context, line: LineId, range: TimeRange) -> Result<()> {
    let samples = fetch_samples(ctx, line).await?;
    let snapshot = build_analytics(&samples, range, ctx.noise.as_mut());

    match ctx.format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => {
            print_heading(&format!("Analytics - Line {} ({})", line, range));
            println!(
                "Production trend: {} points, mean {:.1} tablets/min",
                snapshot.production_trend.len(),
                snapshot.production_trend.mean()
            );
            println!(
                "Quality trend:    {} points, mean {}",
                snapshot.quality_trend.len(),
                format_percent(snapshot.quality_trend.mean())
            );
            println!();

            println!("{}", ctx.labels.resolve(keys::ANALYTICS_EFFICIENCY).bold());
            println!("{}", "-".repeat(50));
            let efficiency = &snapshot.efficiency;
            println!("Uptime:                 {}", format_percent(efficiency.uptime));
            println!("Throughput:             {:.1} tablets/min", efficiency.throughput);
            println!("Yield:                  {}", format_percent(efficiency.yield_rate));
            println!("Cycle time:             {:.3} s", efficiency.cycle_time);
            println!();

            println!("{}", ctx.labels.resolve(keys::ANALYTICS_KPIS).bold());
            let rows = snapshot
                .kpis
                .iter()
                .map(|k| KpiRow {
                    name: k.name.clone(),
                    value: format!("{:.2} {}", k.value, k.unit).trim_end().to_string(),
                    target: format!("{} {}", k.target, k.unit).trim_end().to_string(),
                    status: color_kpi(k.status),
                })
                .collect();
            print_rows::<KpiRow>(rows);
        }
    }

    Ok(())
}
