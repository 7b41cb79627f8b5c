//! Plant-wide commands: batches, production chart, quality summary and
//! the real-time simulation feed

use anyhow::{Context as _, Result};
use colored::Colorize;
use monitor_lib::derive::summarize_quality;
use monitor_lib::LineId;
use serde_json::json;
use tabled::Tabled;

use super::Context;
use crate::output::{
    color_grade, color_status, format_percent, print_heading, print_info, print_json, print_rows,
    print_warning, OutputFormat,
};

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Batch")]
    id: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "API Content")]
    api_content: String,
    #[tabled(rename = "Started")]
    start_time: String,
}

#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Production")]
    production: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Quality")]
    quality: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Show the plant-wide dashboard cards and the running batch
pub async fn show_dashboard(ctx: &mut Context) -> Result<()> {
    let result = ctx
        .client
        .dashboard_metrics()
        .await
        .context("Failed to fetch dashboard metrics")?;

    match ctx.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_heading("Dashboard");
            print_rows(super::line::sample_rows(result.metrics));
            match result.current_batch.as_ref().and_then(|b| b.get("id")) {
                Some(id) => print_info(&format!("Current batch: {}", id)),
                None => print_info("No batch in progress"),
            }
        }
    }

    Ok(())
}

/// Show recent batches, plant-wide or for one line
pub async fn show_batches(ctx: &mut Context, line: Option<LineId>, limit: u32) -> Result<()> {
    let result = match line {
        Some(line) => ctx.client.line_batches(line, limit).await,
        None => ctx.client.batches(limit).await,
    }
    .context("Failed to fetch batches")?;

    match ctx.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let scope = result
                .line_name
                .clone()
                .unwrap_or_else(|| "All lines".to_string());
            print_heading(&format!("Batches: {}", scope));
            println!("Total batches: {}", result.total_batches);
            println!();

            let rows = result
                .batches
                .into_iter()
                .map(|b| BatchRow {
                    status: color_status(&b.status),
                    progress: format!("{}%", b.progress),
                    quality: b
                        .quality
                        .map(format_percent)
                        .unwrap_or_else(|| "-".to_string()),
                    api_content: format_percent(b.api_content),
                    start_time: b.start_time,
                    id: b.id,
                    product: b.product,
                })
                .collect();
            print_rows::<BatchRow>(rows);
        }
    }

    Ok(())
}

/// Show the production chart, plant-wide or for one line
pub async fn show_chart(ctx: &mut Context, line: Option<LineId>) -> Result<()> {
    let result = match line {
        Some(line) => ctx.client.line_chart(line).await,
        None => ctx.client.production_chart().await,
    }
    .context("Failed to fetch production chart")?;

    match ctx.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_heading("Production Chart");
            let rows = result
                .data
                .into_iter()
                .map(|p| {
                    let production = format!("{:.0}", p.production);
                    ChartRow {
                        production: if p.production < p.target {
                            production.yellow().to_string()
                        } else {
                            production.green().to_string()
                        },
                        target: format!("{:.0}", p.target),
                        quality: format_percent(p.quality),
                        time: p.time,
                    }
                })
                .collect();
            print_rows::<ChartRow>(rows);
        }
    }

    Ok(())
}

/// Show the plant-wide quality summary graded against its targets
pub async fn show_summary(ctx: &mut Context) -> Result<()> {
    let summary = ctx
        .client
        .quality_metrics()
        .await
        .context("Failed to fetch quality metrics")?;
    let overview = summarize_quality(&summary);

    match ctx.format {
        OutputFormat::Json => print_json(&json!({ "summary": summary, "overview": overview }))?,
        OutputFormat::Table => {
            print_heading("Quality Summary");
            let rows = overview
                .metrics
                .iter()
                .map(|m| SummaryRow {
                    name: m.name.clone(),
                    value: format!("{:.2}{}", m.value, m.unit),
                    target: format!("{}{}{}", m.target.symbol(), m.target.limit(), m.unit),
                    status: color_grade(m.status),
                })
                .collect();
            print_rows::<SummaryRow>(rows);
            println!(
                "Compression force:      {:.1} kN",
                overview.compression_force
            );

            let counts = overview.counts;
            if counts.fail > 0 {
                print_warning(&format!("{} metric(s) out of specification", counts.fail));
            }
        }
    }

    Ok(())
}

/// Show the real-time simulation status
pub async fn show_realtime_status(ctx: &mut Context) -> Result<()> {
    let status = ctx
        .client
        .realtime_status()
        .await
        .context("Failed to fetch real-time status")?;

    match ctx.format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Table => {
            print_heading("Real-time Simulation");
            let active = if status.simulation_active {
                "active".green()
            } else {
                "inactive".red()
            };
            println!("Simulation:             {}", active);
            println!("Current time:           {}", status.current_time);
            println!("Files loaded:           {}", status.files_loaded);
            println!("Refresh interval:       {}", status.refresh_interval);
        }
    }

    Ok(())
}

/// Show one raw record of the real-time feed
pub async fn show_realtime_data(ctx: &mut Context, file_number: u32) -> Result<()> {
    let data = ctx
        .client
        .realtime_data(file_number)
        .await
        .with_context(|| format!("Failed to fetch real-time data file {}", file_number))?;

    match ctx.format {
        OutputFormat::Json => print_json(&data)?,
        OutputFormat::Table => {
            print_heading(&format!("Real-time Data #{}", data.file_number));
            match data.data.as_object() {
                Some(fields) if !fields.is_empty() => {
                    for (key, value) in fields {
                        println!("{:<28}{}", key, value);
                    }
                }
                _ => print_info("Record is empty"),
            }
        }
    }

    Ok(())
}
