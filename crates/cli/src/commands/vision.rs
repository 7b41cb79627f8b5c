//! VisionQC commands

use anyhow::{Context as _, Result};
use colored::Colorize;
use monitor_lib::derive::{normalize_analysis, vision::defective_count};
use monitor_lib::gateway::content_type_for;
use std::path::Path;
use tabled::Tabled;
use tracing::debug;

use super::Context;
use crate::output::{
    color_status, format_percent, print_heading, print_json, print_rows, print_success,
    print_warning, OutputFormat,
};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "Object")]
    object_type: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Defects")]
    defects: u32,
}

#[derive(Tabled)]
struct DetectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Size (px)")]
    size: String,
    #[tabled(rename = "Defects")]
    defects: String,
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Show VisionQC system status
pub async fn show_status(ctx: &mut Context) -> Result<()> {
    let status = ctx
        .client
        .vision_status()
        .await
        .context("Failed to fetch VisionQC status")?;

    match ctx.format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Table => {
            print_heading("VisionQC Status");
            println!("System active:          {}", yes_no(status.system_active));
            println!("Camera available:       {}", yes_no(status.camera_available));
            println!("Model loaded:           {}", yes_no(status.model_loaded));
            println!("Processing speed:       {}", status.processing_speed);
            if !status.supported_objects.is_empty() {
                println!(
                    "Supported objects:      {}",
                    status.supported_objects.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Show past analyses
pub async fn show_history(ctx: &mut Context) -> Result<()> {
    let history = ctx
        .client
        .vision_history()
        .await
        .context("Failed to fetch VisionQC history")?;

    match ctx.format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Table => {
            print_heading("VisionQC History");
            println!(
                "Total analyses: {}   Success rate: {}",
                history.total_analyses,
                format_percent(history.success_rate)
            );
            println!();

            let rows = history
                .history
                .into_iter()
                .map(|h| HistoryRow {
                    quality: color_status(&h.quality),
                    confidence: format_percent(h.confidence),
                    defects: h.defect_count,
                    id: h.id,
                    timestamp: h.timestamp,
                    object_type: h.object_type,
                })
                .collect();
            print_rows::<HistoryRow>(rows);
        }
    }

    Ok(())
}

/// Upload an inspection image and show the normalized analysis
pub async fn analyze(ctx: &mut Context, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let content_type = content_type_for(&file_name);
    debug!(file_name = %file_name, content_type, size = bytes.len(), "Uploading image");

    let result = ctx
        .client
        .analyze_bytes(&file_name, content_type, bytes)
        .await
        .context("Image analysis failed")?;
    let result = normalize_analysis(result);

    match ctx.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_heading(&format!("VisionQC Analysis: {}", file_name));
            let metrics = &result.quality_metrics;
            println!(
                "Overall score:          {}",
                format_percent(metrics.overall_score).bold()
            );
            println!(
                "Dimensional accuracy:   {}",
                format_percent(metrics.dimensional_accuracy)
            );
            println!(
                "Surface quality:        {}",
                format_percent(metrics.surface_quality)
            );
            println!(
                "Structural integrity:   {}",
                format_percent(metrics.structural_integrity)
            );
            println!("Processing time:        {:.2} s", result.processing_time);
            println!();

            let detections = result.all_detections.as_deref().unwrap_or_default();
            let rows = detections
                .iter()
                .map(|d| DetectionRow {
                    id: d.id.clone(),
                    label: d.label.clone(),
                    confidence: format_percent(d.confidence),
                    quality: color_status(d.quality.as_str()),
                    size: format!(
                        "{:.0}x{:.0} ({:.2})",
                        d.dimensions.width, d.dimensions.height, d.dimensions.aspect_ratio
                    ),
                    defects: if d.defects.is_empty() {
                        "-".to_string()
                    } else {
                        d.defects.join(", ")
                    },
                })
                .collect();
            print_rows::<DetectionRow>(rows);
            println!();

            match defective_count(&result) {
                0 => print_success("No defective objects detected"),
                n => print_warning(&format!("{} defective object(s) detected", n)),
            }
            for recommendation in &result.recommendations {
                println!("  • {}", recommendation);
            }
        }
    }

    Ok(())
}
