//! Production line listing

use anyhow::{Context as _, Result};
use colored::Colorize;
use tabled::Tabled;

use super::Context;
use crate::output::{color_line_status, print_heading, print_rows, OutputFormat};

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Batches")]
    batches: String,
}

/// List the configured production lines
pub async fn list_lines(ctx: &mut Context) -> Result<()> {
    let result = ctx
        .client
        .production_lines()
        .await
        .context("Failed to fetch production lines")?;

    match ctx.format {
        OutputFormat::Json => crate::output::print_json(&result)?,
        OutputFormat::Table => {
            print_heading("Production Lines");
            let rows = result
                .production_lines
                .into_iter()
                .map(|line| LineRow {
                    id: line.id,
                    name: line.name.cyan().to_string(),
                    product: line.product,
                    status: color_line_status(line.status),
                    batches: format!("{} ({})", line.batches_range, line.total_batches),
                })
                .collect();
            print_rows::<LineRow>(rows);
        }
    }

    Ok(())
}
