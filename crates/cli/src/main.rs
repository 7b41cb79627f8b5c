//! PharmaMind line monitor CLI
//!
//! A command-line tool for querying production lines, deriving OEE,
//! maintenance, quality and analytics views, and submitting VisionQC
//! inspection images.

mod commands;
mod config;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use commands::{line, lines, plant, vision, Context};
use monitor_lib::derive::{noise, TimeRange};
use monitor_lib::gateway::DEFAULT_BASE_URL;
use monitor_lib::{GatewayClient, GatewayConfig, LineId};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PharmaMind line monitor CLI
#[derive(Parser)]
#[command(name = "pmctl")]
#[command(author, version, about = "CLI for the PharmaMind line monitor", long_about = None)]
pub struct Cli {
    /// Backend base URL (can also be set via PM_API_URL env var)
    #[arg(long, env = "PM_API_URL")]
    pub api_url: Option<String>,

    /// Path to the config file (defaults to ~/.config/pmctl/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Seed for reproducible derivations
    #[arg(long)]
    pub seed: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List production lines
    Lines,

    /// Show raw real-time metrics of a line
    Metrics {
        #[arg(long, short)]
        line: Option<LineId>,

        /// Show the batch-averaged snapshot instead of the live feed
        #[arg(long)]
        snapshot: bool,
    },

    /// Show the plant-wide dashboard cards
    Dashboard,

    /// Derive OEE for a line
    Oee {
        #[arg(long, short)]
        line: Option<LineId>,
    },

    /// Derive equipment health and predictive alerts for a line
    Maintenance {
        #[arg(long, short)]
        line: Option<LineId>,
    },

    /// Derive quality metrics and QC tests for a line
    Quality {
        #[arg(long, short)]
        line: Option<LineId>,
    },

    /// Derive trends, efficiency and KPIs for a line
    Analytics {
        #[arg(long, short)]
        line: Option<LineId>,

        /// Time range (24h, 7d, 30d)
        #[arg(long, short, default_value = "24h")]
        range: TimeRange,
    },

    /// Show recent batches
    Batches {
        /// Restrict to one line (plant-wide if not specified)
        #[arg(long, short)]
        line: Option<LineId>,

        /// Number of batches to fetch
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Show the production chart
    Chart {
        /// Restrict to one line (plant-wide if not specified)
        #[arg(long, short)]
        line: Option<LineId>,
    },

    /// Show the plant-wide quality summary
    Summary,

    /// Real-time simulation feed
    #[command(subcommand)]
    Realtime(RealtimeCommands),

    /// VisionQC inspection
    #[command(subcommand)]
    Vision(VisionCommands),
}

#[derive(Subcommand)]
pub enum RealtimeCommands {
    /// Show simulation status
    Status,

    /// Show one raw data record
    Data {
        /// Record number
        file: u32,
    },
}

#[derive(Subcommand)]
pub enum VisionCommands {
    /// Show VisionQC system status
    Status,

    /// Show past analyses
    History,

    /// Analyze an inspection image
    Analyze {
        /// Image file, at most 10 MiB
        path: PathBuf,
    },
}

/// Resolve the line for a line-scoped command
fn require_line(line: Option<LineId>, config: &config::Config) -> Result<LineId> {
    line.or(config.default_line)
        .context("No production line given; pass --line or set default_line in the config file")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Initialize client
    let client = GatewayClient::new(
        GatewayConfig::new(api_url).with_timeout(Duration::from_secs(cli.timeout)),
    )
    .context("Failed to create gateway client")?;

    let mut ctx = Context {
        client,
        labels: config.labels(),
        noise: noise::from_seed(cli.seed.or(config.seed)),
        format: cli.format,
    };

    // Execute command
    match cli.command {
        Commands::Lines => lines::list_lines(&mut ctx).await?,
        Commands::Metrics { line: l, snapshot } => {
            line::show_metrics(&mut ctx, require_line(l, &config)?, snapshot).await?
        }
        Commands::Dashboard => plant::show_dashboard(&mut ctx).await?,
        Commands::Oee { line: l } => line::show_oee(&mut ctx, require_line(l, &config)?).await?,
        Commands::Maintenance { line: l } => {
            line::show_maintenance(&mut ctx, require_line(l, &config)?).await?
        }
        Commands::Quality { line: l } => {
            line::show_quality(&mut ctx, require_line(l, &config)?).await?
        }
        Commands::Analytics { line: l, range } => {
            line::show_analytics(&mut ctx, require_line(l, &config)?, range).await?
        }
        Commands::Batches { line: l, limit } => plant::show_batches(&mut ctx, l, limit).await?,
        Commands::Chart { line: l } => plant::show_chart(&mut ctx, l).await?,
        Commands::Summary => plant::show_summary(&mut ctx).await?,
        Commands::Realtime(realtime_cmd) => match realtime_cmd {
            RealtimeCommands::Status => plant::show_realtime_status(&mut ctx).await?,
            RealtimeCommands::Data { file } => plant::show_realtime_data(&mut ctx, file).await?,
        },
        Commands::Vision(vision_cmd) => match vision_cmd {
            VisionCommands::Status => vision::show_status(&mut ctx).await?,
            VisionCommands::History => vision::show_history(&mut ctx).await?,
            VisionCommands::Analyze { path } => vision::analyze(&mut ctx, &path).await?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analytics_range() {
        let cli =
            Cli::try_parse_from(["pmctl", "analytics", "--line", "2", "--range", "7d"]).unwrap();
        match cli.command {
            Commands::Analytics { line, range } => {
                assert_eq!(line, Some(2));
                assert_eq!(range, TimeRange::Week);
            }
            _ => panic!("expected analytics command"),
        }

        assert!(Cli::try_parse_from(["pmctl", "analytics", "--range", "1y"]).is_err());
    }

    #[test]
    fn test_line_falls_back_to_config() {
        let config = config::Config {
            default_line: Some(3),
            ..Default::default()
        };
        assert_eq!(require_line(None, &config).unwrap(), 3);
        assert_eq!(require_line(Some(1), &config).unwrap(), 1);
        assert!(require_line(None, &config::Config::default()).is_err());
    }
}
