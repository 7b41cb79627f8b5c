//! CLI command implementations

pub mod line;
pub mod lines;
pub mod plant;
pub mod vision;

use crate::output::OutputFormat;
use monitor_lib::derive::NoiseSource;
use monitor_lib::labels::MapLabels;
use monitor_lib::GatewayClient;

/// Everything a command needs to fetch, derive and print
pub struct Context {
    pub client: GatewayClient,
    pub labels: MapLabels,
    pub noise: Box<dyn NoiseSource>,
    pub format: OutputFormat,
}
