use clap::{Parser, Subcommand};
use super::toml_config::TomlConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "hts-duty")]
#[command(about = "Compute customs duties and landed cost from HTS tariff schedules")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the tariff CSV/TSV files (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Output format (overrides the config file)
    #[arg(long, global = true, value_parser = ["text", "json"])]
    pub format: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compute duty from structured shipment values
    Calculate {
        #[arg(long)]
        hts_code: String,
        #[arg(long)]
        cost: f64,
        #[arg(long, default_value_t = 0.0)]
        freight: f64,
        #[arg(long, default_value_t = 0.0)]
        insurance: f64,
        #[arg(long)]
        weight_kg: Option<f64>,
        #[arg(long)]
        quantity: Option<u64>,
    },
    /// Compute duty from a single free-text query
    Query {
        /// e.g. "HTS code 0101.30.00.00, cost $10,000, freight $500, 500 kg"
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show the rate expressions stored for an HTS code
    Lookup { hts_code: String },
    /// Summarize the loaded tariff table
    Info,
    /// Read queries line by line from stdin
    Interactive,
}

impl CliConfig {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.tariff.data_dir = data_dir.clone();
            tracing::info!("🔧 Tariff directory overridden to: {}", data_dir);
        }
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
    }
}
