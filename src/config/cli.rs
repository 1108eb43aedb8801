use crate::config::toml_config::ComparisonConfig;
use crate::core::report::ReportFormat;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "landed-cost")]
#[command(about = "Compare D2C parcel shipping with consolidated formal export")]
pub struct CliArgs {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Override the report format from config
    #[arg(long, global = true, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write reports into this directory instead of stdout
    #[arg(long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Quote both strategies and report the landed cost per item
    Compare {
        /// Override the item quantity from config
        #[arg(long)]
        quantity: Option<u64>,

        /// Use this duty rate (decimal fraction) instead of the tariff tables
        #[arg(long)]
        duty_rate: Option<f64>,
    },
    /// Show the master box configuration only, without quoting
    Pack {
        /// Override the item quantity from config
        #[arg(long)]
        quantity: Option<u64>,
    },
    /// Search classification codes and show the resolved duty rate
    Tariff {
        /// At least four digits of the origin classification code
        prefix: String,
    },
}

impl CliArgs {
    /// Folds command line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ComparisonConfig) {
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(output) = &self.output {
            config.output.directory = Some(output.clone());
        }
        match &self.command {
            Command::Compare {
                quantity,
                duty_rate,
            } => {
                if let Some(quantity) = quantity {
                    config.item.quantity = *quantity;
                }
                if let Some(rate) = duty_rate {
                    config.costs.duty_rate = Some(*rate);
                }
            }
            Command::Pack { quantity } => {
                if let Some(quantity) = quantity {
                    config.item.quantity = *quantity;
                }
            }
            Command::Tariff { .. } => {}
        }
    }
}
