use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tm-screen")]
#[command(about = "Trademark fuzzy-match screening against the USPTO registry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/tm-screen/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Screen every configured pair and write the report
    Run {
        /// JSON file with the search pairs
        #[arg(short, long)]
        pairs: Option<PathBuf>,

        /// Minimum similarity score (0-100)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (csv/excel/both)
        #[arg(short, long, default_value = "csv")]
        format: ReportFormat,
    },

    /// Check that the API key is accepted by the provider
    VerifyKey,

    /// Show or initialize the configuration
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl ReportFormat {
    pub fn includes_csv(&self) -> bool {
        matches!(self, ReportFormat::Csv | ReportFormat::Both)
    }

    pub fn includes_excel(&self) -> bool {
        matches!(self, ReportFormat::Excel | ReportFormat::Both)
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            "both" => Ok(ReportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}
