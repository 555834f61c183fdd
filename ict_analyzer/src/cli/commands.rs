use std::{num::NonZeroUsize, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ProviderKind;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (ict_analyzer.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect BOS and FVG signals for one instrument and chart them
    Analyze(AnalyzeArgs),

    /// List the instruments known to the configured symbol map
    Symbols,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Instrument, e.g. "BTC" or "ETH-USD"
    #[arg(long)]
    pub symbol: String,

    /// Bar size: 1h, 4h, 1d or 1w
    #[arg(long, default_value = "1d")]
    pub timeframe: String,

    /// First day to analyse (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last day to analyse (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    pub end: Option<String>,

    /// Trailing window of the structure-break scan
    #[arg(long)]
    pub window: Option<NonZeroUsize>,

    /// Number of most recent signals of each kind to list
    #[arg(long)]
    pub recent: Option<usize>,

    /// Data source, overriding the config file
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Directory the chart is written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
