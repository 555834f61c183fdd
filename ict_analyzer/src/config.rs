//! TOML configuration for the analyzer.
//!
//! Every section and every key is optional; a missing file section falls back
//! to its defaults. Unknown keys are rejected so typos surface early.
//!
//! Entrypoints:
//! - Parse from a TOML string: [`load_config_str`]
//! - Parse from a file path: [`load_config_path`]

use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, bail};
use market_data_ingestor::{
    models::asset::AssetClass,
    providers::{coingecko_rest::CoinGeckoConfig, csv_file::CsvConfig},
};
use serde::{Deserialize, Serialize};
use toml::from_str;

use crate::detect::DEFAULT_WINDOW;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub analysis: AnalysisConfig,
    pub provider: ProviderConfig,
    pub coingecko: CoinGeckoConfig,
    pub csv: CsvConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Trailing window of the structure-break scan.
    pub window: NonZeroUsize,
    /// How many of the latest signals of each kind to print.
    pub recent: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            recent: 5,
        }
    }
}

/// Which data source backs the analysis (serde lowercase).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[cfg_attr(feature = "cli", value(name = "coingecko"))]
    CoinGecko,
    Alpaca,
    Csv,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub asset_class: AssetClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Where charts are written. Defaults to `<tmp>/ict_analyzer`.
    pub output_dir: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 600,
            output_dir: None,
        }
    }
}

/// Parse a configuration from TOML text.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AnalyzerConfig> {
    let config: AnalyzerConfig = from_str(toml_str).context("failed to parse analyzer config TOML")?;
    if config.chart.width == 0 || config.chart.height == 0 {
        bail!("chart width and height must be positive");
    }
    Ok(config)
}

/// Read a configuration file from disk and parse it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<AnalyzerConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
