//! Offline provider backed by CSV exports.
//!
//! Looks for `<dir>/<SYMBOL>_<timeframe>.csv` first (e.g. `BTC-USD_1d.csv`) and
//! falls back to `<dir>/<SYMBOL>.csv`. Expected header:
//! `timestamp,open,high,low,close[,volume]` with RFC 3339 timestamps.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
        timeframe::TimeFrame,
    },
    providers::{CsvSnafu, DataProvider, IoSnafu, ProviderError, ValidationSnafu},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    /// Directory holding the exported files.
    pub dir: PathBuf,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

pub struct CsvFileProvider {
    dir: PathBuf,
}

impl CsvFileProvider {
    pub fn new(config: CsvConfig) -> Self {
        Self { dir: config.dir }
    }

    fn candidates(&self, symbol: &str, timeframe: &TimeFrame) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{symbol}_{timeframe}.csv")),
            self.dir.join(format!("{symbol}.csv")),
        ]
    }
}

/// Parses bar rows, keeping file order.
pub fn parse_bars(path: &Path, contents: &[u8]) -> Result<Vec<Bar>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents);

    reader
        .deserialize::<CsvBar>()
        .map(|row| {
            let row = row.context(CsvSnafu { path })?;
            Ok(Bar {
                timestamp: row.timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or_default(),
                trade_count: None,
                vwap: None,
            })
        })
        .collect()
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let mut result = Vec::with_capacity(params.symbols.len());

        for symbol in &params.symbols {
            let mut found = None;
            for path in self.candidates(symbol, &params.timeframe) {
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    found = Some(path);
                    break;
                }
            }
            let Some(path) = found else {
                return ValidationSnafu {
                    message: format!(
                        "Unsupported symbol: no CSV data for {symbol} in {}",
                        self.dir.display()
                    ),
                }
                .fail();
            };

            let contents = tokio::fs::read(&path).await.context(IoSnafu { path: &path })?;
            let mut bars = parse_bars(&path, &contents)?;
            bars.retain(|bar| bar.timestamp >= params.start && bar.timestamp < params.end);
            debug!(symbol = %symbol, path = %path.display(), bars = bars.len(), "csv bars loaded");

            result.push(BarSeries {
                symbol: symbol.clone(),
                timeframe: params.timeframe,
                bars,
            });
        }

        Ok(result)
    }
}
