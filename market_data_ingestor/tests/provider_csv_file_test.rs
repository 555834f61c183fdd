use std::fs;

use chrono::{DateTime, Utc};
use market_data_ingestor::{
    models::{asset::AssetClass, request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::{
        DataProvider, ProviderError,
        csv_file::{CsvConfig, CsvFileProvider},
    },
};
use tempfile::TempDir;

const DAILY: &str = "timestamp,open,high,low,close,volume
2024-01-01T00:00:00Z,100,110,95,105,1
2024-01-02T00:00:00Z,105,112,101,108,1
2024-01-03T00:00:00Z,108,115,104,114,1
2024-01-04T00:00:00Z,114,120,110,118,1
";

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn provider_with(files: &[(&str, &str)]) -> (TempDir, CsvFileProvider) {
    let dir = TempDir::new().expect("tempdir");
    for (name, body) in files {
        fs::write(dir.path().join(name), body).expect("write csv");
    }
    let provider = CsvFileProvider::new(CsvConfig {
        dir: dir.path().to_path_buf(),
    });
    (dir, provider)
}

fn request(symbol: &str, start: &str, end: &str) -> BarsRequestParams {
    BarsRequestParams::single(symbol, TimeFrame::day(), ts(start), ts(end), AssetClass::Crypto)
}

#[tokio::test]
async fn test_range_is_half_open() {
    let (_dir, provider) = provider_with(&[("BTC-USD_1d.csv", DAILY)]);

    let series = provider
        .fetch_bars(request("BTC-USD", "2024-01-02T00:00:00Z", "2024-01-04T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(series.len(), 1);
    let stamps: Vec<_> = series[0].bars.iter().map(|b| b.timestamp).collect();
    assert_eq!(stamps, vec![ts("2024-01-02T00:00:00Z"), ts("2024-01-03T00:00:00Z")]);
}

#[tokio::test]
async fn test_falls_back_to_plain_symbol_file() {
    let (_dir, provider) = provider_with(&[("ETH-USD.csv", DAILY)]);

    let series = provider
        .fetch_bars(request("ETH-USD", "2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z"))
        .await
        .unwrap();

    assert_eq!(series[0].bars.len(), 4);
    assert_eq!(series[0].symbol, "ETH-USD");
}

#[tokio::test]
async fn test_range_without_rows_yields_empty_series() {
    let (_dir, provider) = provider_with(&[("BTC-USD_1d.csv", DAILY)]);

    let series = provider
        .fetch_bars(request("BTC-USD", "2025-01-01T00:00:00Z", "2025-02-01T00:00:00Z"))
        .await
        .unwrap();

    assert!(series[0].is_empty());
}

#[tokio::test]
async fn test_missing_file_is_unsupported_symbol() {
    let (_dir, provider) = provider_with(&[]);

    let err = provider
        .fetch_bars(request("SOL-USD", "2024-01-01T00:00:00Z", "2024-02-01T00:00:00Z"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Validation { .. }));
}
