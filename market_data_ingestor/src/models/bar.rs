//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is used as the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations, regardless of asset class (stocks, futures, crypto, etc.).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timeframe::TimeFrame;

/// A single time-series bar (OHLCV) for a given timestamp.
///
/// This struct is vendor-agnostic and is used throughout the data ingestion pipeline.
/// The `low <= min(open, close) <= max(open, close) <= high` shape is expected but
/// never checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    #[serde(default)]
    pub volume: f64,

    /// Trade count for the bar. Not all providers supply this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_count: Option<u64>,

    /// Volume-weighted average price. Not all providers supply this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
}

impl Bar {
    /// Degenerate bar for close-only feeds: `open = high = low = close = price`.
    pub fn flat(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0.0,
            trade_count: None,
            vwap: None,
        }
    }
}

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`TimeFrame`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL", "BTC-USD").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// `true` when timestamps are strictly increasing.
    pub fn is_chronological(&self) -> bool {
        self.bars
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }
}
