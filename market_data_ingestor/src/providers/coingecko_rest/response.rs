use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `GET /coins/{id}/market_chart/range`.
///
/// Every series is a list of `[unix_millis, value]` pairs.
#[derive(Deserialize, Debug)]
pub struct MarketChartResponse {
    pub prices: Vec<(f64, f64)>,
    #[serde(default)]
    pub market_caps: Vec<(f64, f64)>,
    #[serde(default)]
    pub total_volumes: Vec<(f64, f64)>,
}

/// One sampled price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl MarketChartResponse {
    /// Converts the raw `prices` pairs, skipping timestamps chrono cannot represent.
    pub fn price_points(&self) -> Vec<PricePoint> {
        self.prices
            .iter()
            .filter_map(|&(millis, price)| {
                DateTime::from_timestamp_millis(millis as i64)
                    .map(|timestamp| PricePoint { timestamp, price })
            })
            .collect()
    }
}
