use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::timeframe::{TimeFrame, TimeFrameUnit},
    providers::{ProviderError, ValidationSnafu},
};

/// Longest range for which `market_chart/range` still returns hourly points.
pub const MAX_HOURLY_SPAN_DAYS: i64 = 90;

/// Per-request overrides of [`CoinGeckoConfig`](super::CoinGeckoConfig).
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CoinGeckoParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_only: Option<bool>,
}

/// Whole hours, days and weeks can be rebuilt from the price feed. Minute bars
/// would need 5-minute data, which the API only serves for the last day.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    match timeframe.unit {
        TimeFrameUnit::Hour | TimeFrameUnit::Day | TimeFrameUnit::Week if timeframe.amount > 0 => Ok(()),
        _ => ValidationSnafu {
            message: format!("CoinGecko does not support the {timeframe} timeframe"),
        }
        .fail(),
    }
}

/// Splits `[start, end)` into consecutive windows small enough to keep the
/// granularity the timeframe needs.
///
/// Day and week bars are happy with daily points, so they get a single window.
pub fn chunk_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    timeframe: &TimeFrame,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    if start >= end {
        return Vec::new();
    }
    if timeframe.unit != TimeFrameUnit::Hour {
        return vec![(start, end)];
    }

    let span = Duration::days(MAX_HOURLY_SPAN_DAYS);
    let mut chunks = Vec::new();
    let mut from = start;
    while from < end {
        let to = (from + span).min(end);
        chunks.push((from, to));
        from = to;
    }
    chunks
}

/// Query string for one `market_chart/range` call.
pub fn construct_params(
    vs_currency: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    vec![
        ("vs_currency", vs_currency.to_string()),
        ("from", from.timestamp().to_string()),
        ("to", to.timestamp().to_string()),
    ]
}
