use serde::{Deserialize, Serialize};

use crate::{
    models::{
        asset::AssetClass,
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

/// Specifies the sort order for the bars.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

/// Alpaca-specific parameters for a bars request.
///
/// `adjustment` and `feed` only apply to equities and are dropped for crypto.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

/// Checks the amount/unit combinations Alpaca accepts.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    let amount = timeframe.amount;
    let message = match timeframe.unit {
        TimeFrameUnit::Minute if !(1..=59).contains(&amount) => {
            "Minute units can only be used with amounts between 1-59."
        }
        TimeFrameUnit::Hour if !(1..=23).contains(&amount) => {
            "Hour units can only be used with amounts 1-23"
        }
        TimeFrameUnit::Day | TimeFrameUnit::Week if amount != 1 => {
            "Day and Week units can only be used with amount 1"
        }
        TimeFrameUnit::Month if ![1, 2, 3, 6, 12].contains(&amount) => {
            "Month units can only be used with amount 1, 2, 3, 6 and 12"
        }
        _ => return Ok(()),
    };
    ValidationSnafu { message }.fail()
}

/// Alpaca's spelling of a timeframe (`1Hour`, `4Hour`, `1Day`, ...).
pub fn timeframe_param(timeframe: &TimeFrame) -> String {
    let unit = match timeframe.unit {
        TimeFrameUnit::Minute => "Min",
        TimeFrameUnit::Hour => "Hour",
        TimeFrameUnit::Day => "Day",
        TimeFrameUnit::Week => "Week",
        TimeFrameUnit::Month => "Month",
    };
    format!("{}{}", timeframe.amount, unit)
}

/// Canonical symbol to the one Alpaca expects: `BTC-USD` becomes `BTC/USD` for crypto.
pub fn to_remote_symbol(symbol: &str, asset_class: AssetClass) -> String {
    match asset_class {
        AssetClass::Crypto => symbol.replace('-', "/"),
        _ => symbol.to_string(),
    }
}

/// Inverse of [`to_remote_symbol`].
pub fn to_canonical_symbol(remote: &str, asset_class: AssetClass) -> String {
    match asset_class {
        AssetClass::Crypto => remote.replace('/', "-"),
        _ => remote.to_string(),
    }
}

/// Builds the query string for one page of a bars request.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let symbols = params
        .symbols
        .iter()
        .map(|s| to_remote_symbol(s, params.asset_class))
        .collect::<Vec<_>>()
        .join(",");

    let mut query = vec![
        ("symbols".to_string(), symbols),
        ("timeframe".to_string(), timeframe_param(&params.timeframe)),
        ("start".to_string(), params.start.to_rfc3339()),
        ("end".to_string(), params.end.to_rfc3339()),
    ];

    if let ProviderParams::Alpaca(extra) = &params.provider_specific {
        if params.asset_class != AssetClass::Crypto {
            if let Some(adjustment) = &extra.adjustment {
                query.push(("adjustment".to_string(), enum_param(adjustment)));
            }
            if let Some(feed) = &extra.feed {
                query.push(("feed".to_string(), enum_param(feed)));
            }
            if let Some(currency) = &extra.currency {
                query.push(("currency".to_string(), currency.clone()));
            }
        }
        if let Some(limit) = extra.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = &extra.sort {
            query.push(("sort".to_string(), enum_param(sort)));
        }
    }

    query
}

// The enums above serialize to bare snake_case strings.
fn enum_param<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn request(asset_class: AssetClass, extra: ProviderParams) -> BarsRequestParams {
        let start: DateTime<Utc> = "2025-04-01T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2025-05-01T00:00:00Z".parse().unwrap();
        BarsRequestParams {
            symbols: vec!["BTC-USD".into(), "ETH-USD".into()],
            timeframe: TimeFrame::hours(4),
            start,
            end,
            asset_class,
            provider_specific: extra,
        }
    }

    fn get<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_validate_timeframe() {
        assert!(validate_timeframe(&TimeFrame::hours(4)).is_ok());
        assert!(validate_timeframe(&TimeFrame::day()).is_ok());
        assert!(validate_timeframe(&TimeFrame::new(60, TimeFrameUnit::Minute)).is_err());
        assert!(validate_timeframe(&TimeFrame::hours(24)).is_err());
        assert!(validate_timeframe(&TimeFrame::new(2, TimeFrameUnit::Week)).is_err());
        assert!(validate_timeframe(&TimeFrame::new(4, TimeFrameUnit::Month)).is_err());
    }

    #[test]
    fn test_crypto_query() {
        let query = construct_params(&request(
            AssetClass::Crypto,
            ProviderParams::Alpaca(AlpacaBarsParams {
                feed: Some(Feed::Iex),
                limit: Some(1000),
                sort: Some(Sort::Asc),
                ..Default::default()
            }),
        ));
        assert_eq!(get(&query, "symbols"), Some("BTC/USD,ETH/USD"));
        assert_eq!(get(&query, "timeframe"), Some("4Hour"));
        assert_eq!(get(&query, "start"), Some("2025-04-01T00:00:00+00:00"));
        assert_eq!(get(&query, "limit"), Some("1000"));
        assert_eq!(get(&query, "sort"), Some("asc"));
        assert_eq!(get(&query, "feed"), None);
    }

    #[test]
    fn test_equity_query_keeps_stock_options() {
        let query = construct_params(&request(
            AssetClass::UsEquity,
            ProviderParams::Alpaca(AlpacaBarsParams {
                adjustment: Some(Adjustment::Split),
                feed: Some(Feed::Iex),
                ..Default::default()
            }),
        ));
        assert_eq!(get(&query, "symbols"), Some("BTC-USD,ETH-USD"));
        assert_eq!(get(&query, "adjustment"), Some("split"));
        assert_eq!(get(&query, "feed"), Some("iex"));
    }

    #[test]
    fn test_symbol_mapping_round_trip() {
        let remote = to_remote_symbol("SOL-USD", AssetClass::Crypto);
        assert_eq!(remote, "SOL/USD");
        assert_eq!(to_canonical_symbol(&remote, AssetClass::Crypto), "SOL-USD");
        assert_eq!(to_remote_symbol("AAPL", AssetClass::UsEquity), "AAPL");
    }
}
