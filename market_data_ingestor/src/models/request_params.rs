use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{asset::AssetClass, timeframe::TimeFrame},
    providers::{alpaca_rest::params::AlpacaBarsParams, coingecko_rest::params::CoinGeckoParams},
};

/// Universal parameters for requesting time-series bar data from any market data provider.
///
/// This struct is designed to be vendor-agnostic and supports multiple asset classes
/// (e.g., stocks, futures, crypto). It is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// List of canonical symbols to request (e.g., `["AAPL"]`, `["BTC-USD"]`).
    pub symbols: Vec<String>,

    /// The time interval for each bar (e.g., 1 hour, 1 day).
    ///
    /// **Validation of allowed values is performed by each data provider
    /// implementation, according to their own API rules.**
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    pub end: DateTime<Utc>,

    /// The asset class for the requested symbols.
    ///
    /// This helps providers route the request to the correct API or endpoint.
    pub asset_class: AssetClass,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

impl BarsRequestParams {
    /// Request for a single symbol with no provider-specific options.
    pub fn single(
        symbol: impl Into<String>,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        asset_class: AssetClass,
    ) -> Self {
        Self {
            symbols: vec![symbol.into()],
            timeframe,
            start,
            end,
            asset_class,
            provider_specific: ProviderParams::None,
        }
    }
}

/// Provider-specific request parameters.
///
/// Lets callers pass per-request options for one provider without cluttering
/// the universal [`BarsRequestParams`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
    CoinGecko(CoinGeckoParams),
}
