//! CoinGecko REST provider.
//!
//! `market_chart/range` only returns close prices, so bars are either
//! aggregated per timeframe bucket or emitted as flat close-only bars.

pub mod aggregate;
pub mod config;
pub mod params;
pub mod provider;
pub mod response;

pub use config::CoinGeckoConfig;
pub use provider::CoinGeckoProvider;
