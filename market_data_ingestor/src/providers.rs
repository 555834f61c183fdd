//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching time-series bar data from any market data vendor (e.g., CoinGecko, Alpaca)
//! or from local files.
//!
//! Each concrete provider implementation should implement [`DataProvider`] to handle
//! vendor-specific API logic, symbol mapping and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```
//!

pub mod alpaca_rest;
pub mod coingecko_rest;
pub mod csv_file;

use std::path::PathBuf;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching time-series bar data from a market data provider.
///
/// Implement this trait for each concrete data source.
/// The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
/// for runtime selection of providers.
#[async_trait]
pub trait DataProvider {
    /// Fetches time-series bar data for the given request parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameters specifying symbols, timeframe, and date range.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - A vector of bar series, one per symbol. A symbol with
    ///   no bars in the range may be missing or come back with an empty `bars` vector.
    /// * `Err(ProviderError)` - If the request fails.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout, bad JSON).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid API key).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// Reading a local data file failed.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A local data file is not valid CSV for the bar schema.
    #[snafu(display("Malformed CSV in {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl ProviderError {
    /// `true` when the request itself was rejected, as opposed to a transport
    /// or data failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, ProviderError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use crate::models::{asset::AssetClass, timeframe::TimeFrame};

    use super::*;

    struct EmptyProvider;
    struct RejectingProvider;

    #[async_trait]
    impl DataProvider for EmptyProvider {
        async fn fetch_bars(&self, _params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl DataProvider for RejectingProvider {
        async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
            ValidationSnafu {
                message: format!("Unsupported symbol: {}", params.symbols.join(",")),
            }
            .fail()
        }
    }

    // Chosen at runtime, so it has to come back boxed.
    fn get_provider(name: &str) -> Box<dyn DataProvider + Send + Sync> {
        if name == "empty" {
            Box::new(EmptyProvider)
        } else {
            Box::new(RejectingProvider)
        }
    }

    fn params() -> BarsRequestParams {
        BarsRequestParams::single("BTC-USD", TimeFrame::day(), Utc::now(), Utc::now(), AssetClass::Crypto)
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider = get_provider("empty");
        let result = provider.fetch_bars(params()).await;
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors_are_classified() {
        let provider = get_provider("rejecting");
        let err = provider.fetch_bars(params()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid parameters for provider: Unsupported symbol: BTC-USD");
    }
}
