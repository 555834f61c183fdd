//! Provider registry that maps a [`ProviderKind`] to a concrete provider.
use market_data_ingestor::providers::{
    DataProvider, ProviderInitError, alpaca_rest::AlpacaProvider, coingecko_rest::CoinGeckoProvider,
    csv_file::CsvFileProvider,
};

use crate::config::{AnalyzerConfig, ProviderKind};

/// Build and return a boxed data provider for `kind`, configured from `config`.
pub fn build_provider(
    kind: ProviderKind,
    config: &AnalyzerConfig,
) -> Result<Box<dyn DataProvider + Send + Sync>, ProviderInitError> {
    match kind {
        ProviderKind::CoinGecko => {
            let p = CoinGeckoProvider::new(config.coingecko.clone())?;
            Ok(Box::new(p))
        }
        ProviderKind::Alpaca => {
            let p = AlpacaProvider::from_env()?;
            Ok(Box::new(p))
        }
        ProviderKind::Csv => Ok(Box::new(CsvFileProvider::new(config.csv.clone()))),
    }
}
