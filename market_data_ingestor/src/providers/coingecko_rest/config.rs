use std::num::NonZeroU32;

use indexmap::IndexMap;
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Settings for [`CoinGeckoProvider`](super::CoinGeckoProvider).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoinGeckoConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Quote currency passed as `vs_currency`.
    pub vs_currency: String,
    /// Upper bound on requests sent per minute.
    pub requests_per_minute: NonZeroU32,
    /// Environment variable holding an optional demo API key.
    pub api_key_env: String,
    /// Emit one flat bar per price point instead of aggregating per timeframe.
    pub close_only: bool,
    /// Canonical symbol (`BTC-USD`) to CoinGecko coin id (`bitcoin`).
    pub symbols: IndexMap<String, String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            vs_currency: "usd".to_string(),
            requests_per_minute: nonzero!(30u32),
            api_key_env: "COINGECKO_API_KEY".to_string(),
            close_only: false,
            symbols: default_symbol_map(),
        }
    }
}

impl CoinGeckoConfig {
    /// Coin id for a canonical symbol, ignoring ASCII case.
    pub fn coin_id(&self, symbol: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|(canonical, _)| canonical.eq_ignore_ascii_case(symbol))
            .map(|(_, id)| id.as_str())
    }
}

pub fn default_symbol_map() -> IndexMap<String, String> {
    [
        ("BTC-USD", "bitcoin"),
        ("ETH-USD", "ethereum"),
        ("XRP-USD", "ripple"),
        ("BNB-USD", "binancecoin"),
        ("SOL-USD", "solana"),
        ("ADA-USD", "cardano"),
        ("DOGE-USD", "dogecoin"),
        ("AVAX-USD", "avalanche-2"),
        ("DOT-USD", "polkadot"),
        ("TON1141-USD", "toncoin"),
    ]
    .into_iter()
    .map(|(symbol, id)| (symbol.to_string(), id.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_lookup_ignores_case() {
        let cfg = CoinGeckoConfig::default();
        assert_eq!(cfg.coin_id("BTC-USD"), Some("bitcoin"));
        assert_eq!(cfg.coin_id("avax-usd"), Some("avalanche-2"));
        assert_eq!(cfg.coin_id("SHIB-USD"), None);
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let cfg: CoinGeckoConfig = serde_json::from_str(r#"{"vs_currency": "eur"}"#).unwrap();
        assert_eq!(cfg.vs_currency, "eur");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.symbols.len(), 10);
    }
}
