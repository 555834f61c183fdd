use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        asset::AssetClass,
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu, ValidationSnafu,
        alpaca_rest::{
            params::{construct_params, to_canonical_symbol, validate_timeframe},
            response::{AlpacaBar, AlpacaResponse},
        },
    },
};

const STOCKS_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";
const CRYPTO_URL: &str = "https://data.alpaca.markets/v1beta3/crypto/us/bars";

pub struct AlpacaProvider {
    client: Client,
    authenticated: bool,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider with credentials.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key =
            SecretString::new(get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?.into());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            authenticated: true,
        })
    }

    /// Creates a provider without credentials. Only crypto bars can be fetched.
    pub fn anonymous() -> Result<Self, ProviderInitError> {
        let client = Client::builder().build().context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            authenticated: false,
        })
    }

    /// Uses credentials when both `APCA_*` variables are set, otherwise falls
    /// back to [`AlpacaProvider::anonymous`].
    pub fn from_env() -> Result<Self, ProviderInitError> {
        match Self::new() {
            Err(ProviderInitError::MissingEnvVar { .. }) => Self::anonymous(),
            other => other,
        }
    }

    fn endpoint(&self, asset_class: AssetClass) -> Result<&'static str, ProviderError> {
        match asset_class {
            AssetClass::Crypto => Ok(CRYPTO_URL),
            AssetClass::UsEquity if self.authenticated => Ok(STOCKS_URL),
            AssetClass::UsEquity => ValidationSnafu {
                message: "US equity bars require APCA_API_KEY_ID and APCA_API_SECRET_KEY",
            }
            .fail(),
            AssetClass::Futures => ValidationSnafu {
                message: "Alpaca does not serve futures bars",
            }
            .fail(),
        }
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        // Validate the timeframe before proceeding.
        validate_timeframe(&params.timeframe)?;
        let url = self.endpoint(params.asset_class)?;

        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query_params = construct_params(&params);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            let response = self
                .client
                .get(url)
                .query(&query_params)
                .send()
                .await
                .context(ReqwestSnafu)?;

            if !response.status().is_success() {
                let status = response.status();
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    message: format!("{status}: {error_msg}"),
                }
                .fail();
            }

            let alpaca_response = response.json::<AlpacaResponse>().await.context(ReqwestSnafu)?;
            pages += 1;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in alpaca_response.bars {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            match alpaca_response.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }
        debug!(pages, symbols = all_bars.len(), "alpaca bars fetched");

        let result = all_bars
            .into_iter()
            .map(|(remote, alpaca_bars)| {
                let bars = alpaca_bars
                    .into_iter()
                    .map(|ab| Bar {
                        timestamp: ab.timestamp,
                        open: ab.open,
                        high: ab.high,
                        low: ab.low,
                        close: ab.close,
                        volume: ab.volume,
                        trade_count: ab.trade_count,
                        vwap: ab.vwap,
                    })
                    .collect();

                BarSeries {
                    symbol: to_canonical_symbol(&remote, params.asset_class),
                    timeframe: params.timeframe,
                    bars,
                }
            })
            .collect();

        Ok(result)
    }
}
