use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, header};
use shared_utils::env::optional_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        bar::BarSeries,
        request_params::{BarsRequestParams, ProviderParams},
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, ProviderError,
        ProviderInitError, ReqwestSnafu, ValidationSnafu,
        coingecko_rest::{
            aggregate::{aggregate_points, flat_bars, normalize_points},
            config::CoinGeckoConfig,
            params::{chunk_range, construct_params, validate_timeframe},
            response::{MarketChartResponse, PricePoint},
        },
    },
};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

pub struct CoinGeckoProvider {
    client: Client,
    config: CoinGeckoConfig,
    limiter: DefaultDirectRateLimiter,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider.
    ///
    /// A demo API key is picked up from the variable named by
    /// `config.api_key_env` when it is set; the public tier works without one.
    pub fn new(config: CoinGeckoConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = optional_env_var(&config.api_key_env) {
            headers.insert(
                API_KEY_HEADER,
                header::HeaderValue::from_str(&key).context(InvalidApiKeySnafu)?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;
        let limiter = RateLimiter::direct(Quota::per_minute(config.requests_per_minute));

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    async fn fetch_range(
        &self,
        coin_id: &str,
        vs_currency: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        self.limiter.until_ready().await;

        let url = format!(
            "{}/coins/{}/market_chart/range",
            self.config.base_url.trim_end_matches('/'),
            coin_id
        );
        debug!(coin_id, %from, %to, "requesting coingecko market chart");

        let response = self
            .client
            .get(&url)
            .query(&construct_params(vs_currency, from, to))
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

        let chart = response
            .json::<MarketChartResponse>()
            .await
            .context(ReqwestSnafu)?;
        Ok(chart.price_points())
    }
}

#[async_trait]
impl DataProvider for CoinGeckoProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        validate_timeframe(&params.timeframe)?;

        let overrides = match &params.provider_specific {
            ProviderParams::CoinGecko(p) => Some(p),
            _ => None,
        };
        let vs_currency = overrides
            .and_then(|p| p.vs_currency.as_deref())
            .unwrap_or(self.config.vs_currency.as_str());
        let close_only = overrides
            .and_then(|p| p.close_only)
            .unwrap_or(self.config.close_only);

        let mut result = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            let Some(coin_id) = self.config.coin_id(symbol) else {
                return ValidationSnafu {
                    message: format!("Unsupported symbol: {symbol}"),
                }
                .fail();
            };

            let mut points = Vec::new();
            for (from, to) in chunk_range(params.start, params.end, &params.timeframe) {
                points.extend(self.fetch_range(coin_id, vs_currency, from, to).await?);
            }
            let points = normalize_points(points, params.start, params.end);

            let bars = if close_only {
                flat_bars(&points)
            } else {
                aggregate_points(&points, &params.timeframe)
            };
            debug!(symbol = %symbol, points = points.len(), bars = bars.len(), "coingecko bars built");

            result.push(BarSeries {
                symbol: symbol.clone(),
                timeframe: params.timeframe,
                bars,
            });
        }

        Ok(result)
    }
}
