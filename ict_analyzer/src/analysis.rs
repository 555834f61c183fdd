//! Fetch, detect and render for one instrument.

use std::num::NonZeroUsize;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use market_data_ingestor::{
    models::{asset::AssetClass, request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::{DataProvider, ProviderError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    detect::{DEFAULT_WINDOW, detect_imbalances, detect_structure_breaks},
    render::{ChartRenderer, RenderError},
    signals::{ImbalanceZone, StructureBreak},
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The provider had no bars for the request.
    #[error("No data fetched for symbol: {symbol} ({timeframe}, {start} to {end})")]
    NoData {
        symbol: String,
        timeframe: TimeFrame,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The request was rejected before or by the provider.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Provider(ProviderError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Validation { message, .. } => AnalysisError::InvalidRequest(message),
            other => AnalysisError::Provider(other),
        }
    }
}

/// One instrument over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Canonical symbol, e.g. `BTC-USD`.
    pub symbol: String,
    pub timeframe: TimeFrame,
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
    /// Trailing window of the structure-break scan.
    pub window: NonZeroUsize,
    pub asset_class: AssetClass,
}

impl AnalysisRequest {
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            start,
            end,
            window: DEFAULT_WINDOW,
            asset_class: AssetClass::default(),
        }
    }

    pub fn with_window(mut self, window: NonZeroUsize) -> Self {
        self.window = window;
        self
    }

    pub fn with_asset_class(mut self, asset_class: AssetClass) -> Self {
        self.asset_class = asset_class;
        self
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest("symbol must not be empty".into()));
        }
        if self.start > self.end {
            return Err(AnalysisError::InvalidRequest(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// `[start 00:00Z, end + 1 day 00:00Z)`, so the whole end day is covered.
    pub fn time_range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), AnalysisError> {
        let after_end = self
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AnalysisError::InvalidRequest(format!("end date {} is out of range", self.end)))?;
        Ok((midnight(self.start), midnight(after_end)))
    }

    pub fn to_bars_params(&self) -> Result<BarsRequestParams, AnalysisError> {
        let (start, end) = self.time_range()?;
        Ok(BarsRequestParams::single(
            self.symbol.clone(),
            self.timeframe,
            start,
            end,
            self.asset_class,
        ))
    }

    fn no_data(&self) -> AnalysisError {
        AnalysisError::NoData {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            start: self.start,
            end: self.end,
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Everything one analysis produced. `C` is the renderer's output.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<C> {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub bar_count: usize,
    pub structure_breaks: Vec<StructureBreak>,
    pub imbalance_zones: Vec<ImbalanceZone>,
    #[serde(skip)]
    pub chart: C,
}

impl<C> AnalysisReport<C> {
    /// The last `n` structure breaks, oldest first.
    pub fn recent_structure_breaks(&self, n: usize) -> &[StructureBreak] {
        tail(&self.structure_breaks, n)
    }

    /// The last `n` imbalance zones, oldest first.
    pub fn recent_imbalance_zones(&self, n: usize) -> &[ImbalanceZone] {
        tail(&self.imbalance_zones, n)
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Runs the provider, both detectors and the renderer in sequence.
pub struct Analyzer<R> {
    provider: Box<dyn DataProvider + Send + Sync>,
    renderer: R,
}

impl<R: ChartRenderer> Analyzer<R> {
    pub fn new(provider: Box<dyn DataProvider + Send + Sync>, renderer: R) -> Self {
        Self { provider, renderer }
    }

    /// Fetches the requested bars, scans them and renders the result.
    ///
    /// An empty or missing series fails with [`AnalysisError::NoData`] before
    /// either detector or the renderer runs. Provider-side validation failures
    /// surface as [`AnalysisError::InvalidRequest`]. Nothing is retried.
    pub async fn run_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport<R::Output>, AnalysisError> {
        request.validate()?;
        let params = request.to_bars_params()?;
        debug!(
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            start = %params.start,
            end = %params.end,
            "fetching bars"
        );

        let series = self
            .provider
            .fetch_bars(params)
            .await?
            .into_iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(&request.symbol))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| request.no_data())?;

        if !series.is_chronological() {
            warn!(symbol = %series.symbol, "bars are not in strictly increasing time order");
        }

        let structure_breaks = detect_structure_breaks(&series.bars, request.window);
        let imbalance_zones = detect_imbalances(&series.bars);
        let chart = self.renderer.render(&series, &structure_breaks, &imbalance_zones)?;

        info!(
            symbol = %series.symbol,
            bars = series.len(),
            structure_breaks = structure_breaks.len(),
            imbalance_zones = imbalance_zones.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol: series.symbol,
            timeframe: series.timeframe,
            bar_count: series.bars.len(),
            structure_breaks,
            imbalance_zones,
            chart,
        })
    }
}
