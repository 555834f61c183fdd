//! Break-of-structure (BOS) and fair-value-gap (FVG) detection over
//! historical price bars.
//!
//! [`analysis::Analyzer`] fetches a [`BarSeries`](market_data_ingestor::models::bar::BarSeries)
//! from any [`DataProvider`](market_data_ingestor::providers::DataProvider),
//! runs both scans from [`detect`] and hands the series and signals to a
//! [`render::ChartRenderer`].

pub mod analysis;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod detect;
pub mod providers;
pub mod render;
pub mod signals;
