//! Chart rendering for an analysed series.

mod svg;

use std::path::PathBuf;

use market_data_ingestor::models::bar::BarSeries;
use thiserror::Error;

use crate::signals::{ImbalanceZone, StructureBreak};

pub use svg::{SvgChart, SvgChartRenderer, default_output_dir};

#[derive(Debug, Error)]
pub enum RenderError {
    /// There is nothing to draw.
    #[error("Cannot render an empty series for {symbol}")]
    EmptySeries { symbol: String },

    /// Writing the rendered chart failed.
    #[error("Failed to write chart to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chart formatting failed")]
    Fmt(#[from] std::fmt::Error),
}

/// Turns a series and its detected signals into a chart.
///
/// The analyzer never looks inside [`ChartRenderer::Output`]; it only hands it
/// back to the caller. For example an SVG renderer returns the document, a
/// test renderer might return a call counter.
pub trait ChartRenderer {
    /// What a successful render produces.
    type Output;

    fn render(
        &self,
        series: &BarSeries,
        breaks: &[StructureBreak],
        zones: &[ImbalanceZone],
    ) -> Result<Self::Output, RenderError>;
}
