use std::{
    env,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use market_data_ingestor::models::bar::BarSeries;
use uuid::Uuid;

use super::{ChartRenderer, RenderError};
use crate::signals::{Direction, ImbalanceZone, StructureBreak};

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const MARKER: f64 = 6.0;

/// A standalone SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgChart {
    pub symbol: String,
    pub content: String,
}

impl SvgChart {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn write_to(&self, path: &Path) -> Result<(), RenderError> {
        fs::write(path, &self.content).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the chart into `dir` as `<symbol>_<yyyymmddHHMMSS>_<uuid>.svg`,
    /// creating the directory when needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, RenderError> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| RenderError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let symbol = self.symbol.replace(['/', '\\'], "-");
        let path = dir.join(format!("{symbol}_{timestamp}_{}.svg", Uuid::new_v4()));
        self.write_to(&path)?;
        Ok(path)
    }
}

/// `<tmp>/ict_analyzer`, used when no output directory is configured.
pub fn default_output_dir() -> PathBuf {
    env::temp_dir().join("ict_analyzer")
}

/// Draws high-low wicks, the close line, FVG bands and BOS markers.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    width: f64,
    height: f64,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::new(1400, 600)
    }
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        // Keep a drawable plot area even for silly sizes.
        Self {
            width: f64::from(width).max(MARGIN_LEFT + MARGIN_RIGHT + 100.0),
            height: f64::from(height).max(MARGIN_TOP + MARGIN_BOTTOM + 100.0),
        }
    }
}

struct Frame {
    t_min: f64,
    t_span: f64,
    p_min: f64,
    p_span: f64,
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
}

impl Frame {
    fn x(&self, t: DateTime<Utc>) -> f64 {
        if self.t_span == 0.0 {
            return self.left + self.plot_w / 2.0;
        }
        self.left + (t.timestamp() as f64 - self.t_min) / self.t_span * self.plot_w
    }

    fn y(&self, price: f64) -> f64 {
        self.top + (1.0 - (price - self.p_min) / self.p_span) * self.plot_h
    }
}

impl ChartRenderer for SvgChartRenderer {
    type Output = SvgChart;

    fn render(
        &self,
        series: &BarSeries,
        breaks: &[StructureBreak],
        zones: &[ImbalanceZone],
    ) -> Result<SvgChart, RenderError> {
        let (Some(first), Some(last)) = (series.bars.first(), series.bars.last()) else {
            return Err(RenderError::EmptySeries {
                symbol: series.symbol.clone(),
            });
        };

        let frame = self.frame(series, zones);
        let (w, h) = (self.width, self.height);
        let mut out = String::new();

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#
        )?;
        writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="24" text-anchor="middle" font-size="16">ICT Price Action Signals ({} {})</text>"#,
            w / 2.0,
            escape(&series.symbol),
            series.timeframe
        )?;

        for zone in zones.iter().filter(|z| z.low.is_finite() && z.high.is_finite()) {
            let y_high = frame.y(zone.high);
            let band = zone.height() / frame.p_span * frame.plot_h;
            let class = match zone.direction {
                Direction::Up => "fvg fvg-up",
                Direction::Down => "fvg fvg-down",
            };
            writeln!(
                out,
                r#"<rect class="{class}" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="orange" fill-opacity="0.2"/>"#,
                frame.left,
                y_high,
                frame.plot_w,
                band.max(0.5)
            )?;
        }

        for bar in series.bars.iter().filter(|b| b.low.is_finite() && b.high.is_finite()) {
            let x = frame.x(bar.timestamp);
            writeln!(
                out,
                r##"<line class="wick" x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="#9e9e9e"/>"##,
                frame.y(bar.high),
                frame.y(bar.low)
            )?;
        }

        let points = series
            .bars
            .iter()
            .filter(|b| b.close.is_finite())
            .map(|b| format!("{:.1},{:.1}", frame.x(b.timestamp), frame.y(b.close)))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            out,
            r#"<polyline class="close" fill="none" stroke="black" stroke-width="1.5" points="{points}"/>"#
        )?;

        for signal in breaks.iter().filter(|s| s.price.is_finite()) {
            let (x, y) = (frame.x(signal.time), frame.y(signal.price));
            let (class, color, tip, base) = match signal.direction {
                Direction::Up => ("bos bos-up", "green", y - MARKER - 2.0, y + MARKER - 2.0),
                Direction::Down => ("bos bos-down", "red", y + MARKER + 2.0, y - MARKER + 2.0),
            };
            writeln!(
                out,
                r#"<polygon class="{class}" fill="{color}" points="{x:.1},{tip:.1} {:.1},{base:.1} {:.1},{base:.1}"/>"#,
                x - MARKER,
                x + MARKER
            )?;
        }

        self.axes(&mut out, &frame, first.timestamp, last.timestamp)?;
        writeln!(out, "</svg>")?;

        Ok(SvgChart {
            symbol: series.symbol.clone(),
            content: out,
        })
    }
}

impl SvgChartRenderer {
    fn frame(&self, series: &BarSeries, zones: &[ImbalanceZone]) -> Frame {
        let times = series.bars.iter().map(|b| b.timestamp.timestamp() as f64);
        let t_min = times.clone().fold(f64::INFINITY, f64::min);
        let t_max = times.fold(f64::NEG_INFINITY, f64::max);

        let prices = series
            .bars
            .iter()
            .flat_map(|b| [b.low, b.high, b.close])
            .chain(zones.iter().flat_map(|z| [z.low, z.high]))
            .filter(|p| p.is_finite());
        let (mut p_min, mut p_max) = prices.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        });
        if !p_min.is_finite() {
            (p_min, p_max) = (0.0, 1.0);
        }
        if p_max == p_min {
            let pad = (p_min.abs() * 0.01).max(1.0);
            (p_min, p_max) = (p_min - pad, p_max + pad);
        }
        let pad = (p_max - p_min) * 0.05;

        Frame {
            t_min,
            t_span: t_max - t_min,
            p_min: p_min - pad,
            p_span: (p_max - p_min) + 2.0 * pad,
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            plot_w: self.width - MARGIN_LEFT - MARGIN_RIGHT,
            plot_h: self.height - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn axes(
        &self,
        out: &mut String,
        frame: &Frame,
        first: DateTime<Utc>,
        last: DateTime<Utc>,
    ) -> Result<(), RenderError> {
        let (left, top) = (frame.left, frame.top);
        let (right, bottom) = (left + frame.plot_w, top + frame.plot_h);
        let p_max = frame.p_min + frame.p_span;

        writeln!(
            out,
            r#"<path class="axes" d="M{left:.1},{top:.1} V{bottom:.1} H{right:.1}" fill="none" stroke="black"/>"#
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            left - 6.0,
            top + 4.0,
            p_max
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            left - 6.0,
            bottom,
            frame.p_min
        )?;
        writeln!(
            out,
            r#"<text x="{left:.1}" y="{:.1}">{}</text>"#,
            bottom + 16.0,
            first.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(
            out,
            r#"<text x="{right:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            bottom + 16.0,
            last.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">Date</text>"#,
            (left + right) / 2.0,
            bottom + 36.0
        )?;
        writeln!(
            out,
            r#"<text x="16" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">Price</text>"#,
            (top + bottom) / 2.0,
            (top + bottom) / 2.0
        )?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">Close Price</text>"#,
            right,
            top - 6.0
        )?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
