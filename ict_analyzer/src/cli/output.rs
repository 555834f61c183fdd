use std::{fmt::Write as _, path::Path};

use serde::Serialize;

use crate::analysis::AnalysisReport;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-readable summary listing the latest `recent` signals of each kind.
pub fn format_text<C>(report: &AnalysisReport<C>, recent: usize, chart_path: &Path) -> String {
    let mut out = String::new();
    write_text(&mut out, report, recent, chart_path).expect("writing to a String");
    out
}

fn write_text<C>(out: &mut String, report: &AnalysisReport<C>, recent: usize, chart_path: &Path) -> std::fmt::Result {
    writeln!(
        out,
        "ICT analysis for {} ({}), {} bars",
        report.symbol, report.timeframe, report.bar_count
    )?;

    writeln!(out, "\nMost recent BOS signals:")?;
    let breaks = report.recent_structure_breaks(recent);
    if breaks.is_empty() {
        writeln!(out, "No BOS signals found.")?;
    }
    for signal in breaks {
        writeln!(
            out,
            "- {} | Date: {} | Price: ${:.2} | Action: {}",
            signal.label(),
            signal.time.format(TIME_FORMAT),
            signal.price,
            signal.action()
        )?;
    }

    writeln!(out, "\nMost recent FVG zones:")?;
    let zones = report.recent_imbalance_zones(recent);
    if zones.is_empty() {
        writeln!(out, "No FVG zones found.")?;
    }
    for zone in zones {
        writeln!(
            out,
            "- {} | From ${:.2} to ${:.2} at {} | Action: {}",
            zone.label(),
            zone.low,
            zone.high,
            zone.time.format(TIME_FORMAT),
            zone.action()
        )?;
    }

    writeln!(out, "\nChart saved to: {}", chart_path.display())
}

#[derive(Serialize)]
#[serde(bound = "")]
struct JsonOutput<'a, C> {
    #[serde(flatten)]
    report: &'a AnalysisReport<C>,
    chart_path: &'a Path,
}

/// The full report plus the chart location, as pretty JSON.
pub fn format_json<C>(report: &AnalysisReport<C>, chart_path: &Path) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonOutput { report, chart_path })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use market_data_ingestor::models::timeframe::TimeFrame;

    use super::*;
    use crate::signals::{Direction, ImbalanceZone, StructureBreak};

    fn report(breaks: usize) -> AnalysisReport<()> {
        let time: DateTime<Utc> = "2025-04-12T00:00:00Z".parse().unwrap();
        AnalysisReport {
            symbol: "BTC-USD".into(),
            timeframe: TimeFrame::day(),
            bar_count: 31,
            structure_breaks: (0..breaks)
                .map(|i| StructureBreak {
                    time,
                    price: 84_000.0 + i as f64,
                    direction: Direction::Up,
                })
                .collect(),
            imbalance_zones: vec![ImbalanceZone {
                time,
                low: 10.0,
                high: 15.5,
                direction: Direction::Down,
            }],
            chart: (),
        }
    }

    #[test]
    fn text_lists_recent_signals() {
        let text = format_text(&report(7), 5, Path::new("/tmp/chart.svg"));

        assert!(text.starts_with("ICT analysis for BTC-USD (1d), 31 bars"));
        assert_eq!(text.matches("- BOS-UP |").count(), 5);
        assert!(text.contains("- BOS-UP | Date: 2025-04-12 00:00 | Price: $84006.00 | Action: Buy"));
        assert!(!text.contains("$84001.00"));
        assert!(text.contains("- FVG-DOWN | From $10.00 to $15.50 at 2025-04-12 00:00 | Action: Sell"));
        assert!(text.contains("Chart saved to: /tmp/chart.svg"));
    }

    #[test]
    fn text_says_when_nothing_was_found() {
        let mut r = report(0);
        r.imbalance_zones.clear();

        let text = format_text(&r, 5, Path::new("c.svg"));

        assert!(text.contains("No BOS signals found."));
        assert!(text.contains("No FVG zones found."));
    }

    #[test]
    fn json_carries_everything() {
        let json = format_json(&report(2), Path::new("/tmp/chart.svg")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbol"], "BTC-USD");
        assert_eq!(value["timeframe"], "1d");
        assert_eq!(value["structure_breaks"].as_array().unwrap().len(), 2);
        assert_eq!(value["imbalance_zones"][0]["direction"], "DOWN");
        assert_eq!(value["chart_path"], "/tmp/chart.svg");
        assert!(value.get("chart").is_none());
    }
}
