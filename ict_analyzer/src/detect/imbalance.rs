//! Fair-value-gap scan.

use market_data_ingestor::models::bar::Bar;

use crate::signals::{Direction, ImbalanceZone};

/// Scans every run of three consecutive bars for a gap between the outer two.
///
/// The middle bar is ignored. When the first bar's high sits strictly below the
/// third bar's low an UP zone `[first.high, third.low]` is emitted; when the
/// third bar's high sits strictly below the first bar's low a DOWN zone
/// `[third.high, first.low]` is emitted. Both checks run for every triple.
///
/// Fewer than three bars yields nothing. Bars are not validated.
pub fn detect_imbalances(bars: &[Bar]) -> Vec<ImbalanceZone> {
    let mut zones = Vec::new();

    for triple in bars.windows(3) {
        let (first, third) = (&triple[0], &triple[2]);

        if first.high < third.low {
            zones.push(ImbalanceZone {
                time: third.timestamp,
                low: first.high,
                high: third.low,
                direction: Direction::Up,
            });
        }

        if third.high < first.low {
            zones.push(ImbalanceZone {
                time: third.timestamp,
                low: third.high,
                high: first.low,
                direction: Direction::Down,
            });
        }
    }

    zones
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::*;

    fn bars(ranges: &[(f64, f64)]) -> Vec<Bar> {
        let t0: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(low, high))| Bar {
                timestamp: t0 + Duration::hours(4 * i as i64),
                open: low,
                high,
                low,
                close: high,
                volume: 0.0,
                trade_count: None,
                vwap: None,
            })
            .collect()
    }

    #[test]
    fn gap_up_between_outer_bars() {
        let series = bars(&[(5.0, 10.0), (8.0, 12.0), (15.0, 20.0)]);

        let zones = detect_imbalances(&series);

        assert_eq!(
            zones,
            vec![ImbalanceZone {
                time: series[2].timestamp,
                low: 10.0,
                high: 15.0,
                direction: Direction::Up,
            }]
        );
    }

    #[test]
    fn gap_down_between_outer_bars() {
        let series = bars(&[(15.0, 20.0), (8.0, 12.0), (5.0, 10.0)]);

        let zones = detect_imbalances(&series);

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].direction, Direction::Down);
        assert_eq!((zones[0].low, zones[0].high), (10.0, 15.0));
        assert_eq!(zones[0].time, series[2].timestamp);
    }

    #[test]
    fn middle_bar_does_not_fill_the_gap() {
        // The middle bar spans the whole gap; only the outer bars matter.
        let series = bars(&[(5.0, 10.0), (0.0, 100.0), (15.0, 20.0)]);
        assert_eq!(detect_imbalances(&series).len(), 1);
    }

    #[test]
    fn touching_ranges_are_not_a_gap() {
        let series = bars(&[(5.0, 10.0), (8.0, 12.0), (10.0, 20.0)]);
        assert!(detect_imbalances(&series).is_empty());
    }

    #[test]
    fn fewer_than_three_bars_is_empty() {
        assert!(detect_imbalances(&[]).is_empty());
        assert!(detect_imbalances(&bars(&[(1.0, 2.0)])).is_empty());
        assert!(detect_imbalances(&bars(&[(1.0, 2.0), (5.0, 6.0)])).is_empty());
    }

    #[test]
    fn zones_are_ordered_by_third_bar() {
        let series = bars(&[(5.0, 10.0), (8.0, 12.0), (15.0, 20.0), (18.0, 25.0), (30.0, 35.0)]);

        let zones = detect_imbalances(&series);

        // Triples ending at 2, 3 and 4: gaps at 2 (10..15), 3 (12..18) and 4 (20..30).
        let times: Vec<_> = zones.iter().map(|z| z.time).collect();
        assert_eq!(times, vec![series[2].timestamp, series[3].timestamp, series[4].timestamp]);
        assert_eq!((zones[2].low, zones[2].high), (20.0, 30.0));
    }

    #[test]
    fn inverted_bars_can_emit_both_directions() {
        // Malformed input (low above high) is scanned as-is.
        let series = bars(&[(20.0, 5.0), (0.0, 0.0), (10.0, 1.0)]);

        let zones = detect_imbalances(&series);

        let directions: Vec<_> = zones.iter().map(|z| z.direction).collect();
        assert_eq!(directions, vec![Direction::Up, Direction::Down]);
    }

    #[test]
    fn nan_bars_emit_nothing() {
        let series = bars(&[(5.0, 10.0), (8.0, 12.0), (f64::NAN, f64::NAN)]);
        assert!(detect_imbalances(&series).is_empty());
    }
}
