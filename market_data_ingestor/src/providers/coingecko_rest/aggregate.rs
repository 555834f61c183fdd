//! Turns sampled close prices into bars.

use chrono::{DateTime, Utc};

use crate::models::{bar::Bar, timeframe::TimeFrame};

use super::response::PricePoint;

/// Sorts points, drops duplicate timestamps (chunk edges overlap) and keeps
/// only those inside `[start, end)`.
pub fn normalize_points(
    mut points: Vec<PricePoint>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<PricePoint> {
    points.retain(|p| p.timestamp >= start && p.timestamp < end);
    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);
    points
}

/// One OHLC bar per timeframe bucket, stamped with the bucket start.
///
/// `points` must already be sorted.
pub fn aggregate_points(points: &[PricePoint], timeframe: &TimeFrame) -> Vec<Bar> {
    let mut bars: Vec<Bar> = Vec::new();

    for point in points {
        let bucket = timeframe.bucket_start(point.timestamp);
        match bars.last_mut() {
            Some(bar) if bar.timestamp == bucket => {
                if point.price > bar.high {
                    bar.high = point.price;
                }
                if point.price < bar.low {
                    bar.low = point.price;
                }
                bar.close = point.price;
            }
            _ => bars.push(Bar::flat(bucket, point.price)),
        }
    }

    bars
}

/// One degenerate bar per point (`open = high = low = close`).
pub fn flat_bars(points: &[PricePoint]) -> Vec<Bar> {
    points.iter().map(|p| Bar::flat(p.timestamp, p.price)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn point(offset_min: i64, price: f64) -> PricePoint {
        let t0: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        PricePoint {
            timestamp: t0 + Duration::minutes(offset_min),
            price,
        }
    }

    #[test]
    fn hourly_points_collapse_into_four_hour_bars() {
        let points = vec![
            point(5, 100.0),
            point(65, 104.0),
            point(125, 98.0),
            point(185, 101.0),
            point(245, 110.0),
        ];
        let bars = aggregate_points(&points, &TimeFrame::hours(4));

        assert_eq!(bars.len(), 2);
        let first = &bars[0];
        assert_eq!(first.timestamp, point(0, 0.0).timestamp);
        assert_eq!((first.open, first.high, first.low, first.close), (100.0, 104.0, 98.0, 101.0));
        let second = &bars[1];
        assert_eq!(second.timestamp, point(240, 0.0).timestamp);
        assert_eq!((second.open, second.high, second.low, second.close), (110.0, 110.0, 110.0, 110.0));
    }

    #[test]
    fn normalize_sorts_dedups_and_clips() {
        let start = point(0, 0.0).timestamp;
        let end = point(120, 0.0).timestamp;
        let points = vec![point(60, 2.0), point(0, 1.0), point(60, 2.5), point(120, 3.0), point(-1, 0.5)];

        let out = normalize_points(points, start, end);
        let prices: Vec<_> = out.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 2.0]);
    }

    #[test]
    fn flat_bars_keep_every_point() {
        let bars = flat_bars(&[point(0, 1.0), point(1, 2.0)]);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].high, 2.0);
        assert_eq!(bars[1].low, 2.0);
    }
}
