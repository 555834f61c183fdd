use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use ict_analyzer::detect::{detect_imbalances, detect_structure_breaks};
use market_data_ingestor::models::bar::Bar;
use proptest::prelude::*;

fn to_bars(ranges: &[(f64, f64)]) -> Vec<Bar> {
    let t0: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
    ranges
        .iter()
        .enumerate()
        .map(|(i, &(low, span))| Bar {
            low,
            high: low + span,
            open: low,
            close: low + span,
            ..Bar::flat(t0 + Duration::hours(i as i64), low)
        })
        .collect()
}

fn ranges(max_len: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    proptest::collection::vec((1.0f64..100.0, 0.0f64..10.0), 0..max_len)
}

proptest! {
    #[test]
    fn short_series_have_no_structure_breaks(window in 1usize..6, input in ranges(12)) {
        let window = NonZeroUsize::new(window).unwrap();
        let bars = to_bars(&input[..input.len().min(2 * window.get())]);
        prop_assert!(detect_structure_breaks(&bars, window).is_empty());
    }

    #[test]
    fn fewer_than_three_bars_have_no_imbalances(input in ranges(3)) {
        prop_assert!(detect_imbalances(&to_bars(&input)).is_empty());
    }

    #[test]
    fn visible_structure_breaks_survive_appending(
        window in 1usize..5,
        input in ranges(60),
        cut in 0usize..60,
    ) {
        let window = NonZeroUsize::new(window).unwrap();
        let bars = to_bars(&input);
        let cut = cut.min(bars.len());

        let early = detect_structure_breaks(&bars[..cut], window);
        let full = detect_structure_breaks(&bars, window);

        // Index i is visible once the series is longer than i + window.
        let horizon = cut.saturating_sub(window.get());
        let expected: Vec<_> = full
            .into_iter()
            .filter(|s| horizon > 0 && s.time < bars[horizon].timestamp)
            .collect();
        prop_assert_eq!(early, expected);
    }

    #[test]
    fn imbalances_survive_appending(input in ranges(60), cut in 0usize..60) {
        let bars = to_bars(&input);
        let cut = cut.min(bars.len());

        let early = detect_imbalances(&bars[..cut]);
        let full = detect_imbalances(&bars);

        let expected: Vec<_> = match cut.checked_sub(1) {
            Some(last) => full.into_iter().filter(|z| z.time <= bars[last].timestamp).collect(),
            None => Vec::new(),
        };
        prop_assert_eq!(early, expected);
    }

    #[test]
    fn emitted_zones_are_non_empty(input in ranges(40)) {
        for zone in detect_imbalances(&to_bars(&input)) {
            prop_assert!(zone.low < zone.high);
        }
    }

    #[test]
    fn break_price_is_the_triggering_extreme(window in 1usize..5, input in ranges(40)) {
        let bars = to_bars(&input);
        for signal in detect_structure_breaks(&bars, NonZeroUsize::new(window).unwrap()) {
            let bar = bars.iter().find(|b| b.timestamp == signal.time).unwrap();
            prop_assert!(signal.price == bar.high || signal.price == bar.low);
        }
    }
}
