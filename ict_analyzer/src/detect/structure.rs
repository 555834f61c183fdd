//! Break-of-structure scan.

use std::num::NonZeroUsize;

use market_data_ingestor::models::bar::Bar;

use crate::signals::{Direction, StructureBreak};

/// Window used when the caller does not pick one.
pub const DEFAULT_WINDOW: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Scans `bars` for highs above and lows below the trailing `window` bars.
///
/// For each index `i` in `window..len - window` the bar is compared against
/// `bars[i - window..i]` only, so no future bar is ever consulted. The last
/// `window` bars are never scanned, and a series of `2 * window` bars or fewer
/// yields nothing.
///
/// Both directions are checked independently: a bar that engulfs its whole
/// window emits an UP break followed by a DOWN break at the same time. Ties
/// with the window extreme do not count.
///
/// Bars are not validated. NaN prices compare false and suppress the signal.
pub fn detect_structure_breaks(bars: &[Bar], window: NonZeroUsize) -> Vec<StructureBreak> {
    let window = window.get();
    if bars.len() <= window.saturating_mul(2) {
        return Vec::new();
    }

    let mut signals = Vec::new();
    for i in window..bars.len() - window {
        let prior = &bars[i - window..i];
        let bar = &bars[i];

        if let Some(prior_high) = extreme(prior.iter().map(|b| b.high), |candidate, best| candidate > best) {
            if bar.high > prior_high {
                signals.push(StructureBreak {
                    time: bar.timestamp,
                    price: bar.high,
                    direction: Direction::Up,
                });
            }
        }

        if let Some(prior_low) = extreme(prior.iter().map(|b| b.low), |candidate, best| candidate < best) {
            if bar.low < prior_low {
                signals.push(StructureBreak {
                    time: bar.timestamp,
                    price: bar.low,
                    direction: Direction::Down,
                });
            }
        }
    }

    signals
}

// Keeps the first value and replaces it only when `better` holds, so a NaN in
// the window behaves the same way on every run.
fn extreme(values: impl Iterator<Item = f64>, better: impl Fn(f64, f64) -> bool) -> Option<f64> {
    values.fold(None, |best, value| match best {
        Some(current) if !better(value, current) => Some(current),
        _ => Some(value),
    })
}
