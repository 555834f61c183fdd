//! Records emitted by the detectors.
//!
//! Both record types are plain values: produced once, never mutated, and ordered
//! by the bar index that triggered them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which way a signal points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

/// Trade bias implied by a signal's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
}

impl Direction {
    pub fn action(self) -> Action {
        match self {
            Direction::Up => Action::Buy,
            Direction::Down => Action::Sell,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
        })
    }
}

/// A bar whose high or low escaped the trailing window (break of structure).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureBreak {
    /// Timestamp of the triggering bar.
    pub time: DateTime<Utc>,
    /// The triggering bar's high for an upward break, its low for a downward one.
    pub price: f64,
    pub direction: Direction,
}

impl StructureBreak {
    pub fn action(&self) -> Action {
        self.direction.action()
    }

    /// `BOS-UP` / `BOS-DOWN`.
    pub fn label(&self) -> String {
        format!("BOS-{}", self.direction)
    }
}

/// Price gap left between the first and third bar of a triple (fair value gap).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceZone {
    /// Timestamp of the third bar of the triple.
    pub time: DateTime<Utc>,
    pub low: f64,
    pub high: f64,
    pub direction: Direction,
}

impl ImbalanceZone {
    pub fn action(&self) -> Action {
        self.direction.action()
    }

    /// `FVG-UP` / `FVG-DOWN`.
    pub fn label(&self) -> String {
        format!("FVG-{}", self.direction)
    }

    pub fn height(&self) -> f64 {
        self.high - self.low
    }
}
