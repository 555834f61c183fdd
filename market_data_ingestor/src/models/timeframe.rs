//! Bar interval model shared by every provider.
//!
//! A [`TimeFrame`] pairs an amount with a [`TimeFrameUnit`] (`4h`, `1d`, ...).
//! Which combinations a vendor accepts is decided by each provider; this module
//! only rejects a zero amount.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeFrameError {
    #[error("Invalid amount for {:?}: {}", unit, message)]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {}", message)]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    /// Monday-based, UTC
    Week,
    /// Calendar months, UTC
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub const fn new(amount: u32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    pub fn try_new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        if amount == 0 {
            return Err(TimeFrameError::InvalidAmount {
                unit,
                message: "amount must be greater than zero".into(),
            });
        }
        Ok(Self { amount, unit })
    }

    pub const fn hours(amount: u32) -> Self {
        Self::new(amount, TimeFrameUnit::Hour)
    }

    pub const fn day() -> Self {
        Self::new(1, TimeFrameUnit::Day)
    }

    pub const fn week() -> Self {
        Self::new(1, TimeFrameUnit::Week)
    }

    /// Length of one bar, or `None` for calendar months.
    pub fn duration(&self) -> Option<Duration> {
        let amount = i64::from(self.amount);
        match self.unit {
            TimeFrameUnit::Minute => Some(Duration::minutes(amount)),
            TimeFrameUnit::Hour => Some(Duration::hours(amount)),
            TimeFrameUnit::Day => Some(Duration::days(amount)),
            TimeFrameUnit::Week => Some(Duration::weeks(amount)),
            TimeFrameUnit::Month => None,
        }
    }

    /// Start of the bucket that contains `ts`.
    ///
    /// Minute, hour and day buckets are aligned to the unix epoch, weeks start on
    /// Monday 00:00 UTC and months on the first of the month.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let amount = i64::from(self.amount.max(1));
        match self.unit {
            TimeFrameUnit::Month => {
                let index = i64::from(ts.year()) * 12 + i64::from(ts.month0());
                let start = index.div_euclid(amount) * amount;
                let year = start.div_euclid(12) as i32;
                let month = start.rem_euclid(12) as u32 + 1;
                Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
                    .single()
                    .unwrap_or(ts)
            }
            _ => {
                let Some(span) = self.duration().map(|d| d.num_seconds()) else {
                    return ts;
                };
                // 1970-01-01 was a Thursday; shift so week buckets open on Monday.
                let offset = if self.unit == TimeFrameUnit::Week {
                    3 * 86_400
                } else {
                    0
                };
                let secs = ts.timestamp() + offset;
                let floored = secs.div_euclid(span) * span - offset;
                Utc.timestamp_opt(floored, 0).single().unwrap_or(ts)
            }
        }
    }
}

/// Display/parse for CLI and config ergonomics (`"5m"`, `"4h"`, `"1d"`, `"1w"`, `"1mo"`).
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = match self.unit {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Hour => "h",
            TimeFrameUnit::Day => "d",
            TimeFrameUnit::Week => "w",
            TimeFrameUnit::Month => "mo",
        };
        write!(f, "{}{}", self.amount, u)
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeFrameError::InvalidInput {
                message: format!("missing timeframe unit in {s:?}"),
            })?;
        let (digits, unit) = s.split_at(split);
        let amount: u32 = digits.parse().map_err(|_| TimeFrameError::InvalidInput {
            message: format!("invalid timeframe amount in {s:?}"),
        })?;

        let unit = match unit {
            "m" | "min" | "minute" => {
                // "60m" and "240m" are how hourly bars are spelled by some feeds.
                if amount > 0 && amount % 60 == 0 {
                    return TimeFrame::try_new(amount / 60, TimeFrameUnit::Hour);
                }
                TimeFrameUnit::Minute
            }
            "h" | "hr" | "hour" => TimeFrameUnit::Hour,
            "d" | "day" => TimeFrameUnit::Day,
            "w" | "wk" | "week" => TimeFrameUnit::Week,
            "mo" | "month" => TimeFrameUnit::Month,
            _ => {
                return Err(TimeFrameError::InvalidInput {
                    message: format!("Invalid timeframe unit: {unit}"),
                });
            }
        };
        TimeFrame::try_new(amount, unit)
    }
}

impl Serialize for TimeFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeFrame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
