//! Time axis described by a `(start, end, interval)` triple.
//!
//! Timestamps are epoch seconds already shifted into the forecast timezone,
//! so flooring to a day boundary lands on local midnight.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Resolution at which forecast variables are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    /// Nominal step between two samples.
    pub fn interval_seconds(self) -> i64 {
        match self {
            Self::Hourly => SECONDS_PER_HOUR,
            Self::Daily => SECONDS_PER_DAY,
        }
    }

    /// Field name in the forecast request and response.
    pub fn key(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }

    /// Axis label format.
    pub fn label_format(self) -> &'static str {
        match self {
            Self::Hourly => "%d.%m. %H:%M",
            Self::Daily => "%a %d.%m.",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AxisError {
    #[error("interval must be positive, got {0}s")]
    NonPositiveInterval(i64),
    #[error("axis ends ({end}) before it starts ({start})")]
    EndBeforeStart { start: i64, end: i64 },
}

/// Half-open range of timestamps `start, start + interval, ... < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeAxis {
    pub start: i64,
    pub end: i64,
    pub interval_seconds: i64,
}

impl TimeAxis {
    pub fn new(start: i64, end: i64, interval_seconds: i64) -> Result<Self, AxisError> {
        if interval_seconds <= 0 {
            return Err(AxisError::NonPositiveInterval(interval_seconds));
        }
        if end < start {
            return Err(AxisError::EndBeforeStart { start, end });
        }
        Ok(Self {
            start,
            end,
            interval_seconds,
        })
    }

    /// Number of timestamps: `ceil((end - start) / interval)`.
    pub fn len(&self) -> usize {
        let span = self.end - self.start;
        ((span + self.interval_seconds - 1) / self.interval_seconds) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn timestamps(&self) -> Vec<i64> {
        (0..self.len() as i64)
            .map(|i| self.start + i * self.interval_seconds)
            .collect()
    }

    /// Start, end and interval floored to whole days.
    pub fn floored_to_day(&self) -> Result<Self, AxisError> {
        Self::new(
            floor_to_day(self.start),
            floor_to_day(self.end),
            floor_to_day(self.interval_seconds),
        )
    }

    /// The axis a table of this granularity is built on: daily tables are
    /// floored to day boundaries, hourly tables keep full precision.
    pub fn for_granularity(&self, granularity: Granularity) -> Result<Self, AxisError> {
        match granularity {
            Granularity::Hourly => Ok(*self),
            Granularity::Daily => self.floored_to_day(),
        }
    }
}

/// Drop the sub-day part of an epoch-seconds value.
pub fn floor_to_day(ts: i64) -> i64 {
    ts.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// Wall-clock time of a (timezone-shifted) timestamp.
pub fn to_datetime(ts: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc())
}

pub fn format_timestamp(ts: i64, granularity: Granularity) -> String {
    to_datetime(ts)
        .map(|dt| dt.format(granularity.label_format()).to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-05-13T00:00:00Z
    const MIDNIGHT: i64 = 1_715_558_400;

    #[test]
    fn full_day_of_hours() {
        let axis = TimeAxis::new(MIDNIGHT, MIDNIGHT + SECONDS_PER_DAY, SECONDS_PER_HOUR).unwrap();
        let ts = axis.timestamps();
        assert_eq!(ts.len(), 24);
        assert_eq!(axis.len(), 24);

        let labels: Vec<String> = ts
            .iter()
            .map(|t| to_datetime(*t).unwrap().format("%H:%M").to_string())
            .collect();
        assert_eq!(labels.first().unwrap(), "00:00");
        assert_eq!(labels.last().unwrap(), "23:00");
        assert!(!ts.contains(&(MIDNIGHT + SECONDS_PER_DAY)));
    }

    #[test]
    fn len_rounds_partial_steps_up() {
        let axis = TimeAxis::new(0, 7_201, SECONDS_PER_HOUR).unwrap();
        assert_eq!(axis.len(), 3);
        assert_eq!(axis.timestamps(), vec![0, 3_600, 7_200]);
    }

    #[test]
    fn empty_axis() {
        let axis = TimeAxis::new(MIDNIGHT, MIDNIGHT, 60).unwrap();
        assert!(axis.is_empty());
        assert!(axis.timestamps().is_empty());
    }

    #[test]
    fn rejects_bad_descriptors() {
        assert_eq!(
            TimeAxis::new(0, 10, 0),
            Err(AxisError::NonPositiveInterval(0))
        );
        assert_eq!(
            TimeAxis::new(10, 0, 1),
            Err(AxisError::EndBeforeStart { start: 10, end: 0 })
        );
    }

    #[test]
    fn daily_floor_drops_sub_day_offsets() {
        // Local midnights reported one hour off around a DST change
        let start = MIDNIGHT + SECONDS_PER_HOUR;
        let end = MIDNIGHT + 7 * SECONDS_PER_DAY;
        let axis = TimeAxis::new(start, end, SECONDS_PER_DAY).unwrap();

        let floored = axis.for_granularity(Granularity::Daily).unwrap();
        assert_eq!(floored.start, MIDNIGHT);
        assert_eq!(floored.len(), 7);
        assert!(floored.timestamps().iter().all(|t| t % SECONDS_PER_DAY == 0));

        assert_eq!(axis.for_granularity(Granularity::Hourly).unwrap(), axis);
    }

    #[test]
    fn floor_is_idempotent() {
        for ts in [0, 1, MIDNIGHT, MIDNIGHT + 12_345, -1, -SECONDS_PER_DAY - 5] {
            let once = floor_to_day(ts);
            assert_eq!(floor_to_day(once), once);
            assert!(once <= ts);
        }
        assert_eq!(floor_to_day(-1), -SECONDS_PER_DAY);
    }

    #[test]
    fn flooring_sub_day_interval_fails() {
        let axis = TimeAxis::new(0, SECONDS_PER_DAY, SECONDS_PER_HOUR).unwrap();
        assert_eq!(
            axis.floored_to_day(),
            Err(AxisError::NonPositiveInterval(0))
        );
    }

    #[test]
    fn labels() {
        assert_eq!(
            format_timestamp(MIDNIGHT + 13 * SECONDS_PER_HOUR, Granularity::Hourly),
            "13.05. 13:00"
        );
        assert_eq!(format_timestamp(MIDNIGHT, Granularity::Daily), "Mon 13.05.");
    }
}
