//! Threshold timestamps for time-based partitions.

use chrono::{Months, NaiveDateTime, TimeDelta, Timelike, Utc};

use crate::config::IntervalUnit;
use crate::error::{SamplerError, SamplerResult};

/// Computes the oldest timestamp a time partition keeps.
pub trait TimeWindow {
    fn threshold(&self, unit: IntervalUnit, interval: i64) -> SamplerResult<NaiveDateTime>;
}

/// Measures windows back from the current UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeWindow;

impl TimeWindow for SystemTimeWindow {
    fn threshold(&self, unit: IntervalUnit, interval: i64) -> SamplerResult<NaiveDateTime> {
        threshold_from(Utc::now().naive_utc(), unit, interval)
    }
}

/// Measures windows back from a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeWindow(pub NaiveDateTime);

impl TimeWindow for FixedTimeWindow {
    fn threshold(&self, unit: IntervalUnit, interval: i64) -> SamplerResult<NaiveDateTime> {
        threshold_from(self.0, unit, interval)
    }
}

/// `now` minus `interval` units, truncated to the start of the hour for
/// hourly windows and to midnight otherwise.
pub fn threshold_from(
    now: NaiveDateTime,
    unit: IntervalUnit,
    interval: i64,
) -> SamplerResult<NaiveDateTime> {
    let overflow = || {
        SamplerError::Configuration(format!(
            "partition interval {} {:?} is out of range",
            interval, unit
        ))
    };

    let shifted = match unit {
        IntervalUnit::Hour => TimeDelta::try_hours(interval).and_then(|d| now.checked_sub_signed(d)),
        IntervalUnit::Day => TimeDelta::try_days(interval).and_then(|d| now.checked_sub_signed(d)),
        IntervalUnit::Month => months(interval, 1).and_then(|m| now.checked_sub_months(m)),
        IntervalUnit::Year => months(interval, 12).and_then(|m| now.checked_sub_months(m)),
    }
    .ok_or_else(overflow)?;

    let truncated = match unit {
        IntervalUnit::Hour => shifted.date().and_hms_opt(shifted.hour(), 0, 0),
        _ => shifted.date().and_hms_opt(0, 0, 0),
    };
    truncated.ok_or_else(overflow)
}

fn months(interval: i64, per_unit: i64) -> Option<Months> {
    let total = interval.checked_mul(per_unit)?;
    u32::try_from(total).ok().map(Months::new)
}
