//! Partition predicates.
//!
//! A table's declared partitioning becomes a row filter applied to every
//! frame. Exactly one strategy applies, keyed by the interval type:
//!
//! | Interval type   | Keeps rows where the partition field...       |
//! |-----------------|-----------------------------------------------|
//! | `COLUMN-VALUE`  | is one of the configured values               |
//! | `INTEGER-RANGE` | lies in the closed range `[start, end]`       |
//! | `TIME-UNIT`     | is at or after `now - interval` (see below)   |
//!
//! The time threshold comes from a [`TimeWindow`], so tests can pin "now".
//! Missing partition values never match.

mod time_window;

pub use time_window::{threshold_from, FixedTimeWindow, SystemTimeWindow, TimeWindow};

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::config::{PartitionDetails, PartitionIntervalType};
use crate::error::SamplerResult;
use crate::frame::{Frame, Value};

/// A partition predicate resolved against a time window.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionPredicate {
    Values { column: String, values: Vec<Value> },
    IntegerRange { column: String, start: i64, end: i64 },
    Since { column: String, threshold: NaiveDateTime },
}

impl PartitionPredicate {
    /// Resolve partition details, computing the time threshold if needed.
    pub fn resolve(details: &PartitionDetails, window: &dyn TimeWindow) -> SamplerResult<Self> {
        let column = details.column.clone();
        Ok(match details.interval_type {
            PartitionIntervalType::ColumnValue => PartitionPredicate::Values {
                column,
                values: details.values.clone(),
            },
            PartitionIntervalType::IntegerRange => {
                let (start, end) = details.integer_bounds()?;
                PartitionPredicate::IntegerRange { column, start, end }
            }
            PartitionIntervalType::Time => {
                let (unit, interval) = details.time_bounds()?;
                PartitionPredicate::Since {
                    column,
                    threshold: window.threshold(unit, interval)?,
                }
            }
        })
    }

    pub fn column(&self) -> &str {
        match self {
            PartitionPredicate::Values { column, .. }
            | PartitionPredicate::IntegerRange { column, .. }
            | PartitionPredicate::Since { column, .. } => column,
        }
    }

    /// Whether a partition field value satisfies the predicate.
    pub fn matches(&self, value: &Value) -> bool {
        if value.is_missing() {
            return false;
        }
        match self {
            PartitionPredicate::Values { values, .. } => {
                values.iter().any(|allowed| value.loose_eq(allowed))
            }
            PartitionPredicate::IntegerRange { start, end, .. } => {
                let above = value.compare(&Value::Int(*start));
                let below = value.compare(&Value::Int(*end));
                matches!(above, Some(Ordering::Greater | Ordering::Equal))
                    && matches!(below, Some(Ordering::Less | Ordering::Equal))
            }
            PartitionPredicate::Since { threshold, .. } => value
                .as_datetime()
                .is_some_and(|ts| ts >= *threshold),
        }
    }

    /// Keep the rows of `frame` that satisfy the predicate.
    ///
    /// Frames with no rows pass through unchanged, even if they lack the column.
    pub fn apply(&self, frame: &Frame) -> SamplerResult<Frame> {
        if frame.is_empty() {
            return Ok(frame.clone());
        }
        let column = frame.require_column(self.column())?;
        let mask: Vec<bool> = column.values.iter().map(|v| self.matches(v)).collect();
        Ok(frame.filter(&mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntervalUnit;
    use crate::error::SamplerError;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_integer_range_is_closed() {
        let predicate = PartitionPredicate::resolve(
            &PartitionDetails::integer_range("id", 2, 4),
            &FixedTimeWindow(now()),
        )
        .unwrap();
        let hits: Vec<bool> = [1, 2, 3, 4, 5]
            .into_iter()
            .map(|i| predicate.matches(&Value::Int(i)))
            .collect();
        assert_eq!(hits, vec![false, true, true, true, false]);
        assert!(predicate.matches(&Value::Float(3.5)));
        assert!(!predicate.matches(&Value::from("3")));
    }

    #[test]
    fn test_time_window_matches_dates_and_strings() {
        let predicate = PartitionPredicate::resolve(
            &PartitionDetails::time_window("ts", IntervalUnit::Day, 1),
            &FixedTimeWindow(now()),
        )
        .unwrap();
        assert!(predicate.matches(&Value::from("2024-06-14")));
        assert!(predicate.matches(&Value::Date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())));
        assert!(!predicate.matches(&Value::from("2024-06-13 23:59:59")));
        assert!(!predicate.matches(&Value::from("yesterday")));
        assert!(!predicate.matches(&Value::Null));
    }

    #[test]
    fn test_missing_column() {
        let predicate = PartitionPredicate::Values {
            column: "region".into(),
            values: vec!["emea".into()],
        };
        let frame = Frame::from_rows(["id"], vec![vec![1.into()]]).unwrap();
        assert_eq!(
            predicate.apply(&frame).unwrap_err(),
            SamplerError::ColumnNotFound("region".into())
        );
        assert!(predicate.apply(&Frame::default()).unwrap().is_empty());
    }

    #[test]
    fn test_incomplete_time_partition() {
        let mut details = PartitionDetails::time_window("ts", IntervalUnit::Day, 1);
        details.interval_unit = None;
        let err = PartitionPredicate::resolve(&details, &SystemTimeWindow).unwrap_err();
        assert!(err.is_configuration());
    }
}
