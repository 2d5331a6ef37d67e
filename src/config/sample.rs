//! Per-table sampling configuration.
//!
//! Field names are snake_case in TOML. The camelCase names used by the
//! metadata platform's table profiler config are accepted as aliases, so a
//! profiler config exported as JSON deserializes directly:
//!
//! ```json
//! {
//!   "profileSampleType": "PERCENTAGE",
//!   "profileSample": 50,
//!   "partitioning": {
//!     "partitionColumnName": "region",
//!     "partitionIntervalType": "COLUMN-VALUE",
//!     "partitionValues": ["emea", "apac"]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SamplerError, SamplerResult};
use crate::frame::Value;

/// How `profile_sample` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ProfileSampleType {
    /// Percentage of each frame, in (0, 100].
    #[default]
    #[serde(rename = "PERCENTAGE", alias = "percentage")]
    Percentage,
    /// Absolute row count spread evenly across frames.
    #[serde(rename = "ROW_COUNT", alias = "ROWS", alias = "row_count")]
    RowCount,
}

/// The raw `profile_sample` setting.
///
/// Anything that is not a number is kept verbatim so that the sampler can
/// report a configuration error and fall back to its documented default
/// instead of failing to load the config.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProfileSample {
    Number(f64),
    Other(serde_json::Value),
}

impl ProfileSample {
    /// Whether the setting asks for sampling at all. Zero and empty values do not.
    pub fn is_set(&self) -> bool {
        match self {
            ProfileSample::Number(n) => *n != 0.0,
            ProfileSample::Other(value) => match value {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) => n.as_f64() != Some(0.0),
                serde_json::Value::String(s) => !s.is_empty(),
                serde_json::Value::Array(items) => !items.is_empty(),
                serde_json::Value::Object(entries) => !entries.is_empty(),
            },
        }
    }
}

impl From<f64> for ProfileSample {
    fn from(n: f64) -> Self {
        ProfileSample::Number(n)
    }
}

/// Sampling settings for one table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SampleConfig {
    #[serde(alias = "profileSampleType")]
    pub profile_sample_type: ProfileSampleType,

    #[serde(alias = "profileSample")]
    pub profile_sample: Option<ProfileSample>,

    /// Filter expression evaluated against every frame.
    #[serde(alias = "sampleQuery", alias = "profileQuery")]
    pub sample_query: Option<String>,

    #[serde(alias = "partitioning", alias = "partitionDetails")]
    pub partition_details: Option<PartitionDetails>,
}

impl SampleConfig {
    /// Sample a percentage of every frame.
    pub fn percentage(percent: f64) -> Self {
        Self {
            profile_sample_type: ProfileSampleType::Percentage,
            profile_sample: Some(ProfileSample::Number(percent)),
            ..Default::default()
        }
    }

    /// Sample a fixed number of rows across all frames.
    pub fn row_count(rows: u64) -> Self {
        Self {
            profile_sample_type: ProfileSampleType::RowCount,
            profile_sample: Some(ProfileSample::Number(rows as f64)),
            ..Default::default()
        }
    }

    pub fn with_sample_query(mut self, query: impl Into<String>) -> Self {
        self.sample_query = Some(query.into());
        self
    }

    pub fn with_partition(mut self, partition: PartitionDetails) -> Self {
        self.partition_details = Some(partition);
        self
    }

    /// The sample query, if one is configured and non-blank.
    pub fn query(&self) -> Option<&str> {
        self.sample_query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
    }

    /// Enabled partition details, if any.
    pub fn partition(&self) -> Option<&PartitionDetails> {
        self.partition_details.as_ref().filter(|p| p.enabled)
    }

    /// Whether statistical sampling was requested.
    pub fn is_sampled(&self) -> bool {
        self.profile_sample.as_ref().is_some_and(ProfileSample::is_set)
    }

    /// Fraction of each frame to draw in percentage mode.
    ///
    /// Fails with a configuration error when the value is not a number in (0, 100].
    pub fn percentage_fraction(&self) -> SamplerResult<f64> {
        match &self.profile_sample {
            Some(ProfileSample::Number(n)) if *n > 0.0 && *n <= 100.0 => Ok(n / 100.0),
            other => Err(SamplerError::Configuration(format!(
                "profile_sample must be a percentage in (0, 100], got {}",
                describe(other.as_ref())
            ))),
        }
    }

    /// Total rows to draw in row-count mode.
    pub fn row_quota(&self) -> SamplerResult<usize> {
        match &self.profile_sample {
            Some(ProfileSample::Number(n)) if n.is_finite() && *n >= 0.0 => {
                Ok(n.floor() as usize)
            }
            other => Err(SamplerError::Configuration(format!(
                "profile_sample must be a non-negative row count, got {}",
                describe(other.as_ref())
            ))),
        }
    }
}

fn describe(sample: Option<&ProfileSample>) -> String {
    match sample {
        None => "nothing".to_string(),
        Some(ProfileSample::Number(n)) => n.to_string(),
        Some(ProfileSample::Other(value)) => value.to_string(),
    }
}

/// Which partition predicate to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum PartitionIntervalType {
    #[serde(rename = "COLUMN-VALUE", alias = "COLUMN_VALUE")]
    ColumnValue,
    #[serde(rename = "INTEGER-RANGE", alias = "INTEGER_RANGE")]
    IntegerRange,
    #[serde(
        rename = "TIME-UNIT",
        alias = "TIME_UNIT",
        alias = "TIME",
        alias = "INGESTION-TIME"
    )]
    Time,
}

/// Unit of a time-based partition window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntervalUnit {
    #[serde(alias = "HOURS")]
    Hour,
    #[serde(alias = "DAYS")]
    Day,
    #[serde(alias = "MONTHS")]
    Month,
    #[serde(alias = "YEARS")]
    Year,
}

/// Partition predicate declared for a table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PartitionDetails {
    #[serde(default = "default_enabled", alias = "enablePartitioning")]
    pub enabled: bool,

    /// Field the predicate applies to.
    #[serde(alias = "partitionColumnName")]
    pub column: String,

    #[serde(alias = "partitionIntervalType")]
    pub interval_type: PartitionIntervalType,

    /// Magnitude of a time window.
    #[serde(default, alias = "partitionInterval")]
    pub interval: Option<i64>,

    #[serde(default, alias = "partitionIntervalUnit")]
    pub interval_unit: Option<IntervalUnit>,

    /// Allow-set for column-value partitions.
    #[serde(default, alias = "partitionValues")]
    pub values: Vec<Value>,

    #[serde(default, alias = "partitionIntegerRangeStart")]
    pub integer_range_start: Option<i64>,

    #[serde(default, alias = "partitionIntegerRangeEnd")]
    pub integer_range_end: Option<i64>,
}

fn default_enabled() -> bool {
    true
}

impl PartitionDetails {
    fn new(column: impl Into<String>, interval_type: PartitionIntervalType) -> Self {
        Self {
            enabled: true,
            column: column.into(),
            interval_type,
            interval: None,
            interval_unit: None,
            values: Vec::new(),
            integer_range_start: None,
            integer_range_end: None,
        }
    }

    /// Keep rows whose `column` value is one of `values`.
    pub fn column_values<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Self::new(column, PartitionIntervalType::ColumnValue)
        }
    }

    /// Keep rows whose `column` value lies in `[start, end]`.
    pub fn integer_range(column: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            integer_range_start: Some(start),
            integer_range_end: Some(end),
            ..Self::new(column, PartitionIntervalType::IntegerRange)
        }
    }

    /// Keep rows whose `column` value falls within the last `interval` units.
    pub fn time_window(column: impl Into<String>, unit: IntervalUnit, interval: i64) -> Self {
        Self {
            interval: Some(interval),
            interval_unit: Some(unit),
            ..Self::new(column, PartitionIntervalType::Time)
        }
    }

    /// Closed integer bounds for range partitions.
    pub fn integer_bounds(&self) -> SamplerResult<(i64, i64)> {
        match (self.integer_range_start, self.integer_range_end) {
            (Some(start), Some(end)) if start <= end => Ok((start, end)),
            (Some(start), Some(end)) => Err(SamplerError::Configuration(format!(
                "integer range start {} is greater than end {} for partition '{}'",
                start, end, self.column
            ))),
            _ => Err(SamplerError::Configuration(format!(
                "integer range partition '{}' needs both a start and an end",
                self.column
            ))),
        }
    }

    /// Unit and magnitude for time partitions.
    pub fn time_bounds(&self) -> SamplerResult<(IntervalUnit, i64)> {
        match (self.interval_unit, self.interval) {
            (Some(unit), Some(interval)) if interval >= 0 => Ok((unit, interval)),
            _ => Err(SamplerError::Configuration(format!(
                "time partition '{}' needs an interval unit and a non-negative interval",
                self.column
            ))),
        }
    }
}
