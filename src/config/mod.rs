//! Configuration module for tablesample.
//!
//! Handles per-table sampling configuration and TOML settings.

mod sample;
mod settings;

pub use sample::{
    IntervalUnit, PartitionDetails, PartitionIntervalType, ProfileSample, ProfileSampleType,
    SampleConfig,
};
pub use settings::{
    expand_env_vars, SamplerSettings, Settings, SettingsError, TableSettings,
    DEFAULT_SAMPLE_LIMIT,
};
