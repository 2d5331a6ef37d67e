//! # tablesample
//!
//! Partition-aware row sampling over in-memory tabular frames, for data
//! profiling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              FrameSource (memory, JSON files)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [fetch once, cache]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  FrameSet (Vec<Frame>)                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sample query | partition | random sample]
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Sampler                            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [materialize, describe]
//! ┌─────────────────────────────────────────────────────────┐
//! │          TableData + ColumnDescriptor list               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tablesample::prelude::*;
//!
//! let entity = EntityRef::table("orders");
//! let frame = Frame::from_rows(
//!     ["id", "status"],
//!     vec![
//!         vec![Value::Int(1), Value::from("open")],
//!         vec![Value::Int(2), Value::from("closed")],
//!     ],
//! )
//! .unwrap();
//! let source = InMemorySource::new().with_table(&entity, vec![frame]);
//!
//! let config = SampleConfig::default().with_sample_query("status = 'open'");
//! let mut sampler = Sampler::builder(source, entity, config)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let data = sampler.fetch_sample_data(None).unwrap();
//! assert_eq!(data.rows, vec![vec![Value::Int(1), Value::from("open")]]);
//! ```

pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod frame;
pub mod partition;
pub mod sampler;
pub mod service_spec;
pub mod source;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::columns::{
        ColumnDescriptor, ColumnTypeInferencer, DataType, ValueTypeInferencer,
    };
    pub use crate::config::{
        IntervalUnit, PartitionDetails, PartitionIntervalType, ProfileSample, ProfileSampleType,
        SampleConfig, Settings,
    };
    pub use crate::error::{SamplerError, SamplerResult};
    pub use crate::filter::{FilterEvaluator, SqlFilterEvaluator};
    pub use crate::frame::{Column, Frame, FrameSet, Value};
    pub use crate::partition::{FixedTimeWindow, SystemTimeWindow, TimeWindow};
    pub use crate::sampler::{Sampler, SamplerBuilder, TableData};
    pub use crate::source::{EntityRef, FrameSource, InMemorySource, JsonFileSource};
}
