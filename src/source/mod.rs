//! Frame sources.
//!
//! A [`FrameSource`] owns whatever connection or client it needs and turns
//! an entity reference into the frames that make up that table. Fetches may
//! be slow and are never retried here; the sampler calls a source at most
//! once per instance.
//!
//! Any `Fn(&EntityRef, &SampleConfig) -> SamplerResult<FrameSet>` closure is
//! also a source, which keeps ad-hoc sources short:
//!
//! ```
//! use tablesample::frame::{Frame, FrameSet};
//! use tablesample::source::{EntityRef, FrameSource};
//! use tablesample::config::SampleConfig;
//! use tablesample::error::SamplerResult;
//!
//! let source = |_: &EntityRef, _: &SampleConfig| -> SamplerResult<FrameSet> {
//!     Ok(vec![Frame::default()])
//! };
//! let frames = source
//!     .fetch_frames(&EntityRef::table("orders"), &SampleConfig::default())
//!     .unwrap();
//! assert_eq!(frames.len(), 1);
//! ```

mod json;
mod memory;

pub use json::{flatten_record, JsonFileSource};
pub use memory::InMemorySource;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SampleConfig;
use crate::error::SamplerResult;
use crate::frame::FrameSet;

/// Reference to the table being sampled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub service: String,
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl EntityRef {
    pub fn new(
        service: impl Into<String>,
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// A bare table reference with no service, database, or schema.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Dotted name of the non-empty parts, e.g. `lake.raw.events.clicks`.
    pub fn fully_qualified_name(&self) -> String {
        [&self.service, &self.database, &self.schema, &self.table]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fully_qualified_name())
    }
}

/// Produces the frames of a table.
pub trait FrameSource {
    /// Fetch every frame of `entity`.
    ///
    /// The sample config is passed through for sources that can push
    /// sampling down; implementations are free to ignore it. Failures
    /// should be reported as `SourceUnavailable`.
    fn fetch_frames(&self, entity: &EntityRef, config: &SampleConfig) -> SamplerResult<FrameSet>;
}

impl<F> FrameSource for F
where
    F: Fn(&EntityRef, &SampleConfig) -> SamplerResult<FrameSet>,
{
    fn fetch_frames(&self, entity: &EntityRef, config: &SampleConfig) -> SamplerResult<FrameSet> {
        self(entity, config)
    }
}
