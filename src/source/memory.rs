//! Frames already held in memory.

use std::collections::HashMap;

use tracing::debug;

use super::{EntityRef, FrameSource};
use crate::config::SampleConfig;
use crate::error::{SamplerError, SamplerResult};
use crate::frame::FrameSet;

/// Serves frames registered by fully qualified table name.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: HashMap<String, FrameSet>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the frames of one table.
    pub fn with_table(mut self, entity: &EntityRef, frames: FrameSet) -> Self {
        self.insert(entity, frames);
        self
    }

    pub fn insert(&mut self, entity: &EntityRef, frames: FrameSet) {
        self.tables.insert(entity.fully_qualified_name(), frames);
    }
}

impl FrameSource for InMemorySource {
    fn fetch_frames(&self, entity: &EntityRef, _config: &SampleConfig) -> SamplerResult<FrameSet> {
        let fqn = entity.fully_qualified_name();
        let frames = self
            .tables
            .get(&fqn)
            .cloned()
            .ok_or_else(|| SamplerError::source_unavailable(&fqn, "table is not registered"))?;
        debug!(entity = %fqn, frames = frames.len(), "serving in-memory frames");
        Ok(frames)
    }
}
