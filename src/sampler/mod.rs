//! The frame sampler.
//!
//! A [`Sampler`] is built for one table. On construction it fetches the
//! table's frames once and describes the columns of the first frame.
//! After that, callers ask it for sample rows
//! ([`Sampler::fetch_sample_data`]), for the statistical sample used to
//! compute metrics ([`Sampler::select_sample`]), or for column descriptors
//! ([`Sampler::describe_columns`]).
//!
//! # Selection order
//!
//! ```text
//! sample_query set?      -> filter every frame, done
//! partition set?         -> filter every frame, cache the result
//! unsampled / force_full -> cached frames as-is
//! otherwise              -> statistical sample of the cached frames
//! ```

pub mod statistical;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::{exposed_name, ColumnDescriptor, ColumnTypeInferencer, ValueTypeInferencer};
use crate::config::{PartitionDetails, ProfileSampleType, SampleConfig, DEFAULT_SAMPLE_LIMIT};
use crate::error::{SamplerError, SamplerResult};
use crate::filter::{FilterEvaluator, SqlFilterEvaluator};
use crate::frame::{total_rows, Frame, FrameSet, Value};
use crate::partition::{PartitionPredicate, SystemTimeWindow, TimeWindow};
use crate::source::{EntityRef, FrameSource};

/// Sample rows as handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Column names, in output order.
    pub columns: Vec<String>,
    /// One tuple per row, one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl TableData {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builder for [`Sampler`].
///
/// Only the source, entity, and sample config are required. Everything else
/// falls back to the default implementation.
pub struct SamplerBuilder<R = StdRng> {
    source: Box<dyn FrameSource>,
    entity: EntityRef,
    config: SampleConfig,
    sample_limit: usize,
    filter: Box<dyn FilterEvaluator>,
    time_window: Box<dyn TimeWindow>,
    inferencer: Box<dyn ColumnTypeInferencer>,
    rng: R,
}

impl SamplerBuilder<StdRng> {
    pub fn new(
        source: impl FrameSource + 'static,
        entity: EntityRef,
        config: SampleConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            entity,
            config,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            filter: Box::new(SqlFilterEvaluator),
            time_window: Box::new(SystemTimeWindow),
            inferencer: Box::new(ValueTypeInferencer),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed the default generator for reproducible samples.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl<R: Rng> SamplerBuilder<R> {
    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    pub fn filter_evaluator(mut self, filter: impl FilterEvaluator + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn time_window(mut self, window: impl TimeWindow + 'static) -> Self {
        self.time_window = Box::new(window);
        self
    }

    pub fn column_inferencer(mut self, inferencer: impl ColumnTypeInferencer + 'static) -> Self {
        self.inferencer = Box::new(inferencer);
        self
    }

    /// Swap in a different random source.
    pub fn rng<R2: Rng>(self, rng: R2) -> SamplerBuilder<R2> {
        SamplerBuilder {
            source: self.source,
            entity: self.entity,
            config: self.config,
            sample_limit: self.sample_limit,
            filter: self.filter,
            time_window: self.time_window,
            inferencer: self.inferencer,
            rng,
        }
    }

    /// Fetch the table and describe its columns.
    ///
    /// Fails if the source cannot produce frames, the sample query cannot
    /// be evaluated, or the partition details are incomplete.
    pub fn build(self) -> SamplerResult<Sampler<R>> {
        let mut sampler = Sampler {
            source: self.source,
            entity: self.entity,
            config: self.config,
            sample_limit: self.sample_limit,
            filter: self.filter,
            time_window: self.time_window,
            inferencer: self.inferencer,
            rng: self.rng,
            frames: None,
            columns: Vec::new(),
        };
        if let Some(first) = sampler.select_sample(true)?.first() {
            sampler.columns = sampler.compute_columns(first)?;
        }
        Ok(sampler)
    }
}

/// Selects sample rows from the frames of one table.
pub struct Sampler<R = StdRng> {
    source: Box<dyn FrameSource>,
    entity: EntityRef,
    config: SampleConfig,
    sample_limit: usize,
    filter: Box<dyn FilterEvaluator>,
    time_window: Box<dyn TimeWindow>,
    inferencer: Box<dyn ColumnTypeInferencer>,
    rng: R,
    frames: Option<FrameSet>,
    columns: Vec<ColumnDescriptor>,
}

impl Sampler<StdRng> {
    pub fn builder(
        source: impl FrameSource + 'static,
        entity: EntityRef,
        config: SampleConfig,
    ) -> SamplerBuilder<StdRng> {
        SamplerBuilder::new(source, entity, config)
    }
}

impl<R: Rng> Sampler<R> {
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    pub fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    /// The cached frames of the table, fetching them on first use.
    ///
    /// Once a partition has been applied these are the partitioned frames.
    pub fn fetch_frames(&mut self) -> SamplerResult<&FrameSet> {
        Ok(self.ensure_frames()?)
    }

    /// Frames to compute metrics over.
    ///
    /// With `force_full` the statistical step is skipped; the sample query
    /// and partition still apply.
    pub fn select_sample(&mut self, force_full: bool) -> SamplerResult<FrameSet> {
        if let Some(query) = self.config.query().map(str::to_string) {
            return self.query_frames(&query);
        }

        if let Some(details) = self.config.partition().cloned() {
            self.apply_partition(&details)?;
        }

        if force_full || !self.config.is_sampled() {
            return Ok(self.ensure_frames()?.clone());
        }

        self.statistical_sample()
    }

    /// Keep the rows of one frame that fall in the configured partition.
    ///
    /// Without partition details the frame is returned unchanged.
    pub fn partition_filter(&self, frame: &Frame) -> SamplerResult<Frame> {
        match self.config.partition() {
            Some(details) => {
                PartitionPredicate::resolve(details, self.time_window.as_ref())?.apply(frame)
            }
            None => Ok(frame.clone()),
        }
    }

    /// Randomly sample the cached frames per the sample config.
    ///
    /// The cached frame order is shuffled in place first. Bad sample
    /// values never fail here: an unusable percentage samples 100%, an
    /// unusable row count returns the whole table.
    pub fn statistical_sample(&mut self) -> SamplerResult<FrameSet> {
        let mut frames = std::mem::take(self.ensure_frames()?);
        frames.shuffle(&mut self.rng);

        let sampled = match self.config.profile_sample_type {
            ProfileSampleType::Percentage => {
                let fraction = self.config.percentage_fraction().unwrap_or_else(|err| {
                    debug!(entity = %self.entity, %err, "sampling 100% of rows");
                    1.0
                });
                statistical::sample_percentage(&frames, fraction, &mut self.rng)
            }
            ProfileSampleType::RowCount => match self.config.row_quota() {
                Ok(rows) => statistical::sample_row_count(&frames, rows, &mut self.rng),
                Err(err) => {
                    debug!(entity = %self.entity, %err, "returning the full table");
                    frames.clone()
                }
            },
        };

        debug!(
            entity = %self.entity,
            sample_type = ?self.config.profile_sample_type,
            frames = frames.len(),
            rows = total_rows(&sampled),
            "statistical sample taken"
        );
        self.frames = Some(frames);
        Ok(sampled)
    }

    /// Flatten frames into at most `sample_limit` rows without missing values.
    ///
    /// Columns come from `columns` when given, otherwise from the first
    /// frame. A descriptor reads its `source` column; without one, a
    /// normalized complex name (`city`) reads the single flattened column
    /// it came from (`addr_##city`).
    pub fn materialize(
        &self,
        frames: &[Frame],
        columns: Option<&[ColumnDescriptor]>,
    ) -> SamplerResult<TableData> {
        let descriptors = columns.filter(|columns| !columns.is_empty());
        let names: Vec<String> = match descriptors {
            Some(columns) => columns.iter().map(|c| c.name.clone()).collect(),
            None => match frames.first() {
                Some(frame) => frame.column_names(),
                None => return Ok(TableData::default()),
            },
        };

        let mut rows = Vec::new();
        for frame in frames {
            if rows.len() >= self.sample_limit {
                break;
            }
            if frame.is_empty() {
                continue;
            }
            let remaining = self.sample_limit - rows.len();
            let sources = match descriptors {
                Some(columns) => columns
                    .iter()
                    .map(|c| resolve_column(frame, c))
                    .collect::<SamplerResult<Vec<_>>>()?,
                None => names.clone(),
            };
            let selected = frame.select(&sources)?.drop_missing();
            rows.extend(selected.rows().take(remaining));
        }

        Ok(TableData {
            columns: names,
            rows,
        })
    }

    /// Sample rows for display.
    ///
    /// With a sample query these are the query-filtered frames. Otherwise
    /// they are the cached frames, partitioned if a partition applies, not
    /// the statistical sample.
    pub fn fetch_sample_data(
        &mut self,
        columns: Option<&[ColumnDescriptor]>,
    ) -> SamplerResult<TableData> {
        if let Some(query) = self.config.query().map(str::to_string) {
            let frames = self.query_frames(&query)?;
            return self.materialize(&frames, columns);
        }
        self.ensure_frames()?;
        self.materialize(self.cached(), columns)
    }

    /// Columns of the table, described from the first frame at build time.
    pub fn describe_columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Each column is inferred on its own copy under the exposed name, so
    /// complex columns sharing a leaf (`a_##city`, `b_##city`) stay apart.
    fn compute_columns(&self, first: &Frame) -> SamplerResult<Vec<ColumnDescriptor>> {
        let mut descriptors = Vec::with_capacity(first.num_columns());
        for name in first.column_names() {
            let exposed = exposed_name(&name);
            let single = first
                .select(std::slice::from_ref(&name))?
                .renamed(&name, &exposed);
            let data_type = self.inferencer.infer(&single, &exposed);
            let descriptor = ColumnDescriptor::new(exposed.clone(), data_type);
            descriptors.push(if exposed == name {
                descriptor
            } else {
                descriptor.with_source(name)
            });
        }
        Ok(descriptors)
    }

    fn ensure_frames(&mut self) -> SamplerResult<&mut FrameSet> {
        let frames = match self.frames.take() {
            Some(frames) => frames,
            None => {
                let frames = self.source.fetch_frames(&self.entity, &self.config)?;
                debug!(
                    entity = %self.entity,
                    frames = frames.len(),
                    rows = total_rows(&frames),
                    "fetched frames"
                );
                frames
            }
        };
        Ok(self.frames.insert(frames))
    }

    fn cached(&self) -> &[Frame] {
        self.frames.as_deref().unwrap_or(&[])
    }

    fn query_frames(&mut self, query: &str) -> SamplerResult<FrameSet> {
        self.ensure_frames()?;
        let frames = self
            .cached()
            .iter()
            .map(|frame| self.filter.filter(frame, query))
            .collect::<SamplerResult<FrameSet>>()?;
        debug!(entity = %self.entity, query, rows = total_rows(&frames), "applied sample query");
        Ok(frames)
    }

    fn apply_partition(&mut self, details: &PartitionDetails) -> SamplerResult<()> {
        let predicate = PartitionPredicate::resolve(details, self.time_window.as_ref())?;
        self.ensure_frames()?;
        let frames = self
            .cached()
            .iter()
            .map(|frame| predicate.apply(frame))
            .collect::<SamplerResult<FrameSet>>()?;
        debug!(
            entity = %self.entity,
            column = predicate.column(),
            rows = total_rows(&frames),
            "applied partition"
        );
        self.frames = Some(frames);
        Ok(())
    }
}

/// Frame column a descriptor reads from.
///
/// The descriptor's source column wins. Otherwise the one column whose
/// exposed name matches; several matches are a configuration error.
fn resolve_column(frame: &Frame, descriptor: &ColumnDescriptor) -> SamplerResult<String> {
    let source = descriptor.source_column();
    if frame.has_column(source) {
        return Ok(source.to_string());
    }

    let candidates: Vec<&str> = frame
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| exposed_name(name) == descriptor.name)
        .collect();
    match candidates.as_slice() {
        [single] => Ok(single.to_string()),
        [] => Err(SamplerError::ColumnNotFound(source.to_string())),
        many => Err(SamplerError::Configuration(format!(
            "column name '{}' is ambiguous: {}",
            descriptor.name,
            many.join(", ")
        ))),
    }
}
