//! Sample-query filtering.
//!
//! A sample query is evaluated against each frame independently; there is
//! no cross-frame join. The [`FilterEvaluator`] trait is the seam the
//! sampler calls through, and [`SqlFilterEvaluator`] is the default
//! implementation backed by sqlparser.

mod expr;
mod parser;

pub use expr::{BinaryOp, FilterExpr, LikePattern, UnaryOp};
pub use parser::parse_filter;

use crate::error::{SamplerError, SamplerResult};
use crate::frame::Frame;

/// Evaluates a user-supplied filter expression against a frame.
pub trait FilterEvaluator {
    /// Return the rows of `frame` matching `query`.
    ///
    /// Malformed or unevaluable queries fail with `FilterEvaluation`.
    fn filter(&self, frame: &Frame, query: &str) -> SamplerResult<Frame>;
}

/// Filters frames with SQL boolean expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFilterEvaluator;

impl FilterEvaluator for SqlFilterEvaluator {
    fn filter(&self, frame: &Frame, query: &str) -> SamplerResult<Frame> {
        let predicate =
            parse_filter(query).map_err(|message| SamplerError::filter(query, message))?;
        let mask = predicate
            .mask(frame)
            .map_err(|message| SamplerError::filter(query, message))?;
        Ok(frame.filter(&mask))
    }
}
