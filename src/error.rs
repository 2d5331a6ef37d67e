//! Sampler error types.

use thiserror::Error;

/// Result type for sampler operations.
pub type SamplerResult<T> = Result<T, SamplerError>;

/// Errors that can occur while fetching, filtering, or sampling frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// The backing source could not produce frames.
    #[error("source unavailable for '{entity}': {reason}")]
    SourceUnavailable {
        /// Fully qualified name of the entity being fetched.
        entity: String,
        /// Why the fetch failed.
        reason: String,
    },

    /// A user-supplied sample query could not be parsed or evaluated.
    #[error("failed to evaluate sample query '{query}': {message}")]
    FilterEvaluation {
        /// The query as written by the user.
        query: String,
        /// Parser or evaluator message.
        message: String,
    },

    /// Invalid sampling configuration.
    #[error("invalid sample configuration: {0}")]
    Configuration(String),

    /// A requested column does not exist in the frame.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Columns (or rows) of a frame have different lengths.
    #[error("'{column}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        /// Column name, or `row N` when building from rows.
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl SamplerError {
    /// Create a source error for an entity.
    pub fn source_unavailable(entity: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            entity: entity.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a filter error for a query.
    pub fn filter(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FilterEvaluation {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a recoverable configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
