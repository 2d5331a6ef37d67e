//! Column descriptors and type inference.
//!
//! Nested source fields are flattened into "complex" columns whose names
//! join the field path with [`COMPLEX_COLUMN_SEPARATOR`]. Before a column
//! is exposed to the profiler its name is normalized: the root segment is
//! dropped and the remaining path is joined with `.`, so `addr_##city`
//! becomes `city` and `addr_##geo_##lat` becomes `geo.lat`.

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, Value};

/// Separator between path segments of a flattened nested field.
pub const COMPLEX_COLUMN_SEPARATOR: &str = "_##";

/// Semantic type of a column, as consumed by metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Int,
    Float,
    Boolean,
    Date,
    Datetime,
    String,
    Json,
    Array,
}

/// A column exposed to the profiler.
///
/// `source` is the frame column the descriptor was read from, when that
/// differs from the exposed name (`addr_##city` behind `city`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Name of the frame column holding this column's values.
    pub fn source_column(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

/// Whether a column name is a flattened nested field.
pub fn is_complex(name: &str) -> bool {
    name.contains(COMPLEX_COLUMN_SEPARATOR)
}

/// Normalized name of a complex column.
///
/// Returns `None` for plain columns, or when nothing follows the root segment.
pub fn normalize_complex_name(name: &str) -> Option<String> {
    if !is_complex(name) {
        return None;
    }
    let leaf = name
        .split(COMPLEX_COLUMN_SEPARATOR)
        .skip(1)
        .collect::<Vec<_>>()
        .join(".");
    (!leaf.is_empty()).then_some(leaf)
}

/// The name a column is exposed under.
pub fn exposed_name(name: &str) -> String {
    normalize_complex_name(name).unwrap_or_else(|| name.to_string())
}

/// Infers the semantic type of a frame column.
pub trait ColumnTypeInferencer {
    fn infer(&self, frame: &Frame, column: &str) -> DataType;
}

/// Infers types from the values present in a column.
///
/// Missing values are ignored. Ints mixed with floats widen to `Float`,
/// dates mixed with timestamps widen to `Datetime`, and any other mix (or a
/// column with no present values) is `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTypeInferencer;

impl ColumnTypeInferencer for ValueTypeInferencer {
    fn infer(&self, frame: &Frame, column: &str) -> DataType {
        let Some(column) = frame.column(column) else {
            return DataType::String;
        };

        column
            .present()
            .map(value_type)
            .reduce(widen)
            .unwrap_or(DataType::String)
    }
}

fn value_type(value: &Value) -> DataType {
    match value {
        Value::Bool(_) => DataType::Boolean,
        Value::Int(_) => DataType::Int,
        Value::Float(_) => DataType::Float,
        Value::Date(_) => DataType::Date,
        Value::Timestamp(_) => DataType::Datetime,
        Value::List(_) => DataType::Array,
        Value::Map(_) => DataType::Json,
        Value::String(_) | Value::Null => DataType::String,
    }
}

fn widen(a: DataType, b: DataType) -> DataType {
    match (a, b) {
        _ if a == b => a,
        (DataType::Int, DataType::Float) | (DataType::Float, DataType::Int) => DataType::Float,
        (DataType::Date, DataType::Datetime) | (DataType::Datetime, DataType::Date) => {
            DataType::Datetime
        }
        _ => DataType::String,
    }
}
