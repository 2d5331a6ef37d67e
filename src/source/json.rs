//! JSON and JSON Lines files as frames.
//!
//! Each file is one frame of the table. Nested objects are flattened into
//! complex columns (`{"addr": {"city": "Oslo"}}` becomes `addr_##city`);
//! arrays are kept whole as list values.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Map;
use tracing::{debug, warn};

use super::{EntityRef, FrameSource};
use crate::columns::COMPLEX_COLUMN_SEPARATOR;
use crate::config::SampleConfig;
use crate::error::{SamplerError, SamplerResult};
use crate::frame::{Column, Frame, FrameSet, Value};

/// Reads one frame per file.
///
/// `.json` files hold an array of records or a single record. Any other
/// extension (`.jsonl`, `.ndjson`, ...) is read as one record per line.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    paths: Vec<PathBuf>,
}

impl JsonFileSource {
    pub fn new<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn read_frame(path: &Path) -> Result<Frame, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let is_document = path.extension().is_some_and(|ext| ext == "json");

        let values: Vec<serde_json::Value> = if is_document {
            match serde_json::from_str::<serde_json::Value>(&content)
                .map_err(|e| format!("{}: {}", path.display(), e))?
            {
                serde_json::Value::Array(items) => items,
                other => vec![other],
            }
        } else {
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(idx, line)| {
                    serde_json::from_str(line)
                        .map_err(|e| format!("{}:{}: {}", path.display(), idx + 1, e))
                })
                .collect::<Result<_, _>>()?
        };

        let records = values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| match value {
                serde_json::Value::Object(record) => Ok(flatten_record(record)),
                other => Err(format!(
                    "{}: record {} is not an object: {}",
                    path.display(),
                    idx + 1,
                    other
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        records_to_frame(records).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

impl FrameSource for JsonFileSource {
    fn fetch_frames(&self, entity: &EntityRef, _config: &SampleConfig) -> SamplerResult<FrameSet> {
        let frames = self
            .paths
            .iter()
            .map(|path| Self::read_frame(path))
            .collect::<Result<FrameSet, _>>()
            .map_err(|reason| {
                SamplerError::source_unavailable(entity.fully_qualified_name(), reason)
            })?;

        for (path, frame) in self.paths.iter().zip(&frames) {
            if frame.is_empty() {
                warn!(entity = %entity, path = %path.display(), "file holds no records");
            }
        }

        debug!(
            entity = %entity,
            files = self.paths.len(),
            rows = crate::frame::total_rows(&frames),
            "read json frames"
        );
        Ok(frames)
    }
}

/// Flatten nested objects of a record into `parent_##child` fields.
///
/// Fields keep their first-seen order. Empty nested objects are kept as
/// empty map values.
pub fn flatten_record(record: Map<String, serde_json::Value>) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    flatten_into(None, record, &mut fields);
    fields
}

fn flatten_into(
    prefix: Option<&str>,
    record: Map<String, serde_json::Value>,
    fields: &mut Vec<(String, Value)>,
) {
    for (key, value) in record {
        let name = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, COMPLEX_COLUMN_SEPARATOR, key),
            None => key,
        };
        match value {
            serde_json::Value::Object(nested) if !nested.is_empty() => {
                flatten_into(Some(&name), nested, fields)
            }
            other => fields.push((name, Value::from(other))),
        }
    }
}

/// Build a frame from flattened records. Missing fields become nulls.
fn records_to_frame(records: Vec<Vec<(String, Value)>>) -> SamplerResult<Frame> {
    let mut names: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (name, _) in records.iter().flatten() {
        if !positions.contains_key(name) {
            positions.insert(name.clone(), names.len());
            names.push(name.clone());
        }
    }

    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column::new(name, vec![Value::Null; records.len()]))
        .collect();

    for (row, record) in records.into_iter().enumerate() {
        for (name, value) in record {
            columns[positions[&name]].values[row] = value;
        }
    }

    Frame::new(columns)
}
