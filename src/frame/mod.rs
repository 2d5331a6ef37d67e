//! In-memory tabular frames.
//!
//! A [`Frame`] is one chunk of a logical table: named columns of equal
//! length. Multi-file or multi-partition datasets arrive as a [`FrameSet`],
//! an ordered list of frames that all describe the same table.
//!
//! Frames are values. Every transform (`filter`, `take`, `select`,
//! `renamed`, `drop_missing`) returns a new frame and leaves the input
//! untouched.

mod value;

pub use value::Value;

use crate::error::{SamplerError, SamplerResult};

/// Ordered chunks of one logical table.
pub type FrameSet = Vec<Frame>;

/// Total number of rows across all frames.
pub fn total_rows(frames: &[Frame]) -> usize {
    frames.iter().map(Frame::num_rows).sum()
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Iterate over the non-missing values.
    pub fn present(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_missing())
    }
}

/// One chunk of tabular data (rows × named columns).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Frame {
    /// Build a frame from columns, checking they all have the same length.
    pub fn new(columns: Vec<Column>) -> SamplerResult<Self> {
        let num_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != num_rows) {
            return Err(SamplerError::ShapeMismatch {
                column: bad.name.clone(),
                expected: num_rows,
                actual: bad.values.len(),
            });
        }
        Ok(Self { columns, num_rows })
    }

    /// Build a frame from row tuples.
    ///
    /// Every row must carry exactly one value per column name.
    pub fn from_rows<S: Into<String>>(
        names: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> SamplerResult<Self> {
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SamplerError::ShapeMismatch {
                    column: format!("row {}", idx),
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Self::new(columns)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Frame::column`] but fails with `ColumnNotFound`.
    pub fn require_column(&self, name: &str) -> SamplerResult<&Column> {
        self.column(name)
            .ok_or_else(|| SamplerError::ColumnNotFound(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The values of one row, in column order.
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.values[idx].clone()).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.num_rows).map(move |idx| self.row(idx))
    }

    /// Keep the rows whose mask entry is `true`.
    pub fn filter(&self, mask: &[bool]) -> Frame {
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(idx, &keep)| keep.then_some(idx))
            .collect();
        self.take(&keep)
    }

    /// Gather rows by index. Indices may repeat.
    pub fn take(&self, indices: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&idx| c.values[idx].clone()).collect(),
            })
            .collect();
        Frame {
            columns,
            num_rows: indices.len(),
        }
    }

    /// Project onto the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> SamplerResult<Frame> {
        let columns = names
            .iter()
            .map(|name| self.require_column(name).cloned())
            .collect::<SamplerResult<Vec<_>>>()?;
        Ok(Frame {
            columns,
            num_rows: self.num_rows,
        })
    }

    /// A copy of this frame with one column renamed.
    ///
    /// Renaming a column that does not exist returns an unchanged copy.
    pub fn renamed(&self, from: &str, to: &str) -> Frame {
        let mut frame = self.clone();
        if let Some(column) = frame.columns.iter_mut().find(|c| c.name == from) {
            column.name = to.to_string();
        }
        frame
    }

    /// Drop every row that contains a missing value in any column.
    pub fn drop_missing(&self) -> Frame {
        let mask: Vec<bool> = (0..self.num_rows)
            .map(|idx| self.columns.iter().all(|c| !c.values[idx].is_missing()))
            .collect();
        self.filter(&mask)
    }
}
