//! In-memory batch source.

use indexmap::IndexMap;
use serde_json::Value;

use super::{Batch, BatchSource, Batches};
use crate::error::Result;

/// One event: parameter name to raw value.
pub type Row = IndexMap<String, Value>;

/// Rows held in memory, served in chunks.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
    chunk_size: usize,
}

impl MemorySource {
    /// Create a source over `rows`, `chunk_size` rows per batch (minimum 1).
    pub fn new(rows: Vec<Row>, chunk_size: usize) -> Self {
        Self {
            rows,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Build rows from JSON objects. Non-object values are skipped.
    pub fn from_json(values: impl IntoIterator<Item = Value>, chunk_size: usize) -> Self {
        let rows = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map.into_iter().collect()),
                _ => None,
            })
            .collect();
        Self::new(rows, chunk_size)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Collect rows into a batch, parameter by parameter.
pub(crate) fn rows_to_batch<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Batch {
    let mut batch = Batch::new();
    for row in rows {
        for (name, value) in row {
            batch.entry(name.clone()).or_default().push(value.clone());
        }
    }
    batch
}

impl BatchSource for MemorySource {
    fn batches(&self) -> Result<Batches<'_>> {
        Ok(Box::new(
            self.rows
                .chunks(self.chunk_size)
                .map(|chunk| Ok(rows_to_batch(chunk))),
        ))
    }

    fn describe(&self) -> String {
        format!("memory ({} rows)", self.rows.len())
    }
}
