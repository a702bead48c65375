//! Batch sources and sampling.
//!
//! A source yields bounded batches of raw values keyed by parameter name.
//! Each call to `batches()` starts a fresh pass, so the same source can be
//! sampled for analysis and then validated.

mod jsonl;
mod parser;
mod sampler;
mod source;

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, ShapeError};

pub use jsonl::JsonLinesSource;
pub use parser::CsvSource;
pub use sampler::SampleCollector;
pub use source::{MemorySource, Row};

/// Raw values per parameter for one chunk of events.
///
/// A parameter missing from an event contributes nothing to the batch;
/// an explicit null is kept as a value.
pub type Batch = IndexMap<String, Vec<Value>>;

/// Iterator over the batches of one pass.
pub type Batches<'a> = Box<dyn Iterator<Item = Result<Batch>> + 'a>;

/// A restartable producer of batches.
pub trait BatchSource {
    /// Start a new pass over the source.
    fn batches(&self) -> Result<Batches<'_>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Open a file source, choosing the adapter from the file extension.
///
/// `.jsonl`/`.ndjson` are read as JSON lines; `.csv`, `.tsv` and `.txt`
/// as delimited text with delimiter detection.
pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Box<dyn BatchSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jsonl" | "ndjson" => Ok(Box::new(JsonLinesSource::new(path, chunk_size))),
        "csv" | "tsv" | "txt" => Ok(Box::new(CsvSource::new(path, chunk_size))),
        other => Err(ShapeError::UnsupportedFormat(format!(
            "'{}' (extension '{}')",
            path.display(),
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_by_extension() {
        assert!(open("events.jsonl", 10).is_ok());
        assert!(open("events.TSV", 10).is_ok());
        assert!(matches!(
            open("events.parquet", 10),
            Err(ShapeError::UnsupportedFormat(_))
        ));
    }
}
