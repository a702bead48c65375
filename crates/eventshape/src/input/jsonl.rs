//! JSON lines source.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{Batch, BatchSource, Batches};
use crate::error::{Result, ShapeError};

/// Streams a file holding one JSON object per line.
///
/// Nested values stay native, so JSON and list parameters reach the
/// analyzer without a string round trip. Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
    chunk_size: usize,
}

impl JsonLinesSource {
    /// Create a source for `path`, `chunk_size` events per batch (minimum 1).
    pub fn new(path: impl AsRef<Path>, chunk_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl BatchSource for JsonLinesSource {
    fn batches(&self) -> Result<Batches<'_>> {
        let file = File::open(&self.path).map_err(|e| ShapeError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(Box::new(JsonLinesBatches {
            path: self.path.clone(),
            lines: BufReader::new(file).lines(),
            line_number: 0,
            chunk_size: self.chunk_size,
            done: false,
        }))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

struct JsonLinesBatches {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    chunk_size: usize,
    done: bool,
}

impl JsonLinesBatches {
    fn parse_line(&self, line: &str) -> Result<serde_json::Map<String, Value>> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ShapeError::Parse {
                line: self.line_number,
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(ShapeError::Parse {
                line: self.line_number,
                message: e.to_string(),
            }),
        }
    }
}

impl Iterator for JsonLinesBatches {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Batch::new();
        let mut events = 0;
        while events < self.chunk_size {
            let Some(line) = self.lines.next() else {
                self.done = true;
                break;
            };
            self.line_number += 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ShapeError::Io {
                        path: self.path.clone(),
                        source: e,
                    }));
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match self.parse_line(&line) {
                Ok(event) => {
                    for (name, value) in event {
                        batch.entry(name).or_default().push(value);
                    }
                    events += 1;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        (events > 0).then_some(Ok(batch))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_native_values() {
        let file = write_file(
            "{\"id\": 1, \"ctx\": {\"os\": \"ios\"}}\n\n{\"id\": 2, \"tags\": [\"a\"]}\n",
        );
        let source = JsonLinesSource::new(file.path(), 10);
        let batches: Vec<Batch> = source.batches().unwrap().map(|b| b.unwrap()).collect();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0]["id"], vec![json!(1), json!(2)]);
        assert_eq!(batches[0]["ctx"], vec![json!({"os": "ios"})]);
        assert_eq!(batches[0]["tags"], vec![json!(["a"])]);
    }

    #[test]
    fn test_chunking() {
        let contents: String = (0..5).map(|i| format!("{{\"n\": {}}}\n", i)).collect();
        let file = write_file(&contents);
        let source = JsonLinesSource::new(file.path(), 2);
        let sizes: Vec<usize> = source
            .batches()
            .unwrap()
            .map(|b| b.unwrap()["n"].len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let file = write_file("{\"a\": 1}\n[1, 2]\n");
        let source = JsonLinesSource::new(file.path(), 10);
        let result: Result<Vec<Batch>> = source.batches().unwrap().collect();
        match result {
            Err(ShapeError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("an array"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
