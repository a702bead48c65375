//! CSV/TSV source with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{Batch, BatchSource, Batches};
use crate::error::{Result, ShapeError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Lines inspected for delimiter detection.
const DETECTION_LINES: usize = 10;

/// Streams a delimited file with a header row.
///
/// Every cell becomes a string value; empty cells are nulls downstream.
/// Nothing beyond the current batch is held in memory.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: Option<u8>,
    chunk_size: usize,
    quote: u8,
}

impl CsvSource {
    /// Create a source for `path`, `chunk_size` rows per batch (minimum 1).
    pub fn new(path: impl AsRef<Path>, chunk_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: None,
            chunk_size: chunk_size.max(1),
            quote: b'"',
        }
    }

    /// Use a fixed delimiter instead of detecting one.
    pub fn with_delimiter(mut self, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
            return Err(ShapeError::InvalidDelimiter(format!("{:?}", delimiter)));
        }
        self.delimiter = Some(delimiter as u8);
        Ok(self)
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| ShapeError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    fn resolve_delimiter(&self) -> Result<u8> {
        if let Some(delimiter) = self.delimiter {
            return Ok(delimiter);
        }
        let lines: Vec<String> = BufReader::new(self.open()?)
            .lines()
            .take(DETECTION_LINES)
            .collect::<std::io::Result<_>>()
            .map_err(|e| ShapeError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        detect_delimiter(&lines)
    }
}

impl BatchSource for CsvSource {
    fn batches(&self) -> Result<Batches<'_>> {
        let delimiter = self.resolve_delimiter()?;
        debug!(path = %self.path.display(), delimiter = %(delimiter as char).escape_default(), "reading delimited file");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.quote)
            .flexible(true)
            .from_reader(self.open()?);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ShapeError::EmptyData(format!(
                "no columns found in '{}'",
                self.path.display()
            )));
        }

        Ok(Box::new(CsvBatches {
            reader,
            headers,
            chunk_size: self.chunk_size,
            record: csv::StringRecord::new(),
            done: false,
        }))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

struct CsvBatches {
    reader: csv::Reader<File>,
    headers: Vec<String>,
    chunk_size: usize,
    record: csv::StringRecord,
    done: bool,
}

impl Iterator for CsvBatches {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Batch::new();
        let mut rows = 0;
        while rows < self.chunk_size {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => {
                    // Short rows leave trailing parameters absent.
                    for (header, cell) in self.headers.iter().zip(self.record.iter()) {
                        batch
                            .entry(header.clone())
                            .or_default()
                            .push(Value::String(cell.to_string()));
                    }
                    rows += 1;
                }
                Ok(false) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }

        (rows > 0).then_some(Ok(batch))
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(lines: &[String]) -> Result<u8> {
    let lines: Vec<&String> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(ShapeError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tabs break ties.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    fn write_file(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_detect_delimiter_csv() {
        assert_eq!(detect_delimiter(&lines("a,b,c\n1,2,3\n4,5,6")).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        assert_eq!(detect_delimiter(&lines("a\tb\tc\n1\t2\t3\n4\t5\t6")).unwrap(), b'\t');
    }

    #[test]
    fn test_quoted_commas_are_ignored() {
        let text = "name;tags\n\"a,b\";x\n\"c,d,e\";y";
        assert_eq!(detect_delimiter(&lines(text)).unwrap(), b';');
    }

    #[test]
    fn test_streams_batches() {
        let file = write_file("name,age\nAlice,30\nBob,\nCarol,41\n", ".csv");
        let source = CsvSource::new(file.path(), 2);
        let batches: Vec<Batch> = source.batches().unwrap().map(|b| b.unwrap()).collect();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0]["name"], vec![Value::from("Alice"), Value::from("Bob")]);
        assert_eq!(batches[0]["age"][1], Value::from(""));
        assert_eq!(batches[1]["age"], vec![Value::from("41")]);
    }

    #[test]
    fn test_explicit_delimiter() {
        let file = write_file("a|b\n1|2\n", ".txt");
        let source = CsvSource::new(file.path(), 10).with_delimiter('|').unwrap();
        let batch = source.batches().unwrap().next().unwrap().unwrap();
        assert_eq!(batch["b"], vec![Value::from("2")]);

        assert!(matches!(
            CsvSource::new(file.path(), 10).with_delimiter('é'),
            Err(ShapeError::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CsvSource::new("/nonexistent/events.csv", 10);
        assert!(matches!(source.batches(), Err(ShapeError::Io { .. })));
    }

    #[test]
    fn test_empty_file_is_empty_data() {
        let file = write_file("", ".csv");
        let source = CsvSource::new(file.path(), 10);
        assert!(matches!(source.batches(), Err(ShapeError::EmptyData(_))));
    }
}
