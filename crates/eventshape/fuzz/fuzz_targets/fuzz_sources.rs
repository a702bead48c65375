//! Fuzz target for the file sources.
//!
//! This fuzzer tests that the CSV and JSON lines sources:
//! 1. Never panic on malformed input
//! 2. Report bad input as errors instead of crashing the comparison

#![no_main]

use libfuzzer_sys::fuzz_target;
use eventshape::EventShape;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let shape = EventShape::new();
    for suffix in [".csv", ".jsonl"] {
        if let Ok(mut temp_file) = tempfile::NamedTempFile::with_suffix(suffix) {
            if temp_file.write_all(data).is_ok() {
                if let Ok(source) = shape.open(temp_file.path()) {
                    let _ = shape.compare(source.as_ref(), source.as_ref());
                }
            }
        }
    }
});
