//! EventShape: shape compatibility checks for event parameters.
//!
//! EventShape samples the events of one software version, infers for each
//! parameter a type and a set of constraints, turns that inference into a
//! validation rule, and applies the rules to the events of another version
//! to decide whether the two are data-compatible.
//!
//! # Core Principles
//!
//! - **Data problems are results**: malformed values fail their rule, thin
//!   samples give low-confidence rules, missing parameters get a status
//! - **Bounded memory**: sources are read in batches, samples are reservoirs
//! - **Deterministic**: the same samples always produce the same rules
//!
//! # Example
//!
//! ```no_run
//! use eventshape::EventShape;
//!
//! let shape = EventShape::new();
//! let old = shape.open("events_v1.jsonl").unwrap();
//! let new = shape.open("events_v2.jsonl").unwrap();
//! let report = shape.compare(old.as_ref(), new.as_ref()).unwrap();
//!
//! for comparison in report.parameters.values() {
//!     println!("{}: {}", comparison.parameter, comparison.status);
//! }
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod input;
pub mod report;
pub mod schema;
pub mod validation;
pub mod value;

mod pipeline;

pub use crate::pipeline::EventShape;
pub use config::ShapeConfig;
pub use error::{Result, ShapeError};
pub use inference::TypeAnalyzer;
pub use input::{Batch, BatchSource, CsvSource, JsonLinesSource, MemorySource, SampleCollector};
pub use report::{ComparisonReport, ParameterComparison, ParameterStatus, ReportBuilder, ReportThresholds};
pub use schema::{InferredType, ParameterProfile};
pub use validation::{RuleGenerator, RuleSet, ValidationEngine, ValidationResult, ValidationRule, Validator};
