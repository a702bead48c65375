//! Schema types for representing inferred parameter shapes.

mod profile;
mod types;

pub use profile::{Candidate, Constraints, EpochWindow, JsonShape, NumericRange, ParameterProfile};
pub use types::{InferredType, PatternKind, TimestampFormat};
