//! Inference of parameter types and constraints from samples.

mod analyzer;
mod classifiers;
mod patterns;

pub use analyzer::TypeAnalyzer;
pub use classifiers::BATTERY;
pub use patterns::{infer_shape, ShapeMatch};
