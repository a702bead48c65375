//! Parameter profile definition and constraints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{InferredType, PatternKind};

/// Inclusive numeric bounds. An unset side is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    /// Create a range bounded on both sides.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Check if a value lies within the range.
    pub fn contains(&self, value: f64) -> bool {
        let above_min = self.min.map(|m| value >= m).unwrap_or(true);
        let below_max = self.max.map(|m| value <= m).unwrap_or(true);
        above_min && below_max
    }
}

/// Inclusive epoch-seconds bounds. An unset side is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochWindow {
    pub min_epoch: Option<i64>,
    pub max_epoch: Option<i64>,
}

/// Required fields of a JSON object, with shapes for object-valued fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonShape {
    /// Fields present in every sampled object, in key order.
    pub required_fields: Vec<String>,
    /// Shapes of fields whose values were always objects.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nested: IndexMap<String, JsonShape>,
}

/// Type-specific constraints for a parameter.
///
/// Only the fields relevant to the inferred type are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Whether null values were observed.
    pub null_allowed: bool,
    /// Numeric bounds, already widened by the configured headroom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<NumericRange>,
    /// Allowed values for fixed sets, sorted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Anchored regex for formatted strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Which shape produced the pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_kind: Option<PatternKind>,
    /// Object shape for JSON parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_shape: Option<JsonShape>,
    /// Profile of the flattened items of a list parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_items: Option<Box<ParameterProfile>>,
    /// Accepted epoch seconds window for timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch_window: Option<EpochWindow>,
}

/// Match ratio of one classifier over the non-null sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub inferred_type: InferredType,
    pub match_ratio: f64,
}

/// Inferred description of one parameter.
///
/// Profiles are built once per analysis run and never mutated; re-analysis
/// produces a fresh profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterProfile {
    /// Parameter name.
    pub name: String,
    /// Winning classifier.
    pub inferred_type: InferredType,
    /// Constraints for the winning type.
    pub constraints: Constraints,
    /// Fraction of non-null values matching the inferred type (0.0-1.0).
    pub confidence: f64,
    /// Number of sampled values, nulls included.
    pub sample_size: usize,
    /// Number of sampled nulls.
    pub null_count: usize,
    /// Too few non-null values to classify.
    #[serde(default)]
    pub insufficient_data: bool,
    /// Classifiers evaluated, in battery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
}

impl ParameterProfile {
    /// Profile for a sample with nothing to classify.
    pub fn insufficient(name: impl Into<String>, sample_size: usize, null_count: usize) -> Self {
        Self {
            name: name.into(),
            inferred_type: InferredType::FreeString,
            constraints: Constraints {
                null_allowed: null_count > 0,
                ..Constraints::default()
            },
            confidence: 0.0,
            sample_size,
            null_count,
            insufficient_data: true,
            candidates: Vec::new(),
        }
    }

    /// Number of non-null sampled values.
    pub fn non_null_count(&self) -> usize {
        self.sample_size - self.null_count
    }

    /// Get the null percentage.
    pub fn null_percentage(&self) -> f64 {
        if self.sample_size == 0 {
            0.0
        } else {
            (self.null_count as f64 / self.sample_size as f64) * 100.0
        }
    }

    /// Check if the inference reaches a confidence threshold.
    pub fn is_confident(&self, threshold: f64) -> bool {
        !self.insufficient_data && self.confidence >= threshold
    }
}
