//! The classifier battery.
//!
//! Each classifier is a pure predicate over one raw value (or, for fixed
//! sets and formatted strings, over the whole sample). The analyzer walks
//! `BATTERY` in order and stops at the first classifier whose match ratio
//! reaches the confidence threshold.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::patterns;
use crate::schema::{InferredType, JsonShape, TimestampFormat};
use crate::value::{self, temporal};

/// Classifier order. Ties at equal confidence resolve to the earlier entry.
pub const BATTERY: [InferredType; 8] = [
    InferredType::Numeric,
    InferredType::TimestampIso,
    InferredType::TimestampUnixSeconds,
    InferredType::TimestampUnixMillis,
    InferredType::Json,
    InferredType::List,
    InferredType::FixedSet,
    InferredType::FormattedString,
];

/// Numeric winners are refined into these before settling on plain numeric.
pub const NUMERIC_REFINEMENTS: [InferredType; 2] = [
    InferredType::TimestampUnixSeconds,
    InferredType::TimestampUnixMillis,
];

const MAX_JSON_DEPTH: usize = 4;

/// Thresholds the classifiers need.
#[derive(Debug, Clone)]
pub struct ClassifierContext {
    /// Epoch seconds window, end exclusive. The end is also the ISO horizon.
    pub epoch_start: i64,
    pub epoch_end: i64,
    pub fixed_set_max_distinct: usize,
    pub fixed_set_max_ratio: f64,
    pub confidence_threshold: f64,
}

impl ClassifierContext {
    /// Fraction of `values` the classifier for `inferred_type` accepts.
    pub fn match_ratio(&self, inferred_type: InferredType, values: &[&Value]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let total = values.len();

        let matched = match inferred_type {
            InferredType::FixedSet => {
                return if self.fixed_set_values(values).is_some() { 1.0 } else { 0.0 };
            }
            InferredType::FormattedString => {
                return self.shape(values).map(|s| s.ratio).unwrap_or(0.0);
            }
            InferredType::FreeString => values
                .iter()
                .filter(|v| matches!(v, Value::String(_)))
                .count(),
            per_value => values
                .iter()
                .filter(|v| self.value_matches(per_value, v))
                .count(),
        };

        matched as f64 / total as f64
    }

    /// Per-value predicate for the value-level classifiers.
    pub fn value_matches(&self, inferred_type: InferredType, value: &Value) -> bool {
        match inferred_type {
            InferredType::Numeric => value::as_number(value).is_some(),
            InferredType::TimestampIso => self.in_window(value, TimestampFormat::Iso8601, false),
            InferredType::TimestampUnixSeconds => {
                self.in_window(value, TimestampFormat::UnixSeconds, true)
            }
            InferredType::TimestampUnixMillis => {
                self.in_window(value, TimestampFormat::UnixMillis, true)
            }
            InferredType::Json => value::as_objects(value)
                .map(|objects| !objects.is_empty())
                .unwrap_or(false),
            InferredType::List => value::parse_list(value)
                .map(|items| items.iter().all(value::is_scalar))
                .unwrap_or(false),
            InferredType::FixedSet | InferredType::FormattedString => false,
            InferredType::FreeString => matches!(value, Value::String(_)),
        }
    }

    fn in_window(&self, value: &Value, format: TimestampFormat, check_start: bool) -> bool {
        match temporal::epoch_seconds(value, format) {
            Some(epoch) => (!check_start || epoch >= self.epoch_start) && epoch < self.epoch_end,
            None => false,
        }
    }

    /// Sorted distinct values when the sample looks like an enumeration.
    ///
    /// Requires at least one repeated value and a cardinality under either
    /// the absolute or the relative ceiling.
    pub fn fixed_set_values(&self, values: &[&Value]) -> Option<Vec<String>> {
        let distinct: BTreeSet<String> = values.iter().map(|v| value::canonical_text(v)).collect();
        let n = values.len();
        if distinct.is_empty() || distinct.len() >= n {
            return None;
        }

        let under_absolute = distinct.len() <= self.fixed_set_max_distinct;
        let under_relative = (distinct.len() as f64) <= self.fixed_set_max_ratio * n as f64;
        (under_absolute || under_relative).then(|| distinct.into_iter().collect())
    }

    /// Best recurring shape among the string values.
    pub fn shape(&self, values: &[&Value]) -> Option<patterns::ShapeMatch> {
        let texts: Vec<&str> = values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        patterns::infer_shape(&texts, values.len(), self.confidence_threshold)
    }
}

/// Required fields shared by every object, with nested shapes.
pub fn infer_json_shape(objects: &[Map<String, Value>]) -> JsonShape {
    infer_json_shape_at(objects, 0)
}

fn infer_json_shape_at(objects: &[Map<String, Value>], depth: usize) -> JsonShape {
    let Some(first) = objects.first() else {
        return JsonShape::default();
    };

    let required_fields: Vec<String> = first
        .keys()
        .filter(|key| objects.iter().all(|object| object.contains_key(*key)))
        .cloned()
        .collect();

    let mut shape = JsonShape {
        required_fields,
        ..JsonShape::default()
    };
    if depth + 1 >= MAX_JSON_DEPTH {
        return shape;
    }

    for field in &shape.required_fields {
        let nested: Option<Vec<Vec<Map<String, Value>>>> = objects
            .iter()
            .map(|object| object.get(field).and_then(value::as_objects))
            .collect();
        let Some(nested) = nested else {
            continue;
        };
        let flattened: Vec<Map<String, Value>> = nested.into_iter().flatten().collect();
        if flattened.is_empty() {
            continue;
        }
        shape
            .nested
            .insert(field.clone(), infer_json_shape_at(&flattened, depth + 1));
    }

    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> ClassifierContext {
        ClassifierContext {
            epoch_start: 1_577_836_800,
            epoch_end: 1_924_992_000,
            fixed_set_max_distinct: 20,
            fixed_set_max_ratio: 0.05,
            confidence_threshold: 0.8,
        }
    }

    fn refs(values: &[Value]) -> Vec<&Value> {
        values.iter().collect()
    }

    #[test]
    fn test_numeric_ratio() {
        let values = vec![json!(1), json!("2.5"), json!("x"), json!(4)];
        let ratio = context().match_ratio(InferredType::Numeric, &refs(&values));
        assert_eq!(ratio, 0.75);
    }

    #[test]
    fn test_iso_horizon_guard() {
        let ctx = context();
        assert!(ctx.value_matches(InferredType::TimestampIso, &json!("2024-01-15T10:00:00Z")));
        assert!(!ctx.value_matches(InferredType::TimestampIso, &json!("2099-01-15T10:00:00Z")));
        // Old ISO dates have no lower guard.
        assert!(ctx.value_matches(InferredType::TimestampIso, &json!("1999-01-15T10:00:00Z")));
    }

    #[test]
    fn test_unix_windows() {
        let ctx = context();
        assert!(ctx.value_matches(InferredType::TimestampUnixSeconds, &json!(1_705_312_800)));
        assert!(!ctx.value_matches(InferredType::TimestampUnixSeconds, &json!(42)));
        assert!(ctx.value_matches(InferredType::TimestampUnixMillis, &json!("1705312800123.25")));
        assert!(!ctx.value_matches(InferredType::TimestampUnixMillis, &json!(1_705_312_800)));
    }

    #[test]
    fn test_json_and_list_are_disjoint() {
        let ctx = context();
        assert!(ctx.value_matches(InferredType::Json, &json!(r#"{"a": 1}"#)));
        assert!(!ctx.value_matches(InferredType::Json, &json!("[1, 2]")));
        assert!(!ctx.value_matches(InferredType::Json, &json!([])));
        assert!(ctx.value_matches(InferredType::List, &json!("[1, 2]")));
        assert!(ctx.value_matches(InferredType::List, &json!(["a", "b"])));
        assert!(!ctx.value_matches(InferredType::List, &json!([{"a": 1}])));
    }

    #[test]
    fn test_fixed_set_requires_repeats() {
        let ctx = context();
        let repeated = vec![json!("a"), json!("b"), json!("a")];
        assert_eq!(
            ctx.fixed_set_values(&refs(&repeated)),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        let distinct = vec![json!("a"), json!("b"), json!("c")];
        assert_eq!(ctx.fixed_set_values(&refs(&distinct)), None);
    }

    #[test]
    fn test_fixed_set_relative_ceiling() {
        let ctx = ClassifierContext {
            fixed_set_max_distinct: 2,
            ..context()
        };
        // 30 distinct values over 1000 samples is within 5%.
        let values: Vec<Value> = (0..1000).map(|i| json!(format!("v{}", i % 30))).collect();
        assert_eq!(ctx.fixed_set_values(&refs(&values)).map(|v| v.len()), Some(30));
    }

    #[test]
    fn test_infer_json_shape() {
        let objects: Vec<Map<String, Value>> = vec![
            json!({"id": 1, "ctx": {"os": "ios", "ver": 1}, "a": 1}),
            json!({"id": 2, "ctx": {"os": "android"}, "b": 2}),
        ]
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

        let shape = infer_json_shape(&objects);
        assert_eq!(shape.required_fields, vec!["ctx".to_string(), "id".to_string()]);
        assert_eq!(shape.nested["ctx"].required_fields, vec!["os".to_string()]);
    }
}
