//! Rule generation from parameter profiles.
//!
//! The mapping from profile to validator is deterministic, so a rule set
//! generated twice from the same profiles has the same fingerprint.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::rule::{RuleSet, ValidationRule};
use super::validators::{
    FixedSetValidator, FormatValidator, JsonSchemaValidator, ListValidator,
    NonEmptyStringValidator, RangeValidator, RealmPathValidator, TimestampValidator,
    TransactionIdValidator, Validator, VersionHashValidator,
};
use crate::config::ShapeConfig;
use crate::schema::{EpochWindow, InferredType, ParameterProfile, PatternKind};

/// Parameter names that always carry transaction identifiers.
const TRANSACTION_ID_NAMES: [&str; 3] = ["transaction_id", "txn_id", "transactionId"];

/// Maps profiles to validation rules.
#[derive(Debug, Clone)]
pub struct RuleGenerator {
    confidence_threshold: f64,
}

impl RuleGenerator {
    /// Create a generator with default settings.
    pub fn new() -> Self {
        Self::with_config(&ShapeConfig::default())
    }

    /// Create a generator from a configuration.
    pub fn with_config(config: &ShapeConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Generate rules for every profile, preserving order.
    pub fn generate_all(&self, profiles: &IndexMap<String, ParameterProfile>) -> RuleSet {
        let rules: RuleSet = profiles.values().map(|p| self.generate(p)).collect();
        debug!(rules = rules.len(), "generated rule set");
        rules
    }

    /// Generate the rule for one profile.
    pub fn generate(&self, profile: &ParameterProfile) -> ValidationRule {
        let (validator, low_confidence) = match self.validator_for(profile) {
            Some(validator) => (validator, false),
            None => (Validator::NonEmptyString(NonEmptyStringValidator {}), true),
        };

        debug!(
            parameter = %profile.name,
            kind = validator.kind(),
            low_confidence,
            "generated rule"
        );

        ValidationRule {
            parameter: profile.name.clone(),
            validator,
            allow_null: profile.constraints.null_allowed,
            confidence: profile.confidence,
            sample_size: profile.sample_size,
            low_confidence,
        }
    }

    /// The validator for a profile, or `None` when the inference is too weak.
    fn validator_for(&self, profile: &ParameterProfile) -> Option<Validator> {
        if !profile.is_confident(self.confidence_threshold) {
            return None;
        }

        let constraints = &profile.constraints;
        let is_string_type = matches!(
            profile.inferred_type,
            InferredType::FormattedString | InferredType::FreeString
        );
        if is_string_type && is_transaction_id_name(&profile.name) {
            return Some(Validator::TransactionId(TransactionIdValidator::default()));
        }

        let validator = match profile.inferred_type {
            InferredType::Numeric => {
                let range = constraints.range?;
                Validator::Range(RangeValidator::new(
                    range.min,
                    range.max,
                    constraints.null_allowed,
                ))
            }
            InferredType::TimestampIso
            | InferredType::TimestampUnixSeconds
            | InferredType::TimestampUnixMillis => {
                let format = profile.inferred_type.timestamp_format()?;
                let window = constraints.epoch_window.unwrap_or(EpochWindow {
                    min_epoch: None,
                    max_epoch: None,
                });
                Validator::Timestamp(TimestampValidator::new(
                    format,
                    window.min_epoch,
                    window.max_epoch,
                ))
            }
            InferredType::Json => {
                let shape = constraints.json_shape.as_ref()?;
                Validator::JsonSchema(JsonSchemaValidator::from(shape))
            }
            InferredType::List => Validator::List(self.list_validator(profile)),
            InferredType::FixedSet => {
                let values = constraints.allowed_values.as_ref()?;
                Validator::FixedSet(FixedSetValidator::new(values.iter().cloned()))
            }
            InferredType::FormattedString => {
                let kind = constraints.pattern_kind?;
                let pattern = constraints.pattern.as_deref()?;
                match kind {
                    PatternKind::RealmPath => Validator::RealmPath(RealmPathValidator {}),
                    PatternKind::VersionHash => Validator::VersionHash(VersionHashValidator {}),
                    _ => match FormatValidator::new(pattern) {
                        Ok(format) => Validator::Format(format),
                        Err(e) => {
                            warn!(parameter = %profile.name, error = %e, "inferred pattern does not compile");
                            return None;
                        }
                    },
                }
            }
            InferredType::FreeString => Validator::NonEmptyString(NonEmptyStringValidator {}),
        };

        Some(validator)
    }

    /// Item constraint from the item profile of a list parameter.
    fn list_validator(&self, profile: &ParameterProfile) -> ListValidator {
        let Some(items) = profile.constraints.list_items.as_deref() else {
            return ListValidator::default();
        };
        if !items.is_confident(self.confidence_threshold) {
            return ListValidator::default();
        }

        match items.inferred_type {
            InferredType::FixedSet => {
                let allowed: Option<BTreeSet<String>> = items
                    .constraints
                    .allowed_values
                    .as_ref()
                    .map(|values| values.iter().cloned().collect());
                ListValidator::new(None, allowed)
            }
            InferredType::FreeString => ListValidator::default(),
            _ => match self.validator_for(items) {
                Some(item_validator) => ListValidator::new(Some(item_validator), None),
                None => ListValidator::default(),
            },
        }
    }
}

impl Default for RuleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_transaction_id_name(name: &str) -> bool {
    TRANSACTION_ID_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::TypeAnalyzer;
    use serde_json::{json, Value};

    fn rule_for(name: &str, values: Vec<Value>) -> ValidationRule {
        let profile = TypeAnalyzer::new().analyze(name, &values);
        RuleGenerator::new().generate(&profile)
    }

    #[test]
    fn test_numeric_rule_accepts_training_data() {
        let values: Vec<Value> = (0..100).map(|i| json!(i * 7)).collect();
        let rule = rule_for("score", values.clone());
        assert_eq!(rule.kind(), "range");
        assert!(!rule.low_confidence);
        assert!(values.iter().all(|v| rule.validate(v)));
        assert!(!rule.validate(&json!(10_000)));
    }

    #[test]
    fn test_fixed_set_rule() {
        let values: Vec<Value> = ["ios", "android", "ios"].iter().map(|s| json!(s)).collect();
        let rule = rule_for("platform", values);
        assert_eq!(rule.kind(), "fixed_set");
        assert!(rule.validate(&json!("android")));
        assert!(!rule.validate(&json!("Android")));
    }

    #[test]
    fn test_timestamp_rule() {
        let values: Vec<Value> = (0..20).map(|i| json!(1_705_312_800 + i)).collect();
        let rule = rule_for("ts", values);
        assert_eq!(rule.kind(), "timestamp");
        assert!(rule.validate(&json!(1_800_000_000)));
        assert!(!rule.validate(&json!(1_705_312_800_000_i64)));
    }

    #[test]
    fn test_realm_path_rule() {
        let values: Vec<Value> = (0..5)
            .map(|i| {
                json!(format!(
                    "/data/user/0/com.example.app/files/mongodb-realm/{:024x}/{:024x}/default{}.realm",
                    i,
                    i + 1,
                    i
                ))
            })
            .collect();
        let rule = rule_for("realm_path", values);
        assert_eq!(rule.kind(), "realm_path");
    }

    #[test]
    fn test_transaction_id_name_hint() {
        let values: Vec<Value> = (0..10).map(|i| json!(format!("TX-{:06}", i))).collect();
        let rule = rule_for("transaction_id", values);
        assert_eq!(rule.kind(), "transaction_id");

        let rule = rule_for("txn_id", vec![json!("free form words"), json!("more words")]);
        assert_eq!(rule.kind(), "transaction_id");
    }

    #[test]
    fn test_name_hint_does_not_override_numbers() {
        let values: Vec<Value> = (0..10).map(|i| json!(i)).collect();
        let rule = rule_for("transaction_id", values);
        assert_eq!(rule.kind(), "range");
    }

    #[test]
    fn test_insufficient_profile_is_low_confidence() {
        let rule = rule_for("empty", vec![Value::Null]);
        assert_eq!(rule.kind(), "non_empty_string");
        assert!(rule.low_confidence);
        assert!(rule.allow_null);
        assert_eq!(rule.confidence, 0.0);
    }

    #[test]
    fn test_weak_inference_is_low_confidence() {
        let values = vec![json!("a b"), json!(1), json!(2), json!("c d"), json!(true)];
        let rule = rule_for("mixed", values);
        assert!(rule.low_confidence);
        assert_eq!(rule.kind(), "non_empty_string");
    }

    #[test]
    fn test_list_rule_uses_item_values() {
        let values = vec![json!("[a, b]"), json!("[b]"), json!("a,b"), json!("[a]")];
        let rule = rule_for("tags", values);
        assert_eq!(rule.kind(), "list");
        assert!(rule.validate(&json!("[b, a]")));
        assert!(!rule.validate(&json!("[a, z]")));
    }

    #[test]
    fn test_list_rule_with_numeric_items() {
        let values: Vec<Value> = (0..10).map(|i| json!([i * 3, i * 3 + 1, i * 3 + 2])).collect();
        let rule = rule_for("ids", values);
        assert_eq!(rule.kind(), "list");
        match &rule.validator {
            Validator::List(list) => {
                assert_eq!(list.item_validator.as_ref().map(|v| v.kind()), Some("range"));
            }
            other => panic!("expected list validator, got {:?}", other),
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut profiles = IndexMap::new();
        let analyzer = TypeAnalyzer::new();
        profiles.insert("a".to_string(), analyzer.analyze("a", &[json!(1), json!(5)]));
        profiles.insert("b".to_string(), analyzer.analyze("b", &[json!("x"), json!("x")]));

        let generator = RuleGenerator::new();
        let first = generator.generate_all(&profiles);
        let second = generator.generate_all(&profiles);
        assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        assert_eq!(first.parameters().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
