//! Validation rules and rule sets.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::validators::{Validate, Validator};
use crate::error::{Result, ShapeError};
use crate::value;

/// A parameter bound to exactly one validator, plus inference metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Parameter name. Optional in files, where the map key is authoritative.
    #[serde(default)]
    pub parameter: String,
    /// The validator applied to each value.
    pub validator: Validator,
    /// Null values pass without consulting the validator.
    #[serde(default)]
    pub allow_null: bool,
    /// Confidence of the profile the rule came from (1.0 for manual rules).
    #[serde(default = "full_confidence")]
    pub confidence: f64,
    /// Sample size of the profile the rule came from.
    #[serde(default)]
    pub sample_size: usize,
    /// The inference behind this rule was too weak to trust.
    #[serde(default)]
    pub low_confidence: bool,
}

fn full_confidence() -> f64 {
    1.0
}

impl ValidationRule {
    /// Create a manual rule.
    pub fn new(parameter: impl Into<String>, validator: Validator) -> Self {
        Self {
            parameter: parameter.into(),
            validator,
            allow_null: false,
            confidence: 1.0,
            sample_size: 0,
            low_confidence: false,
        }
    }

    /// Set whether nulls pass.
    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// Check one raw value.
    pub fn validate(&self, value: &Value) -> bool {
        if self.allow_null && value::is_null(value) {
            return true;
        }
        self.validator.validate(value)
    }

    /// Validator kind label.
    pub fn kind(&self) -> &'static str {
        self.validator.kind()
    }
}

/// Rules keyed by parameter name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: IndexMap<String, ValidationRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any existing rule for the same parameter.
    pub fn insert(&mut self, rule: ValidationRule) -> Option<ValidationRule> {
        self.rules.insert(rule.parameter.clone(), rule)
    }

    pub fn get(&self, parameter: &str) -> Option<&ValidationRule> {
        self.rules.get(parameter)
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.rules.contains_key(parameter)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationRule> {
        self.rules.values()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Overlay another rule set; rules in `other` win.
    pub fn merge(&mut self, other: RuleSet) {
        for (_, rule) in other.rules {
            self.insert(rule);
        }
    }

    /// SHA-256 over the serialized rules.
    ///
    /// Two rule sets with identical constraints share a fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.rules)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }

    /// Save to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| ShapeError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ShapeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let rules: RuleSet = serde_json::from_str(&text)?;
        Ok(rules.normalized())
    }

    // Keys are authoritative in the file; keep each rule's parameter in sync.
    fn normalized(self) -> Self {
        let rules = self
            .rules
            .into_iter()
            .map(|(name, mut rule)| {
                rule.parameter = name.clone();
                (name, rule)
            })
            .collect();
        Self { rules }
    }
}

impl FromIterator<ValidationRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = ValidationRule>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validators::{NonEmptyStringValidator, RangeValidator};
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn range_rule(name: &str) -> ValidationRule {
        ValidationRule::new(
            name,
            Validator::Range(RangeValidator::new(Some(0.0), Some(1.0), false)),
        )
    }

    #[test]
    fn test_allow_null_short_circuits() {
        let rule = ValidationRule::new("x", Validator::NonEmptyString(NonEmptyStringValidator {}));
        assert!(!rule.validate(&Value::Null));
        let rule = rule.with_allow_null(true);
        assert!(rule.validate(&Value::Null));
        assert!(rule.validate(&json!("")));
        assert!(!rule.validate(&json!(3)));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a: RuleSet = vec![range_rule("a"), range_rule("b")].into_iter().collect();
        let b: RuleSet = vec![range_rule("a"), range_rule("b")].into_iter().collect();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

        let c: RuleSet = vec![range_rule("a")].into_iter().collect();
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }

    #[test]
    fn test_merge_overrides() {
        let mut base: RuleSet = vec![range_rule("a")].into_iter().collect();
        let manual: RuleSet = vec![ValidationRule::new(
            "a",
            Validator::NonEmptyString(NonEmptyStringValidator {}),
        )]
        .into_iter()
        .collect();
        base.merge(manual);
        assert_eq!(base.len(), 1);
        assert_eq!(base.get("a").unwrap().kind(), "non_empty_string");
    }

    #[test]
    fn test_save_and_load() {
        let rules: RuleSet = vec![range_rule("a")].into_iter().collect();
        let file = NamedTempFile::new().unwrap();
        rules.save(file.path()).unwrap();
        let loaded = RuleSet::load(file.path()).unwrap();
        assert_eq!(loaded, rules);
    }

    #[test]
    fn test_load_hand_written_rules() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"rules": {"order_id": {"validator": {"kind": "transaction_id", "min_length": 6}}}}"#,
        )
        .unwrap();
        let loaded = RuleSet::load(file.path()).unwrap();
        let rule = loaded.get("order_id").unwrap();
        assert_eq!(rule.parameter, "order_id");
        assert_eq!(rule.confidence, 1.0);
        assert!(rule.validate(&json!("abc-123")));
    }
}
