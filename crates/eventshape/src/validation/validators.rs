//! The validator catalog.
//!
//! Every validator classifies a single raw value as conforming or not.
//! Malformed input is never an error, it is simply `false`. Validators hold
//! no mutable state, so the same input always yields the same verdict.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;
use crate::schema::{JsonShape, NumericRange, TimestampFormat};
use crate::value::{self, shapes, temporal};

/// Trait for validators.
pub trait Validate {
    /// Check one raw value.
    fn validate(&self, value: &Value) -> bool;
}

/// Closed set of validator kinds.
///
/// Serialized with a `kind` tag so rule sets can be saved, edited by hand
/// and loaded back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    Range(RangeValidator),
    FixedSet(FixedSetValidator),
    List(ListValidator),
    JsonSchema(JsonSchemaValidator),
    Timestamp(TimestampValidator),
    Format(FormatValidator),
    NonEmptyString(NonEmptyStringValidator),
    TransactionId(TransactionIdValidator),
    RealmPath(RealmPathValidator),
    VersionHash(VersionHashValidator),
}

impl Validator {
    /// Stable label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Validator::Range(_) => "range",
            Validator::FixedSet(_) => "fixed_set",
            Validator::List(_) => "list",
            Validator::JsonSchema(_) => "json_schema",
            Validator::Timestamp(_) => "timestamp",
            Validator::Format(_) => "format",
            Validator::NonEmptyString(_) => "non_empty_string",
            Validator::TransactionId(_) => "transaction_id",
            Validator::RealmPath(_) => "realm_path",
            Validator::VersionHash(_) => "version_hash",
        }
    }

    /// Whether verdicts are worth memoizing.
    ///
    /// Regex matching and JSON decoding dominate the cost of a check; the
    /// other kinds are cheaper than a cache lookup.
    pub fn is_memoizable(&self) -> bool {
        matches!(
            self,
            Validator::Format(_)
                | Validator::JsonSchema(_)
                | Validator::List(_)
                | Validator::RealmPath(_)
        )
    }
}

impl Validate for Validator {
    fn validate(&self, value: &Value) -> bool {
        match self {
            Validator::Range(v) => v.validate(value),
            Validator::FixedSet(v) => v.validate(value),
            Validator::List(v) => v.validate(value),
            Validator::JsonSchema(v) => v.validate(value),
            Validator::Timestamp(v) => v.validate(value),
            Validator::Format(v) => v.validate(value),
            Validator::NonEmptyString(v) => v.validate(value),
            Validator::TransactionId(v) => v.validate(value),
            Validator::RealmPath(v) => v.validate(value),
            Validator::VersionHash(v) => v.validate(value),
        }
    }
}

// ============================================================================
// Range
// ============================================================================

/// Numeric values within inclusive bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default)]
    pub allow_null: bool,
}

impl RangeValidator {
    pub fn new(min: Option<f64>, max: Option<f64>, allow_null: bool) -> Self {
        Self {
            min,
            max,
            allow_null,
        }
    }
}

impl Validate for RangeValidator {
    fn validate(&self, value: &Value) -> bool {
        if value::is_null(value) {
            return self.allow_null;
        }
        let range = NumericRange {
            min: self.min,
            max: self.max,
        };
        value::as_number(value)
            .map(|n| range.contains(n))
            .unwrap_or(false)
    }
}

// ============================================================================
// Fixed set
// ============================================================================

/// Exact, case-sensitive membership in an enumerated set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSetValidator {
    pub allowed_values: BTreeSet<String>,
}

impl FixedSetValidator {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validate for FixedSetValidator {
    fn validate(&self, value: &Value) -> bool {
        self.allowed_values.contains(&value::canonical_text(value))
    }
}

// ============================================================================
// List
// ============================================================================

/// Native or textual lists whose items all conform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListValidator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_validator: Option<Box<Validator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<BTreeSet<String>>,
}

impl ListValidator {
    pub fn new(
        item_validator: Option<Validator>,
        allowed_values: Option<BTreeSet<String>>,
    ) -> Self {
        Self {
            item_validator: item_validator.map(Box::new),
            allowed_values,
        }
    }
}

impl Validate for ListValidator {
    fn validate(&self, value: &Value) -> bool {
        let Some(items) = value::parse_list(value) else {
            return false;
        };

        items.iter().all(|item| {
            let item_ok = self
                .item_validator
                .as_ref()
                .map(|v| v.validate(item))
                .unwrap_or(true);
            let member_ok = self
                .allowed_values
                .as_ref()
                .map(|allowed| allowed.contains(&value::canonical_text(item)))
                .unwrap_or(true);
            item_ok && member_ok
        })
    }
}

// ============================================================================
// JSON schema
// ============================================================================

/// Objects (or arrays of objects) carrying a set of required fields.
///
/// Unknown fields are tolerated. Nested shapes are checked only when the
/// field is present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonSchemaValidator {
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nested_schema: IndexMap<String, JsonSchemaValidator>,
}

impl JsonSchemaValidator {
    pub fn new(required_fields: Vec<String>) -> Self {
        Self {
            required_fields,
            nested_schema: IndexMap::new(),
        }
    }

    /// Add a nested schema for an object-valued field.
    pub fn with_nested(mut self, field: impl Into<String>, schema: JsonSchemaValidator) -> Self {
        self.nested_schema.insert(field.into(), schema);
        self
    }

    fn check_object(&self, object: &serde_json::Map<String, Value>) -> bool {
        let has_required = self
            .required_fields
            .iter()
            .all(|field| object.contains_key(field));
        if !has_required {
            return false;
        }

        self.nested_schema.iter().all(|(field, schema)| match object.get(field) {
            Some(nested) => schema.validate(nested),
            None => true,
        })
    }
}

impl From<&JsonShape> for JsonSchemaValidator {
    fn from(shape: &JsonShape) -> Self {
        Self {
            required_fields: shape.required_fields.clone(),
            nested_schema: shape
                .nested
                .iter()
                .map(|(field, nested)| (field.clone(), JsonSchemaValidator::from(nested)))
                .collect(),
        }
    }
}

impl Validate for JsonSchemaValidator {
    fn validate(&self, value: &Value) -> bool {
        match value::as_objects(value) {
            Some(objects) => objects.iter().all(|object| self.check_object(object)),
            None => false,
        }
    }
}

// ============================================================================
// Timestamp
// ============================================================================

/// Timestamps of one format within an inclusive epoch-seconds window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampValidator {
    pub format: TimestampFormat,
    pub min_epoch: Option<i64>,
    pub max_epoch: Option<i64>,
}

impl TimestampValidator {
    pub fn new(format: TimestampFormat, min_epoch: Option<i64>, max_epoch: Option<i64>) -> Self {
        Self {
            format,
            min_epoch,
            max_epoch,
        }
    }
}

impl Validate for TimestampValidator {
    fn validate(&self, value: &Value) -> bool {
        let Some(epoch) = temporal::epoch_seconds(value, self.format) else {
            return false;
        };
        let above_min = self.min_epoch.map(|m| epoch >= m).unwrap_or(true);
        let below_max = self.max_epoch.map(|m| epoch <= m).unwrap_or(true);
        above_min && below_max
    }
}

// ============================================================================
// Format
// ============================================================================

/// A regex anchored at both ends. Serialized as its source text.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern; the source is wrapped as `^(?:source)$`.
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Strings fully matching a regex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatValidator {
    pub pattern: Pattern,
}

impl FormatValidator {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
        })
    }
}

impl Validate for FormatValidator {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.pattern.is_match(s),
            _ => false,
        }
    }
}

// ============================================================================
// Specialized string validators
// ============================================================================

/// Strings with at least one non-whitespace character that are not null markers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NonEmptyStringValidator {}

impl Validate for NonEmptyStringValidator {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => !value::is_null_text(s),
            _ => false,
        }
    }
}

/// Transaction identifiers: `[A-Za-z0-9._-]` with a minimum length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionIdValidator {
    #[serde(default = "TransactionIdValidator::default_min_length")]
    pub min_length: usize,
}

impl TransactionIdValidator {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    fn default_min_length() -> usize {
        8
    }
}

impl Default for TransactionIdValidator {
    fn default() -> Self {
        Self::new(Self::default_min_length())
    }
}

impl Validate for TransactionIdValidator {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => {
                s.len() >= self.min_length.max(1) && shapes::is_transaction_id_charset(s)
            }
            _ => false,
        }
    }
}

/// Realm database file paths under an app data root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RealmPathValidator {}

impl Validate for RealmPathValidator {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => shapes::is_realm_path(s),
            _ => false,
        }
    }
}

/// 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionHashValidator {}

impl Validate for VersionHashValidator {
    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => shapes::is_version_hash(s),
            _ => false,
        }
    }
}
