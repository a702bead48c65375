//! Core type definitions for profile representation.

use serde::{Deserialize, Serialize};

/// Inferred semantic type for a parameter.
///
/// Variant order is the classifier battery order; ties resolve toward the
/// earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferredType {
    /// Integers or floats.
    Numeric,
    /// ISO 8601 date-times.
    TimestampIso,
    /// Epoch seconds.
    TimestampUnixSeconds,
    /// Epoch milliseconds.
    TimestampUnixMillis,
    /// JSON objects or arrays of objects.
    Json,
    /// Lists of scalar items.
    List,
    /// Small enumerated value space.
    FixedSet,
    /// Strings with a recurring shape.
    FormattedString,
    /// Anything else.
    FreeString,
}

impl InferredType {
    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            InferredType::TimestampIso
                | InferredType::TimestampUnixSeconds
                | InferredType::TimestampUnixMillis
        )
    }

    /// Timestamp format for temporal types.
    pub fn timestamp_format(&self) -> Option<TimestampFormat> {
        match self {
            InferredType::TimestampIso => Some(TimestampFormat::Iso8601),
            InferredType::TimestampUnixSeconds => Some(TimestampFormat::UnixSeconds),
            InferredType::TimestampUnixMillis => Some(TimestampFormat::UnixMillis),
            _ => None,
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            InferredType::Numeric => "numeric",
            InferredType::TimestampIso => "timestamp-iso",
            InferredType::TimestampUnixSeconds => "timestamp-unix-seconds",
            InferredType::TimestampUnixMillis => "timestamp-unix-millis",
            InferredType::Json => "json",
            InferredType::List => "list",
            InferredType::FixedSet => "fixed-set",
            InferredType::FormattedString => "formatted-string",
            InferredType::FreeString => "free-string",
        }
    }
}

impl Default for InferredType {
    fn default() -> Self {
        InferredType::FreeString
    }
}

impl std::fmt::Display for InferredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Encoding of a timestamp value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `YYYY-MM-DDThh:mm:ss[.f][Z|±hh:mm]`
    Iso8601,
    /// Seconds since the Unix epoch.
    UnixSeconds,
    /// Milliseconds since the Unix epoch, fractional part tolerated.
    UnixMillis,
}

/// Named string shapes recognized by the formatted-string classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `<root>/<package>/files/mongodb-realm/<id>/<id>/<name>.realm`
    RealmPath,
    /// 8-4-4-4-12 hex groups.
    Uuid,
    /// 32 lowercase hex characters.
    VersionHash,
    /// Hex string of one fixed length.
    Hex,
    /// Absolute slash-separated path.
    Path,
    /// Shape derived from character classes of the sample.
    Derived,
}

impl PatternKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::RealmPath => "realm path",
            PatternKind::Uuid => "UUID",
            PatternKind::VersionHash => "version hash",
            PatternKind::Hex => "fixed-length hex",
            PatternKind::Path => "path",
            PatternKind::Derived => "derived shape",
        }
    }
}
