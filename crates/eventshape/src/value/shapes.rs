//! Named string shapes.
//!
//! Each shape is an anchored regex source plus a compiled matcher. The
//! analyzer uses the sources as inferred patterns; the dedicated validators
//! use the matchers.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<app-data-root>/<package>/files/mongodb-realm/<24 hex>/<24 hex>/<filename>.realm`
pub const REALM_PATH: &str = r"/(?:[^/\s]+/)*[A-Za-z][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)+/files/mongodb-realm/[0-9a-fA-F]{24}/[0-9a-fA-F]{24}/[^/\s]+\.realm";

/// 8-4-4-4-12 hex groups.
pub const UUID: &str = r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

/// Exactly 32 lowercase hex characters.
pub const VERSION_HASH: &str = r"[0-9a-f]{32}";

/// Absolute slash-separated path.
pub const PATH: &str = r"(?:/[^/\s]+)+/?";

/// Characters allowed in transaction identifiers.
pub const TRANSACTION_ID_CHARSET: &str = r"[A-Za-z0-9._-]+";

fn anchored(source: &str) -> Regex {
    Regex::new(&format!("^(?:{})$", source)).expect("built-in shape pattern is valid")
}

static REALM_PATH_RE: Lazy<Regex> = Lazy::new(|| anchored(REALM_PATH));
static UUID_RE: Lazy<Regex> = Lazy::new(|| anchored(UUID));
static VERSION_HASH_RE: Lazy<Regex> = Lazy::new(|| anchored(VERSION_HASH));
static PATH_RE: Lazy<Regex> = Lazy::new(|| anchored(PATH));
static TRANSACTION_ID_RE: Lazy<Regex> = Lazy::new(|| anchored(TRANSACTION_ID_CHARSET));

pub fn is_realm_path(text: &str) -> bool {
    REALM_PATH_RE.is_match(text)
}

pub fn is_uuid(text: &str) -> bool {
    UUID_RE.is_match(text)
}

pub fn is_version_hash(text: &str) -> bool {
    VERSION_HASH_RE.is_match(text)
}

pub fn is_path(text: &str) -> bool {
    PATH_RE.is_match(text)
}

pub fn is_transaction_id_charset(text: &str) -> bool {
    TRANSACTION_ID_RE.is_match(text)
}

/// Lowercase or uppercase hex, non-empty.
pub fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_hexdigit())
}
