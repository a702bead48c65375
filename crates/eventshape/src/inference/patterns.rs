//! Recurring string shapes for the formatted-string classifier.
//!
//! Named shapes are tried first, in a fixed order. When none of them covers
//! enough of the sample, a shape is derived from character classes: each
//! value is reduced to runs of digits, lowercase, uppercase and literal
//! characters, values are grouped by run sequence, and the dominant group
//! becomes a regex with each run's length widened to the observed range.

use indexmap::IndexMap;

use crate::schema::PatternKind;
use crate::value::shapes;

// Derived shapes longer than this are treated as free text.
const MAX_DERIVED_RUNS: usize = 32;

// Shorter hex strings are too easily confused with words and codes.
const MIN_HEX_LENGTH: usize = 8;

/// A shape and how much of the sample it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMatch {
    pub kind: PatternKind,
    /// Regex source, without anchors.
    pub pattern: String,
    pub ratio: f64,
}

/// Find the first shape covering at least `threshold` of `total` values.
///
/// `texts` are the string values of the sample; `total` also counts
/// non-string values, which never match. When no shape reaches the
/// threshold the best-covering one is returned so callers can report it.
pub fn infer_shape(texts: &[&str], total: usize, threshold: f64) -> Option<ShapeMatch> {
    if texts.is_empty() || total == 0 {
        return None;
    }

    let ratio_of = |count: usize| count as f64 / total as f64;
    let mut best: Option<ShapeMatch> = None;

    let mut consider = |candidate: ShapeMatch| -> Option<ShapeMatch> {
        if candidate.ratio >= threshold {
            return Some(candidate);
        }
        if best.as_ref().map(|b| candidate.ratio > b.ratio).unwrap_or(true) {
            best = Some(candidate);
        }
        None
    };

    let named: [(PatternKind, &str, fn(&str) -> bool); 3] = [
        (PatternKind::RealmPath, shapes::REALM_PATH, shapes::is_realm_path),
        (PatternKind::Uuid, shapes::UUID, shapes::is_uuid),
        (PatternKind::VersionHash, shapes::VERSION_HASH, shapes::is_version_hash),
    ];
    for (kind, pattern, matches) in named {
        let count = texts.iter().filter(|t| matches(t)).count();
        if count == 0 {
            continue;
        }
        let found = consider(ShapeMatch {
            kind,
            pattern: pattern.to_string(),
            ratio: ratio_of(count),
        });
        if found.is_some() {
            return found;
        }
    }

    if let Some(hex) = fixed_length_hex(texts, total) {
        if let Some(found) = consider(hex) {
            return Some(found);
        }
    }

    let path_count = texts.iter().filter(|t| shapes::is_path(t)).count();
    if path_count > 0 {
        let found = consider(ShapeMatch {
            kind: PatternKind::Path,
            pattern: shapes::PATH.to_string(),
            ratio: ratio_of(path_count),
        });
        if found.is_some() {
            return found;
        }
    }

    if let Some(derived) = derive_shape(texts, total) {
        if let Some(found) = consider(derived) {
            return Some(found);
        }
    }

    best
}

/// Hex strings sharing the most common length.
fn fixed_length_hex(texts: &[&str], total: usize) -> Option<ShapeMatch> {
    let mut by_length: IndexMap<usize, Vec<&str>> = IndexMap::new();
    for text in texts.iter().copied().filter(|t| shapes::is_hex(t)) {
        by_length.entry(text.len()).or_default().push(text);
    }

    let (length, members) = by_length
        .into_iter()
        .filter(|(length, _)| *length >= MIN_HEX_LENGTH)
        .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(&a.0)))?;

    // Strings of only digits are valid hex but say nothing about the alphabet.
    let letters: Vec<char> = members
        .iter()
        .flat_map(|t| t.chars())
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    let class = if letters.iter().all(|c| c.is_ascii_lowercase()) {
        "[0-9a-f]"
    } else if letters.iter().all(|c| c.is_ascii_uppercase()) {
        "[0-9A-F]"
    } else {
        "[0-9a-fA-F]"
    };

    let count = members.len();
    Some(ShapeMatch {
        kind: PatternKind::Hex,
        pattern: format!("{}{{{}}}", class, length),
        ratio: count as f64 / total as f64,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CharClass {
    Digit,
    Lower,
    Upper,
    Literal(char),
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_digit() {
            CharClass::Digit
        } else if c.is_ascii_lowercase() {
            CharClass::Lower
        } else if c.is_ascii_uppercase() {
            CharClass::Upper
        } else {
            CharClass::Literal(c)
        }
    }

    fn regex(&self) -> String {
        match self {
            CharClass::Digit => "[0-9]".to_string(),
            CharClass::Lower => "[a-z]".to_string(),
            CharClass::Upper => "[A-Z]".to_string(),
            CharClass::Literal(c) => regex::escape(&c.to_string()),
        }
    }
}

/// Reduce a string to its run sequence.
fn runs(text: &str) -> Vec<(CharClass, usize)> {
    let mut runs: Vec<(CharClass, usize)> = Vec::new();
    for c in text.chars() {
        let class = CharClass::of(c);
        match runs.last_mut() {
            Some((last, len)) if *last == class => *len += 1,
            _ => runs.push((class, 1)),
        }
    }
    runs
}

/// Shape of the dominant run-sequence group.
fn derive_shape(texts: &[&str], total: usize) -> Option<ShapeMatch> {
    // class sequence -> per-run (min, max) lengths and member count
    let mut groups: IndexMap<Vec<CharClass>, (Vec<(usize, usize)>, usize)> = IndexMap::new();

    for text in texts {
        let text_runs = runs(text);
        if text_runs.len() < 2 || text_runs.len() > MAX_DERIVED_RUNS {
            continue;
        }
        let classes: Vec<CharClass> = text_runs.iter().map(|(class, _)| *class).collect();
        let entry = groups
            .entry(classes)
            .or_insert_with(|| (text_runs.iter().map(|(_, len)| (*len, *len)).collect(), 0));
        for (bounds, (_, len)) in entry.0.iter_mut().zip(text_runs.iter()) {
            bounds.0 = bounds.0.min(*len);
            bounds.1 = bounds.1.max(*len);
        }
        entry.1 += 1;
    }

    // First-seen group wins ties so the result does not depend on hashing.
    let (classes, (bounds, count)) = groups
        .into_iter()
        .rev()
        .max_by_key(|(_, (_, count))| *count)?;

    let pattern: String = classes
        .iter()
        .zip(bounds.iter())
        .map(|(class, (min, max))| {
            if *min == 1 && *max == 1 {
                class.regex()
            } else if min == max {
                format!("{}{{{}}}", class.regex(), min)
            } else {
                format!("{}{{{},{}}}", class.regex(), min, max)
            }
        })
        .collect();

    Some(ShapeMatch {
        kind: PatternKind::Derived,
        pattern,
        ratio: count as f64 / total as f64,
    })
}
