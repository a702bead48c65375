//! Chunked validation of batches against a rule set.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::cache::VerdictCache;
use super::rule::{RuleSet, ValidationRule};
use crate::config::ShapeConfig;
use crate::error::Result;
use crate::input::{Batch, BatchSource};

/// Pass/fail tally for one parameter over one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Parameter name.
    pub parameter: String,
    /// Validator kind label of the rule applied.
    pub validator: String,
    /// The rule came from a weak inference.
    #[serde(default)]
    pub low_confidence: bool,
    /// Values checked.
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// `passed / total`, or 1.0 when nothing was checked.
    pub pass_rate: f64,
    /// No values were checked.
    #[serde(default)]
    pub zero_sample: bool,
    /// First failing raw values, in the order seen.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failing_samples: Vec<Value>,
}

impl ValidationResult {
    /// A result with nothing checked yet.
    pub fn empty(rule: &ValidationRule) -> Self {
        Self {
            parameter: rule.parameter.clone(),
            validator: rule.kind().to_string(),
            low_confidence: rule.low_confidence,
            total: 0,
            passed: 0,
            failed: 0,
            pass_rate: 1.0,
            zero_sample: true,
            failing_samples: Vec::new(),
        }
    }

    /// A result for a parameter that has no counterpart on one side.
    pub fn missing(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            validator: String::new(),
            low_confidence: false,
            total: 0,
            passed: 0,
            failed: 0,
            pass_rate: 1.0,
            zero_sample: true,
            failing_samples: Vec::new(),
        }
    }

    fn record(&mut self, value: &Value, passed: bool, sample_cap: usize) {
        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
            if self.failing_samples.len() < sample_cap {
                self.failing_samples.push(value.clone());
            }
        }
        self.pass_rate = self.passed as f64 / self.total as f64;
        self.zero_sample = false;
    }
}

/// Applies a rule set to batches, one batch at a time.
///
/// Results are owned by a single `validate_*` call, so an engine can be
/// reused for the old and new versions.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    diagnostic_sample_cap: usize,
    cache_capacity: usize,
}

impl ValidationEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::with_config(&ShapeConfig::default())
    }

    /// Create an engine from a configuration.
    pub fn with_config(config: &ShapeConfig) -> Self {
        Self {
            diagnostic_sample_cap: config.diagnostic_sample_cap,
            cache_capacity: config.cache_capacity,
        }
    }

    /// Validate in-memory batches.
    pub fn validate_batches<I>(&self, rules: &RuleSet, batches: I) -> IndexMap<String, ValidationResult>
    where
        I: IntoIterator<Item = Batch>,
    {
        let mut run = Run::new(rules, self.cache_capacity);
        for batch in batches {
            run.validate_batch(rules, &batch, self.diagnostic_sample_cap);
        }
        run.finish()
    }

    /// Validate a source. Source errors propagate; bad values only fail rules.
    #[instrument(level = "debug", skip(self, rules, source), fields(source = %source.describe(), rules = rules.len()))]
    pub fn validate_source(
        &self,
        rules: &RuleSet,
        source: &dyn BatchSource,
    ) -> Result<IndexMap<String, ValidationResult>> {
        let mut run = Run::new(rules, self.cache_capacity);
        for batch in source.batches()? {
            run.validate_batch(rules, &batch?, self.diagnostic_sample_cap);
        }
        Ok(run.finish())
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one validation pass.
struct Run {
    results: IndexMap<String, ValidationResult>,
    caches: IndexMap<String, VerdictCache>,
    batches: usize,
}

impl Run {
    fn new(rules: &RuleSet, cache_capacity: usize) -> Self {
        let results = rules
            .iter()
            .map(|rule| (rule.parameter.clone(), ValidationResult::empty(rule)))
            .collect();
        let caches = rules
            .iter()
            .filter(|rule| cache_capacity > 0 && rule.validator.is_memoizable())
            .map(|rule| (rule.parameter.clone(), VerdictCache::new(cache_capacity)))
            .collect();
        Self {
            results,
            caches,
            batches: 0,
        }
    }

    fn validate_batch(&mut self, rules: &RuleSet, batch: &Batch, sample_cap: usize) {
        self.batches += 1;
        for rule in rules.iter() {
            let Some(values) = batch.get(&rule.parameter) else {
                continue;
            };
            let Some(result) = self.results.get_mut(&rule.parameter) else {
                continue;
            };
            let mut cache = self.caches.get_mut(&rule.parameter);

            for value in values {
                // Only text needs parsing, so only text verdicts are memoized.
                let passed = match (cache.as_deref_mut(), value) {
                    (Some(cache), Value::String(text)) => {
                        cache.get_or_insert_with(text, || rule.validate(value))
                    }
                    _ => rule.validate(value),
                };
                result.record(value, passed, sample_cap);
            }
        }
    }

    fn finish(self) -> IndexMap<String, ValidationResult> {
        for (parameter, cache) in &self.caches {
            let (hits, misses) = cache.stats();
            debug!(parameter = %parameter, hits, misses, "verdict cache");
        }
        debug!(batches = self.batches, parameters = self.results.len(), "validation finished");
        self.results
    }
}
