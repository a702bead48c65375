//! Comparison report between two versions.
//!
//! The report pairs the old and new validation results of every parameter
//! and derives a status from their pass rates. The thresholds that drive
//! the status are carried in the report so it can be read on its own.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ShapeConfig;
use crate::validation::ValidationResult;

// Pass rates are ratios of counts; absorb rounding at the boundaries.
const EPSILON: f64 = 1e-9;

/// Compatibility status of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterStatus {
    /// New version conforms as well as the old one.
    Consistent,
    /// New version conforms noticeably less, but mostly.
    Degraded,
    /// New version largely fails the old shape.
    Broken,
    /// Only the new version carries the parameter.
    NewParameter,
    /// Only the old version carries the parameter.
    RemovedParameter,
}

impl ParameterStatus {
    /// Label as it appears in serialized reports.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterStatus::Consistent => "CONSISTENT",
            ParameterStatus::Degraded => "DEGRADED",
            ParameterStatus::Broken => "BROKEN",
            ParameterStatus::NewParameter => "NEW_PARAMETER",
            ParameterStatus::RemovedParameter => "REMOVED_PARAMETER",
        }
    }
}

impl fmt::Display for ParameterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pass-rate thresholds for status classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportThresholds {
    /// Pass rate the new version must reach to be consistent.
    pub acceptance_pass_rate: f64,
    /// New pass rates below this (and beyond the tolerance) are broken.
    pub degraded_cutoff: f64,
    /// Allowed drop from the old pass rate.
    pub pass_rate_tolerance: f64,
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self::from(&ShapeConfig::default())
    }
}

impl From<&ShapeConfig> for ReportThresholds {
    fn from(config: &ShapeConfig) -> Self {
        Self {
            acceptance_pass_rate: config.acceptance_pass_rate,
            degraded_cutoff: config.degraded_cutoff,
            pass_rate_tolerance: config.pass_rate_tolerance,
        }
    }
}

impl ReportThresholds {
    /// Status for a pair of results.
    ///
    /// Presence is decided by value counts: a side that checked no values
    /// did not carry the parameter.
    pub fn classify(&self, old: &ValidationResult, new: &ValidationResult) -> ParameterStatus {
        match (old.total > 0, new.total > 0) {
            (true, false) => return ParameterStatus::RemovedParameter,
            (false, true) => return ParameterStatus::NewParameter,
            _ => {}
        }

        let floor = old.pass_rate - self.pass_rate_tolerance;
        let new_rate = new.pass_rate;

        if new_rate + EPSILON >= self.acceptance_pass_rate && new_rate + EPSILON >= floor {
            ParameterStatus::Consistent
        } else if new_rate <= 0.0
            || (new_rate + EPSILON < self.degraded_cutoff && new_rate + EPSILON < floor)
        {
            ParameterStatus::Broken
        } else {
            ParameterStatus::Degraded
        }
    }
}

/// One parameter's old and new results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterComparison {
    pub parameter: String,
    pub status: ParameterStatus,
    /// Validator kind label, from whichever side applied a rule.
    pub validator: String,
    /// The rule behind the results came from a weak inference.
    pub low_confidence: bool,
    /// New pass rate minus old pass rate.
    pub pass_rate_delta: f64,
    pub old: ValidationResult,
    pub new: ValidationResult,
}

/// Status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub consistent: usize,
    pub degraded: usize,
    pub broken: usize,
    pub new_parameters: usize,
    pub removed_parameters: usize,
    pub low_confidence: usize,
}

impl ReportSummary {
    fn add(&mut self, comparison: &ParameterComparison) {
        self.total += 1;
        match comparison.status {
            ParameterStatus::Consistent => self.consistent += 1,
            ParameterStatus::Degraded => self.degraded += 1,
            ParameterStatus::Broken => self.broken += 1,
            ParameterStatus::NewParameter => self.new_parameters += 1,
            ParameterStatus::RemovedParameter => self.removed_parameters += 1,
        }
        if comparison.low_confidence {
            self.low_confidence += 1;
        }
    }
}

/// Per-parameter comparison of two versions. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Comparisons keyed by parameter: old-version order, then new-only parameters.
    pub parameters: IndexMap<String, ParameterComparison>,
    pub summary: ReportSummary,
    pub thresholds: ReportThresholds,
    pub generated_at: DateTime<Utc>,
}

impl ComparisonReport {
    pub fn get(&self, parameter: &str) -> Option<&ParameterComparison> {
        self.parameters.get(parameter)
    }

    /// Status of a parameter, if it appears in the report.
    pub fn status(&self, parameter: &str) -> Option<ParameterStatus> {
        self.get(parameter).map(|c| c.status)
    }

    /// Comparisons with a given status, in report order.
    pub fn with_status(&self, status: ParameterStatus) -> impl Iterator<Item = &ParameterComparison> {
        self.parameters.values().filter(move |c| c.status == status)
    }

    /// Any parameter is broken.
    pub fn has_broken(&self) -> bool {
        self.summary.broken > 0
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds a `ComparisonReport` from two result maps.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    thresholds: ReportThresholds,
}

impl ReportBuilder {
    pub fn new(thresholds: ReportThresholds) -> Self {
        Self { thresholds }
    }

    /// Pair results by parameter. A side missing a parameter counts as empty.
    pub fn build(
        &self,
        old: &IndexMap<String, ValidationResult>,
        new: &IndexMap<String, ValidationResult>,
    ) -> ComparisonReport {
        let names = old
            .keys()
            .chain(new.keys().filter(|name| !old.contains_key(*name)));

        let mut parameters = IndexMap::new();
        let mut summary = ReportSummary::default();

        for name in names {
            let old_result = old
                .get(name)
                .cloned()
                .unwrap_or_else(|| ValidationResult::missing(name.as_str()));
            let new_result = new
                .get(name)
                .cloned()
                .unwrap_or_else(|| ValidationResult::missing(name.as_str()));

            let status = self.thresholds.classify(&old_result, &new_result);
            let validator = if old_result.validator.is_empty() {
                new_result.validator.clone()
            } else {
                old_result.validator.clone()
            };

            let comparison = ParameterComparison {
                parameter: name.clone(),
                status,
                validator,
                low_confidence: old_result.low_confidence || new_result.low_confidence,
                pass_rate_delta: new_result.pass_rate - old_result.pass_rate,
                old: old_result,
                new: new_result,
            };
            summary.add(&comparison);
            parameters.insert(name.clone(), comparison);
        }

        ComparisonReport {
            parameters,
            summary,
            thresholds: self.thresholds,
            generated_at: Utc::now(),
        }
    }
}
