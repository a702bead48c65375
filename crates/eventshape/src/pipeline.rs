//! Main EventShape struct and public API.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{info, instrument};

use crate::config::ShapeConfig;
use crate::error::Result;
use crate::inference::TypeAnalyzer;
use crate::input::{self, BatchSource, SampleCollector};
use crate::report::{ComparisonReport, ReportBuilder, ReportThresholds};
use crate::schema::ParameterProfile;
use crate::validation::{RuleGenerator, RuleSet, ValidationEngine, ValidationResult};

/// Wires sampling, inference, rule generation, validation and reporting.
#[derive(Debug, Clone)]
pub struct EventShape {
    config: ShapeConfig,
    collector: SampleCollector,
    analyzer: TypeAnalyzer,
    generator: RuleGenerator,
    engine: ValidationEngine,
    report_builder: ReportBuilder,
}

impl EventShape {
    /// Create an instance with the default configuration.
    pub fn new() -> Self {
        Self::build(ShapeConfig::default())
    }

    /// Create an instance from a configuration, rejecting invalid ones
    /// before any data is read.
    pub fn with_config(config: ShapeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ShapeConfig) -> Self {
        Self {
            collector: SampleCollector::with_config(&config),
            analyzer: TypeAnalyzer::with_config(&config),
            generator: RuleGenerator::with_config(&config),
            engine: ValidationEngine::with_config(&config),
            report_builder: ReportBuilder::new(ReportThresholds::from(&config)),
            config,
        }
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    /// Open a CSV/TSV or JSON lines file with the configured chunk size.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Box<dyn BatchSource>> {
        input::open(path, self.config.chunk_size)
    }

    /// Sample a source and profile every parameter.
    #[instrument(level = "debug", skip(self, source), fields(source = %source.describe()))]
    pub fn profile_source(
        &self,
        source: &dyn BatchSource,
    ) -> Result<IndexMap<String, ParameterProfile>> {
        let samples = self.collector.collect(source)?;
        Ok(self.analyzer.analyze_samples(&samples))
    }

    /// Generate a rule for every profile.
    pub fn generate_rules(&self, profiles: &IndexMap<String, ParameterProfile>) -> RuleSet {
        self.generator.generate_all(profiles)
    }

    /// Validate a source against a rule set.
    pub fn validate_source(
        &self,
        rules: &RuleSet,
        source: &dyn BatchSource,
    ) -> Result<IndexMap<String, ValidationResult>> {
        self.engine.validate_source(rules, source)
    }

    /// Pair two result maps into a report.
    pub fn build_report(
        &self,
        old: &IndexMap<String, ValidationResult>,
        new: &IndexMap<String, ValidationResult>,
    ) -> ComparisonReport {
        self.report_builder.build(old, new)
    }

    /// Infer rules for the parameters of both versions.
    ///
    /// Old-version profiles take precedence; parameters only the new version
    /// carries are profiled from the new sample so they can still be scored.
    pub fn infer_rules(&self, old: &dyn BatchSource, new: &dyn BatchSource) -> Result<RuleSet> {
        let mut profiles = self.profile_source(old)?;

        let new_samples = self.collector.collect(new)?;
        for (name, values) in &new_samples {
            if !profiles.contains_key(name) {
                profiles.insert(name.clone(), self.analyzer.analyze(name, values));
            }
        }

        Ok(self.generate_rules(&profiles))
    }

    /// Full comparison: infer rules from the old version, apply them to both.
    #[instrument(level = "info", skip_all, fields(old = %old.describe(), new = %new.describe()))]
    pub fn compare(&self, old: &dyn BatchSource, new: &dyn BatchSource) -> Result<ComparisonReport> {
        let rules = self.infer_rules(old, new)?;
        self.compare_with_rules(&rules, old, new)
    }

    /// Comparison with a supplied rule set.
    pub fn compare_with_rules(
        &self,
        rules: &RuleSet,
        old: &dyn BatchSource,
        new: &dyn BatchSource,
    ) -> Result<ComparisonReport> {
        let old_results = self.validate_source(rules, old)?;
        let new_results = self.validate_source(rules, new)?;
        let report = self.build_report(&old_results, &new_results);

        info!(
            parameters = report.summary.total,
            consistent = report.summary.consistent,
            degraded = report.summary.degraded,
            broken = report.summary.broken,
            "comparison complete"
        );

        Ok(report)
    }
}

impl Default for EventShape {
    fn default() -> Self {
        Self::new()
    }
}
