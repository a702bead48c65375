//! Run configuration.

use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapeError};

/// Configuration consumed by the analyzer, generator, engine and report builder.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// confidence_threshold = 0.9
/// chunk_size = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Minimum match ratio a classifier needs to win (inclusive).
    pub confidence_threshold: f64,
    /// Absolute distinct-value ceiling for fixed-set inference.
    pub fixed_set_max_distinct: usize,
    /// Relative distinct-value ceiling (fraction of non-null sample size).
    pub fixed_set_max_ratio: f64,
    /// Numeric bounds are widened by this fraction of the observed spread.
    pub numeric_range_headroom: f64,
    /// Rows per batch when a source chunks its input.
    pub chunk_size: usize,
    /// Pass rate both versions must reach to be consistent.
    pub acceptance_pass_rate: f64,
    /// New-version pass rates below this are broken rather than degraded.
    pub degraded_cutoff: f64,
    /// Allowed pass-rate drop between versions that still counts as consistent.
    pub pass_rate_tolerance: f64,
    /// Failing raw values retained per result.
    pub diagnostic_sample_cap: usize,
    /// First calendar year accepted for epoch timestamps.
    pub min_timestamp_year: i32,
    /// Last calendar year accepted for epoch and ISO timestamps.
    pub max_timestamp_year: i32,
    /// Values kept per parameter when sampling a source for analysis.
    pub sample_size: usize,
    /// Seed for the sampling reservoir.
    pub sample_seed: u64,
    /// Fewer non-null values than this yields an insufficient-data profile.
    pub min_sample_size: usize,
    /// Entries in each memoization cache of the validation engine; 0 disables memoization.
    pub cache_capacity: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            fixed_set_max_distinct: 20,
            fixed_set_max_ratio: 0.05,
            numeric_range_headroom: 0.1,
            chunk_size: 1000,
            acceptance_pass_rate: 0.95,
            degraded_cutoff: 0.70,
            pass_rate_tolerance: 0.05,
            diagnostic_sample_cap: 20,
            min_timestamp_year: 2020,
            max_timestamp_year: 2030,
            sample_size: 10_000,
            sample_seed: 42,
            min_sample_size: 1,
            cache_capacity: 1024,
        }
    }
}

impl ShapeConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ShapeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file and validate it.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ShapeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the classifier confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the absolute fixed-set cardinality ceiling.
    pub fn with_fixed_set_max_distinct(mut self, max: usize) -> Self {
        self.fixed_set_max_distinct = max;
        self
    }

    /// Set the numeric range headroom.
    pub fn with_numeric_range_headroom(mut self, headroom: f64) -> Self {
        self.numeric_range_headroom = headroom;
        self
    }

    /// Set the batch size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the report thresholds.
    pub fn with_thresholds(mut self, acceptance: f64, degraded_cutoff: f64) -> Self {
        self.acceptance_pass_rate = acceptance;
        self.degraded_cutoff = degraded_cutoff;
        self
    }

    /// Set the diagnostic sample cap.
    pub fn with_diagnostic_sample_cap(mut self, cap: usize) -> Self {
        self.diagnostic_sample_cap = cap;
        self
    }

    /// Set the analysis sample size.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the verdict cache capacity (0 turns memoization off).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Check the configuration for programmer errors.
    ///
    /// This is the only place the core fails for reasons other than I/O.
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("confidence_threshold", self.confidence_threshold),
            ("fixed_set_max_ratio", self.fixed_set_max_ratio),
            ("acceptance_pass_rate", self.acceptance_pass_rate),
            ("degraded_cutoff", self.degraded_cutoff),
            ("pass_rate_tolerance", self.pass_rate_tolerance),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ShapeError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if !self.numeric_range_headroom.is_finite() || self.numeric_range_headroom < 0.0 {
            return Err(ShapeError::Config(format!(
                "numeric_range_headroom must be a non-negative number, got {}",
                self.numeric_range_headroom
            )));
        }
        if self.degraded_cutoff > self.acceptance_pass_rate {
            return Err(ShapeError::Config(format!(
                "degraded_cutoff ({}) cannot exceed acceptance_pass_rate ({})",
                self.degraded_cutoff, self.acceptance_pass_rate
            )));
        }
        if self.chunk_size == 0 {
            return Err(ShapeError::Config("chunk_size must be positive".to_string()));
        }
        if self.sample_size == 0 {
            return Err(ShapeError::Config("sample_size must be positive".to_string()));
        }
        if self.min_timestamp_year >= self.max_timestamp_year {
            return Err(ShapeError::Config(format!(
                "min_timestamp_year ({}) must be before max_timestamp_year ({})",
                self.min_timestamp_year, self.max_timestamp_year
            )));
        }
        let horizon_year = self.max_timestamp_year.checked_add(1);
        if NaiveDate::from_ymd_opt(self.min_timestamp_year, 1, 1).is_none()
            || horizon_year.and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)).is_none()
        {
            return Err(ShapeError::Config(
                "timestamp years are outside the supported calendar".to_string(),
            ));
        }

        Ok(())
    }

    /// Epoch seconds window `[start of min year, start of the year after max year)`.
    ///
    /// The upper bound doubles as the ISO horizon. Years outside the calendar
    /// clamp to the ends of the epoch range.
    pub fn epoch_window(&self) -> (i64, i64) {
        (
            year_start_epoch(self.min_timestamp_year),
            year_start_epoch(self.max_timestamp_year.saturating_add(1)),
        )
    }
}

fn year_start_epoch(year: i32) -> i64 {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or(if year < 1970 { i64::MIN } else { i64::MAX })
}
