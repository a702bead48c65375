//! Type and constraint inference for parameter samples.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use super::classifiers::{self, ClassifierContext, BATTERY, NUMERIC_REFINEMENTS};
use crate::config::ShapeConfig;
use crate::schema::{
    Candidate, Constraints, EpochWindow, InferredType, NumericRange, ParameterProfile,
};
use crate::value;

// Lists of lists are not profiled further.
const MAX_LIST_DEPTH: usize = 1;

/// Infers a `ParameterProfile` from a sample of raw values.
///
/// The analyzer is a pure function of the sample and its configuration:
/// the same sample always yields the same profile.
#[derive(Debug, Clone)]
pub struct TypeAnalyzer {
    context: ClassifierContext,
    numeric_range_headroom: f64,
    min_sample_size: usize,
}

impl TypeAnalyzer {
    /// Create an analyzer with default settings.
    pub fn new() -> Self {
        Self::with_config(&ShapeConfig::default())
    }

    /// Create an analyzer from a configuration.
    pub fn with_config(config: &ShapeConfig) -> Self {
        let (epoch_start, epoch_end) = config.epoch_window();
        Self {
            context: ClassifierContext {
                epoch_start,
                epoch_end,
                fixed_set_max_distinct: config.fixed_set_max_distinct,
                fixed_set_max_ratio: config.fixed_set_max_ratio,
                confidence_threshold: config.confidence_threshold,
            },
            numeric_range_headroom: config.numeric_range_headroom,
            min_sample_size: config.min_sample_size.max(1),
        }
    }

    /// Profile every parameter of a sample map, preserving its order.
    pub fn analyze_samples(
        &self,
        samples: &IndexMap<String, Vec<Value>>,
    ) -> IndexMap<String, ParameterProfile> {
        samples
            .iter()
            .map(|(name, values)| (name.clone(), self.analyze(name, values)))
            .collect()
    }

    /// Profile one parameter.
    #[instrument(level = "debug", skip(self, sample), fields(sample_size = sample.len()))]
    pub fn analyze(&self, name: &str, sample: &[Value]) -> ParameterProfile {
        self.analyze_at_depth(name, sample, 0)
    }

    fn analyze_at_depth(&self, name: &str, sample: &[Value], depth: usize) -> ParameterProfile {
        let (nulls, non_null): (Vec<&Value>, Vec<&Value>) =
            sample.iter().partition(|v| value::is_null(v));
        let null_count = nulls.len();

        if non_null.len() < self.min_sample_size {
            debug!(parameter = name, non_null = non_null.len(), "insufficient data");
            return ParameterProfile::insufficient(name, sample.len(), null_count);
        }

        let mut candidates = Vec::new();
        let mut winner = None;
        for inferred_type in BATTERY {
            let ratio = self.context.match_ratio(inferred_type, &non_null);
            trace!(parameter = name, %inferred_type, ratio, "classifier");
            candidates.push(Candidate {
                inferred_type,
                match_ratio: ratio,
            });
            if ratio >= self.context.confidence_threshold {
                winner = Some((inferred_type, ratio));
                break;
            }
        }

        let (inferred_type, confidence) = match winner {
            Some((InferredType::Numeric, ratio)) => {
                self.refine_numeric(ratio, &non_null, &mut candidates)
            }
            Some(found) => found,
            None => {
                let ratio = self.context.match_ratio(InferredType::FreeString, &non_null);
                candidates.push(Candidate {
                    inferred_type: InferredType::FreeString,
                    match_ratio: ratio,
                });
                (InferredType::FreeString, ratio)
            }
        };

        let mut constraints = self.extract(name, inferred_type, &non_null, depth);
        constraints.null_allowed = null_count > 0;

        debug!(parameter = name, %inferred_type, confidence, "inferred");

        ParameterProfile {
            name: name.to_string(),
            inferred_type,
            constraints,
            confidence,
            sample_size: sample.len(),
            null_count,
            insufficient_data: false,
            candidates,
        }
    }

    /// Numbers that are really epoch timestamps or enumerations.
    fn refine_numeric(
        &self,
        numeric_ratio: f64,
        values: &[&Value],
        candidates: &mut Vec<Candidate>,
    ) -> (InferredType, f64) {
        for refined in NUMERIC_REFINEMENTS {
            let ratio = self.context.match_ratio(refined, values);
            candidates.push(Candidate {
                inferred_type: refined,
                match_ratio: ratio,
            });
            if ratio >= self.context.confidence_threshold {
                return (refined, ratio);
            }
        }

        if self.context.fixed_set_values(values).is_some() {
            candidates.push(Candidate {
                inferred_type: InferredType::FixedSet,
                match_ratio: 1.0,
            });
            return (InferredType::FixedSet, 1.0);
        }

        (InferredType::Numeric, numeric_ratio)
    }

    fn extract(
        &self,
        name: &str,
        inferred_type: InferredType,
        values: &[&Value],
        depth: usize,
    ) -> Constraints {
        let mut constraints = Constraints::default();

        match inferred_type {
            InferredType::Numeric => {
                constraints.range = self.numeric_range(values);
            }
            InferredType::TimestampIso => {
                constraints.epoch_window = Some(EpochWindow {
                    min_epoch: None,
                    max_epoch: Some(self.context.epoch_end.saturating_sub(1)),
                });
            }
            InferredType::TimestampUnixSeconds | InferredType::TimestampUnixMillis => {
                constraints.epoch_window = Some(EpochWindow {
                    min_epoch: Some(self.context.epoch_start),
                    max_epoch: Some(self.context.epoch_end.saturating_sub(1)),
                });
            }
            InferredType::Json => {
                let objects: Vec<_> = values
                    .iter()
                    .filter_map(|v| value::as_objects(v))
                    .flatten()
                    .collect();
                constraints.json_shape = Some(classifiers::infer_json_shape(&objects));
            }
            InferredType::List => {
                if depth < MAX_LIST_DEPTH {
                    let items: Vec<Value> = values
                        .iter()
                        .filter_map(|v| value::parse_list(v))
                        .flatten()
                        .collect();
                    let item_name = format!("{}[]", name);
                    constraints.list_items =
                        Some(Box::new(self.analyze_at_depth(&item_name, &items, depth + 1)));
                }
            }
            InferredType::FixedSet => {
                constraints.allowed_values = self.context.fixed_set_values(values);
            }
            InferredType::FormattedString => {
                if let Some(shape) = self.context.shape(values) {
                    constraints.pattern = Some(shape.pattern);
                    constraints.pattern_kind = Some(shape.kind);
                }
            }
            InferredType::FreeString => {}
        }

        constraints
    }

    /// Observed bounds widened by the headroom fraction of the spread.
    fn numeric_range(&self, values: &[&Value]) -> Option<NumericRange> {
        let (min, max) = values
            .iter()
            .filter_map(|v| value::as_number(v))
            .fold(None, |acc: Option<(f64, f64)>, n| match acc {
                Some((min, max)) => Some((min.min(n), max.max(n))),
                None => Some((n, n)),
            })?;

        let margin = (max - min) * self.numeric_range_headroom;
        Some(NumericRange::new(min - margin, max + margin))
    }
}

impl Default for TypeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
