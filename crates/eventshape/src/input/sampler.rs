//! Bounded per-parameter sampling of a batch source.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{Batch, BatchSource};
use crate::config::ShapeConfig;
use crate::error::Result;

/// Collects at most `sample_size` values per parameter with reservoir
/// sampling, so memory stays bounded however large the source is.
///
/// The reservoir is driven by a seeded generator: the same source and
/// seed always yield the same sample.
#[derive(Debug, Clone)]
pub struct SampleCollector {
    sample_size: usize,
    seed: u64,
}

#[derive(Debug)]
struct Reservoir {
    values: Vec<Value>,
    seen: usize,
}

impl SampleCollector {
    /// Create a collector keeping `sample_size` values (minimum 1) per parameter.
    pub fn new(sample_size: usize, seed: u64) -> Self {
        Self {
            sample_size: sample_size.max(1),
            seed,
        }
    }

    /// Create a collector from a configuration.
    pub fn with_config(config: &ShapeConfig) -> Self {
        Self::new(config.sample_size, config.sample_seed)
    }

    /// Sample every parameter of `source`, in first-seen order.
    #[instrument(level = "debug", skip(self, source), fields(source = %source.describe()))]
    pub fn collect(&self, source: &dyn BatchSource) -> Result<IndexMap<String, Vec<Value>>> {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let mut reservoirs: IndexMap<String, Reservoir> = IndexMap::new();
        let mut batches = 0usize;

        for batch in source.batches()? {
            self.add_batch(&mut rng, &mut reservoirs, batch?);
            batches += 1;
        }

        debug!(batches, parameters = reservoirs.len(), "sampled source");

        Ok(reservoirs
            .into_iter()
            .map(|(name, reservoir)| (name, reservoir.values))
            .collect())
    }

    fn add_batch(
        &self,
        rng: &mut fastrand::Rng,
        reservoirs: &mut IndexMap<String, Reservoir>,
        batch: Batch,
    ) {
        for (name, values) in batch {
            let reservoir = reservoirs.entry(name).or_insert_with(|| Reservoir {
                values: Vec::with_capacity(self.sample_size.min(1024)),
                seen: 0,
            });

            for value in values {
                reservoir.seen += 1;
                if reservoir.values.len() < self.sample_size {
                    reservoir.values.push(value);
                } else {
                    // Replace with decreasing probability.
                    let j = rng.usize(0..reservoir.seen);
                    if j < self.sample_size {
                        reservoir.values[j] = value;
                    }
                }
            }
        }
    }
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::with_config(&ShapeConfig::default())
    }
}
