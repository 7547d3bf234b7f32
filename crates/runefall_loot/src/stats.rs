//! # Sampling Statistics
//!
//! A diagnostic helper for tuning table data: evaluate a table many times
//! under seeded randomness and count what came out. Useful for answering
//! "how rare is this drop really" without shipping the table first.

use crate::context::LootContext;
use crate::params::ParamSet;
use crate::registry::LootEnv;
use crate::table::LootTable;
use runefall_core::{ItemId, SeededRandom};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aggregated drop counts over repeated table evaluations.
#[derive(Clone, Debug, Default)]
pub struct LootStatistics {
    /// Number of evaluations performed.
    pub samples: u32,
    /// Total item stacks emitted across all samples.
    pub total_stacks: u64,
    /// Total item count per id across all samples.
    pub items_by_id: BTreeMap<ItemId, u64>,
}

impl LootStatistics {
    /// Evaluates `table` once per seed in `base_seed..base_seed + samples`,
    /// at the given luck, and tallies the output.
    ///
    /// Only tables with an empty parameter contract can be sampled this way;
    /// tables needing bound parameters want a hand-built context instead.
    #[must_use]
    pub fn sample(
        table: &Arc<LootTable>,
        env: &LootEnv,
        base_seed: u64,
        samples: u32,
        luck: f32,
    ) -> Self {
        if table.param_set != ParamSet::Empty {
            tracing::warn!("table requires bound parameters; statistics unavailable");
            return Self::default();
        }
        let mut stats = Self {
            samples,
            ..Self::default()
        };
        for offset in 0..u64::from(samples) {
            let Ok(mut ctx) = LootContext::builder(env)
                .with_random(SeededRandom::from_seed(base_seed.wrapping_add(offset)))
                .with_luck(luck)
                .build(table.param_set)
            else {
                return Self::default();
            };
            for stack in LootTable::collect_items(table, &mut ctx) {
                stats.total_stacks += 1;
                *stats.items_by_id.entry(stack.item_id).or_default() += u64::from(stack.count);
            }
        }
        stats
    }

    /// Total count of one item id across all samples.
    #[must_use]
    pub fn count_of(&self, item_id: ItemId) -> u64 {
        self.items_by_id.get(&item_id).copied().unwrap_or(0)
    }

    /// Mean count of one item id per evaluation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_per_sample(&self, item_id: ItemId) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.count_of(item_id) as f64 / f64::from(self.samples)
    }
}
