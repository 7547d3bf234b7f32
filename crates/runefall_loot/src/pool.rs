//! # Weighted Selection Pools
//!
//! The sampling heart of the engine. A pool rolls a context-dependent number
//! of times; each roll expands the entries into a flat candidate list and
//! draws one by cumulative-weight subtraction. A single surviving candidate
//! is selected without touching the random source at all - an invariant, not
//! an optimization, so single-candidate pools stay RNG-call-count stable.

use crate::context::{LootContext, StackConsumer};
use crate::entry::{Candidate, LootEntry};
use crate::function::LootFunction;
use crate::predicate::LootPredicate;
use crate::provider::NumberProvider;
use crate::validate::ValidationContext;
use runefall_core::ItemStack;
use serde::{Deserialize, Serialize};

/// One weighted-draw unit within a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootPool {
    /// Entries, in declaration order (the draw tie-breaks on it).
    pub entries: Vec<LootEntry>,
    /// Gate conditions for the whole pool.
    pub conditions: Vec<LootPredicate>,
    /// Transforms applied to every stack this pool emits.
    pub functions: Vec<LootFunction>,
    /// Base roll count.
    pub rolls: NumberProvider,
    /// Extra rolls per point of luck: the roll count gains
    /// `floor(bonus_rolls * luck)`.
    pub bonus_rolls: NumberProvider,
}

impl LootPool {
    /// Creates a pool with the given roll provider and no bonus rolls.
    #[must_use]
    pub fn new(rolls: NumberProvider) -> Self {
        Self {
            entries: Vec::new(),
            conditions: Vec::new(),
            functions: Vec::new(),
            rolls,
            bonus_rolls: NumberProvider::Constant(0.0),
        }
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: LootEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds a gate condition.
    #[must_use]
    pub fn with_condition(mut self, condition: LootPredicate) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds an item function.
    #[must_use]
    pub fn with_function(mut self, function: LootFunction) -> Self {
        self.functions.push(function);
        self
    }

    /// Sets the bonus-rolls provider.
    #[must_use]
    pub fn with_bonus_rolls(mut self, bonus_rolls: NumberProvider) -> Self {
        self.bonus_rolls = bonus_rolls;
        self
    }

    /// Rolls this pool and streams produced items into the consumer.
    ///
    /// When the pool conditions fail, nothing happens: no rolls, no draws,
    /// no side effects. Negative computed roll counts clamp to zero.
    pub fn add_random_items<'c>(
        &self,
        ctx: &mut LootContext<'c>,
        consumer: &mut StackConsumer<'_, 'c>,
    ) {
        if !LootPredicate::eval_all(&self.conditions, ctx) {
            return;
        }
        let mut decorated = |ctx: &mut LootContext<'c>, stack: ItemStack| {
            let stack = LootFunction::apply_all(&self.functions, stack, ctx);
            consumer(ctx, stack);
        };
        let base = self.rolls.as_i32(ctx);
        #[allow(clippy::cast_possible_truncation)]
        let bonus = (self.bonus_rolls.as_f32(ctx) * ctx.luck()).floor() as i32;
        let rolls = (base + bonus).max(0);
        for _ in 0..rolls {
            self.roll_once(ctx, &mut decorated);
        }
    }

    /// One independent draw: expand, then select by cumulative weight.
    fn roll_once<'c>(&self, ctx: &mut LootContext<'c>, consumer: &mut StackConsumer<'_, 'c>) {
        let mut candidates: Vec<Candidate<'_>> = Vec::new();
        let mut total_weight: u32 = 0;
        for entry in &self.entries {
            let _ = entry.expand(ctx, &mut |candidate| {
                total_weight = total_weight.saturating_add(candidate.weight());
                candidates.push(candidate);
            });
        }
        match candidates.len() {
            // A roll with nothing to draw silently produces nothing.
            0 => {}
            // Exactly one candidate: selected without consuming a draw.
            1 => candidates[0].create_items(ctx, consumer),
            _ => {
                if total_weight == 0 {
                    return;
                }
                let mut remaining = i64::from(ctx.random().next_bounded(total_weight));
                for candidate in &candidates {
                    remaining -= i64::from(candidate.weight());
                    if remaining < 0 {
                        candidate.create_items(ctx, consumer);
                        return;
                    }
                }
            }
        }
    }

    /// Reports structural problems without aborting the traversal.
    pub fn validate(&self, ctx: &ValidationContext<'_>) {
        self.rolls.validate(&ctx.for_child(".rolls"));
        self.bonus_rolls.validate(&ctx.for_child(".bonus_rolls"));
        for (i, condition) in self.conditions.iter().enumerate() {
            condition.validate(&ctx.for_child(&format!(".conditions[{i}]")));
        }
        for (i, function) in self.functions.iter().enumerate() {
            function.validate(&ctx.for_child(&format!(".functions[{i}]")));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            entry.validate(&ctx.for_child(&format!(".entries[{i}]")));
        }
    }
}
