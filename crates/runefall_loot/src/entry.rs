//! # Loot Entries
//!
//! An entry is a node that expands into zero or more weighted candidates
//! under a context. Leaves produce a single candidate (an item, nothing, a
//! nested table, or a dynamic drop); composites group, alternate, or
//! sequence their children. Entry order is semantically significant: the
//! weighted draw tie-breaks on declaration order, so candidates are always
//! collected into an ordered list.

use crate::context::{LootContext, StackConsumer};
use crate::function::LootFunction;
use crate::predicate::LootPredicate;
use crate::registry::{DropKey, TableKey};
use crate::table::LootTable;
use crate::validate::ValidationContext;
use runefall_core::{ItemId, ItemStack};
use serde::{Deserialize, Serialize};

/// What a leaf entry emits once selected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LeafPayload {
    /// A single item of the given type (count 1 before functions run).
    Item(ItemId),
    /// Nothing; used to weight "no drop" into a pool.
    Empty,
    /// A nested loot table resolved by key; its output flows through this
    /// entry's functions.
    TableRef(TableKey),
    /// An externally-registered drop callback resolved from the context.
    Dynamic(DropKey),
}

/// A weighted leaf: payload plus the gates and transforms around it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafEntry {
    /// What selection produces.
    pub payload: LeafPayload,
    /// Base selection weight.
    pub weight: u32,
    /// Luck coefficient: effective weight is
    /// `max(weight + floor(quality * luck), 0)`.
    pub quality: f32,
    /// Gate conditions (AND-composed).
    pub conditions: Vec<LootPredicate>,
    /// Transforms applied to every stack this entry emits.
    pub functions: Vec<LootFunction>,
}

impl LeafEntry {
    #[allow(clippy::cast_possible_truncation)]
    fn effective_weight(&self, luck: f32) -> u32 {
        let bonus = (self.quality * luck).floor() as i64;
        #[allow(clippy::cast_sign_loss)]
        let weight = i64::from(self.weight)
            .saturating_add(bonus)
            .clamp(0, i64::from(u32::MAX)) as u32;
        weight
    }
}

/// A node in the entry tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LootEntry {
    /// A weighted leaf.
    Leaf(LeafEntry),
    /// Expands every child whose conditions pass.
    Group {
        /// Child entries, in declaration order.
        children: Vec<LootEntry>,
        /// Gate conditions for the whole group.
        conditions: Vec<LootPredicate>,
    },
    /// Expands children in order until one succeeds, then stops.
    Alternatives {
        /// Child entries, in declaration order.
        children: Vec<LootEntry>,
        /// Gate conditions for the whole alternation.
        conditions: Vec<LootPredicate>,
    },
    /// Expands children in order until one fails, then stops.
    Sequence {
        /// Child entries, in declaration order.
        children: Vec<LootEntry>,
        /// Gate conditions for the whole sequence.
        conditions: Vec<LootPredicate>,
    },
}

impl LootEntry {
    /// A leaf emitting one item (weight 1, quality 0).
    #[must_use]
    pub fn item(item: ItemId) -> Self {
        Self::leaf(LeafPayload::Item(item))
    }

    /// A leaf emitting nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::leaf(LeafPayload::Empty)
    }

    /// A leaf delegating to another table by key.
    #[must_use]
    pub fn table_ref(key: TableKey) -> Self {
        Self::leaf(LeafPayload::TableRef(key))
    }

    /// A leaf invoking a dynamic drop callback by key.
    #[must_use]
    pub fn dynamic(key: DropKey) -> Self {
        Self::leaf(LeafPayload::Dynamic(key))
    }

    fn leaf(payload: LeafPayload) -> Self {
        Self::Leaf(LeafEntry {
            payload,
            weight: 1,
            quality: 0.0,
            conditions: Vec::new(),
            functions: Vec::new(),
        })
    }

    /// A group of entries expanded together.
    #[must_use]
    pub fn group(children: Vec<LootEntry>) -> Self {
        Self::Group {
            children,
            conditions: Vec::new(),
        }
    }

    /// First-successful-child alternation.
    #[must_use]
    pub fn alternatives(children: Vec<LootEntry>) -> Self {
        Self::Alternatives {
            children,
            conditions: Vec::new(),
        }
    }

    /// Until-first-failure sequence.
    #[must_use]
    pub fn sequence(children: Vec<LootEntry>) -> Self {
        Self::Sequence {
            children,
            conditions: Vec::new(),
        }
    }

    /// Sets the selection weight. Leaf entries only; composites carry no
    /// weight and ignore this.
    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        if let Self::Leaf(leaf) = &mut self {
            leaf.weight = weight;
        }
        self
    }

    /// Sets the luck coefficient. Leaf entries only.
    #[must_use]
    pub fn with_quality(mut self, quality: f32) -> Self {
        if let Self::Leaf(leaf) = &mut self {
            leaf.quality = quality;
        }
        self
    }

    /// Adds a gate condition.
    #[must_use]
    pub fn with_condition(mut self, condition: LootPredicate) -> Self {
        match &mut self {
            Self::Leaf(leaf) => leaf.conditions.push(condition),
            Self::Group { conditions, .. }
            | Self::Alternatives { conditions, .. }
            | Self::Sequence { conditions, .. } => conditions.push(condition),
        }
        self
    }

    /// Adds an item function. Leaf entries only; composite output is shaped
    /// by the leaves that produced it.
    #[must_use]
    pub fn with_function(mut self, function: LootFunction) -> Self {
        if let Self::Leaf(leaf) = &mut self {
            leaf.functions.push(function);
        }
        self
    }

    /// Expands this entry against the context, handing zero-or-more weighted
    /// candidates to `collect`. Returns whether the entry applied (its
    /// conditions passed and, for composites, the kind-specific rule held).
    pub fn expand<'t>(
        &'t self,
        ctx: &mut LootContext<'_>,
        collect: &mut dyn FnMut(Candidate<'t>),
    ) -> bool {
        match self {
            Self::Leaf(leaf) => {
                if !LootPredicate::eval_all(&leaf.conditions, ctx) {
                    return false;
                }
                let weight = leaf.effective_weight(ctx.luck());
                if weight > 0 {
                    collect(Candidate { weight, leaf });
                }
                true
            }
            Self::Group {
                children,
                conditions,
            } => {
                if !LootPredicate::eval_all(conditions, ctx) {
                    return false;
                }
                for child in children {
                    let _ = child.expand(ctx, collect);
                }
                true
            }
            Self::Alternatives {
                children,
                conditions,
            } => {
                if !LootPredicate::eval_all(conditions, ctx) {
                    return false;
                }
                children.iter().any(|child| child.expand(ctx, collect))
            }
            Self::Sequence {
                children,
                conditions,
            } => {
                if !LootPredicate::eval_all(conditions, ctx) {
                    return false;
                }
                children.iter().all(|child| child.expand(ctx, collect))
            }
        }
    }

    /// Reports structural problems without aborting the traversal.
    pub fn validate(&self, ctx: &ValidationContext<'_>) {
        match self {
            Self::Leaf(leaf) => leaf_validate(leaf, ctx),
            Self::Group {
                children,
                conditions,
            }
            | Self::Alternatives {
                children,
                conditions,
            }
            | Self::Sequence {
                children,
                conditions,
            } => {
                for (i, condition) in conditions.iter().enumerate() {
                    condition.validate(&ctx.for_child(&format!(".conditions[{i}]")));
                }
                for (i, child) in children.iter().enumerate() {
                    child.validate(&ctx.for_child(&format!(".children[{i}]")));
                }
            }
        }
    }
}

fn leaf_validate(leaf: &LeafEntry, ctx: &ValidationContext<'_>) {
    for (i, condition) in leaf.conditions.iter().enumerate() {
        condition.validate(&ctx.for_child(&format!(".conditions[{i}]")));
    }
    for (i, function) in leaf.functions.iter().enumerate() {
        function.validate(&ctx.for_child(&format!(".functions[{i}]")));
    }
    if let LeafPayload::TableRef(key) = &leaf.payload {
        if ctx.has_visited_table(key) {
            ctx.report(format!("table '{key}' is referenced recursively"));
        } else if ctx.env().tables().contains(key) {
            let table = ctx.env().tables().resolve(key);
            let child = ctx
                .enter_table(key)
                .for_child(&format!("->{key}"))
                .with_contract(table.param_set);
            for required in table.param_set.required() {
                if !ctx.contract().allows(*required) {
                    ctx.report(format!(
                        "referenced table '{key}' requires parameter '{required}' outside this contract"
                    ));
                }
            }
            table.validate(&child);
        } else {
            ctx.report(format!("unknown table reference '{key}'"));
        }
    }
}

/// A concrete weighted candidate produced by entry expansion.
pub struct Candidate<'t> {
    weight: u32,
    leaf: &'t LeafEntry,
}

impl<'t> Candidate<'t> {
    /// The luck-adjusted selection weight (always positive).
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Emits this candidate's items through the entry's own function list
    /// into the given consumer.
    pub fn create_items<'c>(
        &self,
        ctx: &mut LootContext<'c>,
        consumer: &mut StackConsumer<'_, 'c>,
    ) {
        let leaf = self.leaf;
        let mut decorated = |ctx: &mut LootContext<'c>, stack: ItemStack| {
            let stack = LootFunction::apply_all(&leaf.functions, stack, ctx);
            consumer(ctx, stack);
        };
        match &leaf.payload {
            LeafPayload::Item(item) => decorated(ctx, ItemStack::new(*item, 1)),
            LeafPayload::Empty => {}
            LeafPayload::TableRef(key) => {
                let table = ctx.env().tables().resolve(key);
                LootTable::populate_direct(&table, ctx, &mut decorated);
            }
            LeafPayload::Dynamic(key) => {
                if let Some(callback) = ctx.dynamic_drop(key) {
                    callback(&mut |stack| decorated(ctx, stack));
                } else {
                    tracing::debug!("no dynamic drop registered for '{}'", key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSet;
    use crate::registry::LootEnv;
    use runefall_core::ScriptedRandom;

    fn ctx_with<'c>(env: &'c LootEnv, luck: f32) -> LootContext<'c> {
        LootContext::builder(env)
            .with_random(ScriptedRandom::empty())
            .with_luck(luck)
            .build(ParamSet::Empty)
            .unwrap()
    }

    fn expand_weights(entry: &LootEntry, ctx: &mut LootContext<'_>) -> Vec<u32> {
        let mut weights = Vec::new();
        let _ = entry.expand(ctx, &mut |candidate| weights.push(candidate.weight()));
        weights
    }

    #[test]
    fn test_leaf_quality_scales_with_luck() {
        let env = LootEnv::new();
        let entry = LootEntry::item(1).with_weight(2).with_quality(3.0);
        let mut ctx = ctx_with(&env, 0.0);
        assert_eq!(expand_weights(&entry, &mut ctx), vec![2]);
        let mut lucky = ctx_with(&env, 2.0);
        assert_eq!(expand_weights(&entry, &mut lucky), vec![8]);
    }

    #[test]
    fn test_negative_quality_clamps_to_zero() {
        let env = LootEnv::new();
        let entry = LootEntry::item(1).with_weight(1).with_quality(-5.0);
        let mut ctx = ctx_with(&env, 1.0);
        // Effective weight went negative; the candidate is filtered out.
        assert!(expand_weights(&entry, &mut ctx).is_empty());
    }

    #[test]
    fn test_extreme_quality_saturates_weight() {
        let env = LootEnv::new();
        let entry = LootEntry::item(1).with_weight(10).with_quality(3.0e9);
        let mut ctx = ctx_with(&env, 2.0);
        // 10 + floor(3e9 * 2) overshoots u32; the weight pins at the
        // maximum instead of wrapping into a small value.
        assert_eq!(expand_weights(&entry, &mut ctx), vec![u32::MAX]);
    }

    #[test]
    fn test_gated_leaf_does_not_expand() {
        let env = LootEnv::new();
        let entry = LootEntry::item(1).with_condition(LootPredicate::Constant(false));
        let mut ctx = ctx_with(&env, 0.0);
        assert!(expand_weights(&entry, &mut ctx).is_empty());
    }

    #[test]
    fn test_group_expands_all_children() {
        let env = LootEnv::new();
        let entry = LootEntry::group(vec![
            LootEntry::item(1).with_weight(1),
            LootEntry::item(2).with_weight(2),
        ]);
        let mut ctx = ctx_with(&env, 0.0);
        assert_eq!(expand_weights(&entry, &mut ctx), vec![1, 2]);
    }

    #[test]
    fn test_alternatives_stop_at_first_success() {
        let env = LootEnv::new();
        let entry = LootEntry::alternatives(vec![
            LootEntry::item(1).with_condition(LootPredicate::Constant(false)),
            LootEntry::item(2).with_weight(5),
            LootEntry::item(3).with_weight(7),
        ]);
        let mut ctx = ctx_with(&env, 0.0);
        assert_eq!(expand_weights(&entry, &mut ctx), vec![5]);
    }

    #[test]
    fn test_sequence_stops_at_first_failure() {
        let env = LootEnv::new();
        let entry = LootEntry::sequence(vec![
            LootEntry::item(1).with_weight(1),
            LootEntry::item(2).with_condition(LootPredicate::Constant(false)),
            LootEntry::item(3).with_weight(7),
        ]);
        let mut ctx = ctx_with(&env, 0.0);
        assert_eq!(expand_weights(&entry, &mut ctx), vec![1]);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let env = LootEnv::new();
        let entry = LootEntry::group(vec![
            LootEntry::item(9).with_weight(3),
            LootEntry::item(8).with_weight(2),
            LootEntry::item(7).with_weight(1),
        ]);
        let mut ctx = ctx_with(&env, 0.0);
        assert_eq!(expand_weights(&entry, &mut ctx), vec![3, 2, 1]);
    }
}
