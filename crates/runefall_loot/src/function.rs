//! # Item Functions
//!
//! Post-processing transforms applied to generated items. Functions are
//! total for well-formed input and side-effect-free on the context (beyond
//! drawing randomness). Lists compose left-to-right; an empty list is the
//! identity. Entries, pools, and tables each layer their own list around a
//! shared terminal consumer.

use crate::context::LootContext;
use crate::predicate::LootPredicate;
use crate::provider::NumberProvider;
use crate::validate::ValidationContext;
use runefall_core::ItemStack;
use serde::{Deserialize, Serialize};

/// An item transform: `(stack, context) -> stack`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LootFunction {
    /// Replaces the stack count with the provided number (floored at zero).
    SetCount(NumberProvider),
    /// Adds the provided number to the stack count (floored at zero).
    AddCount(NumberProvider),
    /// Clamps the stack count into `[min, max]`.
    LimitCount {
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },
    /// Scales the count by `1 + factor * luck`, flooring the result.
    MultiplyCountByLuck {
        /// Count multiplier gained per point of luck.
        factor: f32,
    },
    /// Applies the inner function only when all conditions pass; otherwise
    /// the stack passes through untouched.
    Conditional {
        /// Gate conditions (AND-composed, vacuously true when empty).
        conditions: Vec<LootPredicate>,
        /// The gated transform.
        function: Box<LootFunction>,
    },
}

impl LootFunction {
    /// Applies this transform to a stack.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&self, stack: ItemStack, ctx: &mut LootContext<'_>) -> ItemStack {
        match self {
            Self::SetCount(provider) => stack.with_count(provider.as_i32(ctx).max(0) as u32),
            Self::AddCount(provider) => {
                let count = i64::from(stack.count) + i64::from(provider.as_i32(ctx));
                stack.with_count(count.clamp(0, i64::from(u32::MAX)) as u32)
            }
            Self::LimitCount { min, max } => stack.with_count(stack.count.clamp(*min, *max)),
            #[allow(clippy::cast_precision_loss)]
            Self::MultiplyCountByLuck { factor } => {
                let scaled = (stack.count as f32 * (1.0 + factor * ctx.luck())).floor();
                stack.with_count(scaled.max(0.0) as u32)
            }
            Self::Conditional {
                conditions,
                function,
            } => {
                if LootPredicate::eval_all(conditions, ctx) {
                    function.apply(stack, ctx)
                } else {
                    stack
                }
            }
        }
    }

    /// Applies a function list left-to-right; an empty list is the identity.
    pub fn apply_all(
        functions: &[LootFunction],
        mut stack: ItemStack,
        ctx: &mut LootContext<'_>,
    ) -> ItemStack {
        for function in functions {
            stack = function.apply(stack, ctx);
        }
        stack
    }

    /// Reports structural problems without aborting the traversal.
    pub fn validate(&self, ctx: &ValidationContext<'_>) {
        match self {
            Self::SetCount(provider) | Self::AddCount(provider) => {
                provider.validate(&ctx.for_child(".count"));
            }
            Self::LimitCount { min, max } => {
                if min > max {
                    ctx.report(format!("inverted limit [{min}, {max}]"));
                }
            }
            Self::MultiplyCountByLuck { .. } => {}
            Self::Conditional {
                conditions,
                function,
            } => {
                for (i, condition) in conditions.iter().enumerate() {
                    condition.validate(&ctx.for_child(&format!(".conditions[{i}]")));
                }
                function.validate(&ctx.for_child(".function"));
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

    fn ctx_with<'c>(env: &'c LootEnv, random: ScriptedRandom, luck: f32) -> LootContext<'c> {
        LootContext::builder(env)
            .with_random(random)
            .with_luck(luck)
            .build(ParamSet::Empty)
            .unwrap()
    }

    #[test]
    fn test_empty_list_is_identity() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty(), 0.0);
        let stack = ItemStack::new(5, 3);
        assert_eq!(LootFunction::apply_all(&[], stack, &mut ctx), stack);
    }

    #[test]
    fn test_left_to_right_composition() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty(), 0.0);
        // SetCount(10) then LimitCount caps at 4; the reverse would yield 10.
        let functions = [
            LootFunction::SetCount(NumberProvider::Constant(10.0)),
            LootFunction::LimitCount { min: 0, max: 4 },
        ];
        let out = LootFunction::apply_all(&functions, ItemStack::new(5, 1), &mut ctx);
        assert_eq!(out.count, 4);
    }

    #[test]
    fn test_set_count_floors_negative_to_zero() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty(), 0.0);
        let function = LootFunction::SetCount(NumberProvider::Constant(-3.0));
        let out = function.apply(ItemStack::new(5, 2), &mut ctx);
        assert_eq!(out.count, 0);
    }

    #[test]
    fn test_add_count_saturates_at_zero() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty(), 0.0);
        let function = LootFunction::AddCount(NumberProvider::Constant(-10.0));
        let out = function.apply(ItemStack::new(5, 2), &mut ctx);
        assert_eq!(out.count, 0);
    }

    #[test]
    fn test_luck_multiplier() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty(), 2.0);
        let function = LootFunction::MultiplyCountByLuck { factor: 0.5 };
        let out = function.apply(ItemStack::new(5, 3), &mut ctx);
        // 3 * (1 + 0.5 * 2) = 6
        assert_eq!(out.count, 6);
    }

    #[test]
    fn test_conditional_gates_transform() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty(), 0.0);
        let gated = LootFunction::Conditional {
            conditions: vec![LootPredicate::Constant(false)],
            function: Box::new(LootFunction::SetCount(NumberProvider::Constant(99.0))),
        };
        let out = gated.apply(ItemStack::new(5, 2), &mut ctx);
        assert_eq!(out.count, 2);
    }
}
