//! # Loot Predicates
//!
//! Pure boolean tests over the context, used to gate pools and entries. A
//! closed sum type dispatched by pattern matching; externally-defined
//! conditions are registered by name and reached through
//! [`LootPredicate::Reference`].
//!
//! Lists of predicates compose as a short-circuiting AND: an empty list is
//! vacuously true ("no conditions restrict this entry").

use crate::context::LootContext;
use crate::params::ParamKey;
use crate::provider::NumberProvider;
use crate::registry::ConditionKey;
use crate::validate::ValidationContext;
use serde::{Deserialize, Serialize};

/// A pure boolean test over the evaluation context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LootPredicate {
    /// Always the given value.
    Constant(bool),
    /// True when every term is true; vacuously true when empty.
    AllOf(Vec<LootPredicate>),
    /// True when any term is true; false when empty.
    AnyOf(Vec<LootPredicate>),
    /// Negation.
    Inverted(Box<LootPredicate>),
    /// Passes with the given probability.
    RandomChance {
        /// Success probability in `[0, 1]`.
        chance: f32,
    },
    /// Passes with probability `chance + luck_multiplier * luck`.
    RandomChanceWithLuck {
        /// Success probability at luck zero.
        chance: f32,
        /// Additional probability per point of luck.
        luck_multiplier: f32,
    },
    /// True when the provided value lands inside `[min, max]`.
    ValueCheck {
        /// The value under test.
        value: NumberProvider,
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
    },
    /// True when the given parameter is bound (e.g. "killed by a player"
    /// gates on the attacker parameter being present).
    HasParam(ParamKey),
    /// A named condition resolved through the registry. Guarded against
    /// reference cycles at runtime.
    Reference(ConditionKey),
}

impl LootPredicate {
    /// Tests this predicate against the context.
    pub fn test(&self, ctx: &mut LootContext<'_>) -> bool {
        match self {
            Self::Constant(value) => *value,
            Self::AllOf(terms) => Self::eval_all(terms, ctx),
            Self::AnyOf(terms) => terms.iter().any(|term| term.test(ctx)),
            Self::Inverted(inner) => !inner.test(ctx),
            Self::RandomChance { chance } => ctx.random().next_f32() < *chance,
            Self::RandomChanceWithLuck {
                chance,
                luck_multiplier,
            } => {
                let effective = chance + luck_multiplier * ctx.luck();
                ctx.random().next_f32() < effective
            }
            Self::ValueCheck { value, min, max } => {
                let sampled = value.as_i32(ctx);
                (*min..=*max).contains(&sampled)
            }
            Self::HasParam(key) => ctx.has_param(*key),
            Self::Reference(key) => {
                if !ctx.enter_condition(key) {
                    tracing::warn!(
                        "condition '{}' is referenced recursively; treating as false",
                        key
                    );
                    return false;
                }
                let predicate = ctx.env().conditions().resolve(key);
                let result = predicate.test(ctx);
                ctx.exit_condition(key);
                result
            }
        }
    }

    /// Short-circuiting AND over a predicate list; empty lists pass.
    ///
    /// Order matters for cost only, never for correctness: predicates are
    /// pure, so skipping later terms cannot change observable state.
    pub fn eval_all(predicates: &[LootPredicate], ctx: &mut LootContext<'_>) -> bool {
        predicates.iter().all(|predicate| predicate.test(ctx))
    }

    /// Reports structural problems without aborting the traversal.
    pub fn validate(&self, ctx: &ValidationContext<'_>) {
        match self {
            Self::Constant(_) | Self::HasParam(_) => {}
            Self::AllOf(terms) | Self::AnyOf(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    term.validate(&ctx.for_child(&format!(".term[{i}]")));
                }
            }
            Self::Inverted(inner) => inner.validate(&ctx.for_child(".term")),
            Self::RandomChance { chance } => {
                if !(0.0..=1.0).contains(chance) {
                    ctx.report(format!("chance {chance} outside [0, 1]"));
                }
            }
            Self::RandomChanceWithLuck { chance, .. } => {
                if *chance < 0.0 {
                    ctx.report(format!("negative base chance {chance}"));
                }
            }
            Self::ValueCheck { value, min, max } => {
                if min > max {
                    ctx.report(format!("inverted bounds [{min}, {max}]"));
                }
                value.validate(&ctx.for_child(".value"));
            }
            Self::Reference(key) => {
                if ctx.has_visited_condition(key) {
                    ctx.report(format!("condition '{key}' is referenced recursively"));
                } else if ctx.env().conditions().contains(key) {
                    let predicate = ctx.env().conditions().resolve(key);
                    predicate.validate(&ctx.enter_condition(key).for_child(&format!("->{key}")));
                } else {
                    ctx.report(format!("unknown condition reference '{key}'"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamSet, ParamValue};
    use crate::registry::LootEnv;
    use runefall_core::ScriptedRandom;

    fn ctx_with<'c>(env: &'c LootEnv, random: ScriptedRandom) -> LootContext<'c> {
        LootContext::builder(env)
            .with_random(random)
            .build(ParamSet::Empty)
            .unwrap()
    }

    #[test]
    fn test_empty_list_is_vacuously_true() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty());
        assert!(LootPredicate::eval_all(&[], &mut ctx));
    }

    #[test]
    fn test_and_short_circuits() {
        let env = LootEnv::new();
        // The scripted source is empty: reaching the chance term would panic.
        let mut ctx = ctx_with(&env, ScriptedRandom::empty());
        let terms = [
            LootPredicate::Constant(false),
            LootPredicate::RandomChance { chance: 0.5 },
        ];
        assert!(!LootPredicate::eval_all(&terms, &mut ctx));
    }

    #[test]
    fn test_random_chance_threshold() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty().and_floats([0.3, 0.7]));
        let predicate = LootPredicate::RandomChance { chance: 0.5 };
        assert!(predicate.test(&mut ctx));
        assert!(!predicate.test(&mut ctx));
    }

    #[test]
    fn test_luck_raises_chance() {
        let env = LootEnv::new();
        let mut ctx = LootContext::builder(&env)
            .with_random(ScriptedRandom::empty().and_floats([0.6]))
            .with_luck(2.0)
            .build(ParamSet::Empty)
            .unwrap();
        let predicate = LootPredicate::RandomChanceWithLuck {
            chance: 0.25,
            luck_multiplier: 0.25,
        };
        assert!(predicate.test(&mut ctx));
    }

    #[test]
    fn test_has_param() {
        let env = LootEnv::new();
        let mut ctx = LootContext::builder(&env)
            .with_seed(1)
            .with_param(ParamKey::Origin, ParamValue::Position([0.0; 3]))
            .build(ParamSet::Chest)
            .unwrap();
        assert!(LootPredicate::HasParam(ParamKey::Origin).test(&mut ctx));
        assert!(!LootPredicate::HasParam(ParamKey::ThisEntity).test(&mut ctx));
    }

    #[test]
    fn test_reference_resolves_registered_condition() {
        let mut env = LootEnv::new();
        env.register_condition(
            ConditionKey::new("test:always"),
            LootPredicate::Constant(true),
        );
        let mut ctx = ctx_with(&env, ScriptedRandom::empty());
        assert!(LootPredicate::Reference(ConditionKey::new("test:always")).test(&mut ctx));
    }

    #[test]
    fn test_dangling_reference_is_false() {
        let env = LootEnv::new();
        let mut ctx = ctx_with(&env, ScriptedRandom::empty());
        assert!(!LootPredicate::Reference(ConditionKey::new("test:missing")).test(&mut ctx));
    }

    #[test]
    fn test_recursive_reference_terminates_false() {
        let mut env = LootEnv::new();
        let key = ConditionKey::new("test:selfref");
        env.register_condition(key.clone(), LootPredicate::Reference(key.clone()));
        let mut ctx = ctx_with(&env, ScriptedRandom::empty());
        assert!(!LootPredicate::Reference(key).test(&mut ctx));
    }
}
