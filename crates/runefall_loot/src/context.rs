//! # Evaluation Context
//!
//! One [`LootContext`] exists per evaluation: the random source, the luck
//! modifier, the bound parameters, the dynamic-drop callbacks, and the two
//! recursion guards. The parameter bindings are frozen at `build()`; only
//! the guards mutate afterwards, strictly as stacks (push on enter, pop on
//! exit), which is what bounds recursion through self-referential data.

use crate::error::{LootError, LootResult};
use crate::params::{ParamKey, ParamSet, ParamValue};
use crate::registry::{ConditionKey, DropKey, LootEnv};
use crate::table::LootTable;
use runefall_core::{ItemStack, RandomSource, SeededRandom};
use std::collections::HashMap;
use std::sync::Arc;

/// Terminal or decorated item consumer threaded through an evaluation.
///
/// Consumers receive the context so that layered item functions can keep
/// drawing randomness while items stream through them.
pub type StackConsumer<'a, 'c> = dyn FnMut(&mut LootContext<'c>, ItemStack) + 'a;

/// An externally-supplied drop callback, invoked by `Dynamic` entries.
pub type DynamicDropFn<'c> = dyn Fn(&mut dyn FnMut(ItemStack)) + 'c;

/// Per-evaluation state for one loot generation pass.
pub struct LootContext<'c> {
    env: &'c LootEnv,
    random: Box<dyn RandomSource + 'c>,
    luck: f32,
    params: HashMap<ParamKey, ParamValue>,
    dynamic_drops: HashMap<DropKey, Arc<DynamicDropFn<'c>>>,
    visited_tables: Vec<usize>,
    visited_conditions: Vec<ConditionKey>,
}

impl<'c> LootContext<'c> {
    /// Starts building a context against an environment.
    #[must_use]
    pub fn builder(env: &'c LootEnv) -> LootContextBuilder<'c> {
        LootContextBuilder {
            env,
            random: None,
            luck: 0.0,
            params: HashMap::new(),
            dynamic_drops: HashMap::new(),
        }
    }

    /// The environment this evaluation resolves against.
    #[must_use]
    pub fn env(&self) -> &'c LootEnv {
        self.env
    }

    /// The luck modifier for this evaluation.
    #[must_use]
    pub fn luck(&self) -> f32 {
        self.luck
    }

    /// The random source for this evaluation.
    pub fn random(&mut self) -> &mut dyn RandomSource {
        &mut *self.random
    }

    /// Reads a bound parameter.
    ///
    /// # Errors
    ///
    /// Returns [`LootError::ParameterNotBound`] if the key was permitted by
    /// the contract but never bound, distinguishing "optional but absent"
    /// from "present".
    pub fn param(&self, key: ParamKey) -> LootResult<&ParamValue> {
        self.params
            .get(&key)
            .ok_or(LootError::ParameterNotBound(key))
    }

    /// Reads a bound parameter, or `None` when absent.
    #[must_use]
    pub fn get_param(&self, key: ParamKey) -> Option<&ParamValue> {
        self.params.get(&key)
    }

    /// Whether a parameter is bound.
    #[must_use]
    pub fn has_param(&self, key: ParamKey) -> bool {
        self.params.contains_key(&key)
    }

    /// Looks up a dynamic drop callback by key.
    #[must_use]
    pub fn dynamic_drop(&self, key: &DropKey) -> Option<Arc<DynamicDropFn<'c>>> {
        self.dynamic_drops.get(key).map(Arc::clone)
    }

    /// Pushes a table onto the recursion guard.
    ///
    /// Returns false if the table is already being evaluated higher up this
    /// call stack; the caller must then skip the table entirely. Identity is
    /// the shared table allocation, so the guard works even for tables never
    /// registered under a key.
    #[must_use]
    pub fn enter_table(&mut self, table: &Arc<LootTable>) -> bool {
        let handle = Arc::as_ptr(table) as usize;
        if self.visited_tables.contains(&handle) {
            return false;
        }
        self.visited_tables.push(handle);
        true
    }

    /// Pops a table off the recursion guard on the way out.
    pub fn exit_table(&mut self, table: &Arc<LootTable>) {
        let popped = self.visited_tables.pop();
        debug_assert_eq!(popped, Some(Arc::as_ptr(table) as usize));
    }

    /// Pushes a named condition onto the recursion guard.
    ///
    /// Returns false if the condition is already being tested higher up this
    /// call stack.
    #[must_use]
    pub fn enter_condition(&mut self, key: &ConditionKey) -> bool {
        if self.visited_conditions.contains(key) {
            return false;
        }
        self.visited_conditions.push(key.clone());
        true
    }

    /// Pops a named condition off the recursion guard on the way out.
    pub fn exit_condition(&mut self, key: &ConditionKey) {
        let popped = self.visited_conditions.pop();
        debug_assert_eq!(popped.as_ref(), Some(key));
    }
}

/// Builder enforcing a table's parameter contract.
pub struct LootContextBuilder<'c> {
    env: &'c LootEnv,
    random: Option<Box<dyn RandomSource + 'c>>,
    luck: f32,
    params: HashMap<ParamKey, ParamValue>,
    dynamic_drops: HashMap<DropKey, Arc<DynamicDropFn<'c>>>,
}

impl<'c> LootContextBuilder<'c> {
    /// Supplies an explicit random source; required for reproducible runs.
    #[must_use]
    pub fn with_random(mut self, random: impl RandomSource + 'c) -> Self {
        self.random = Some(Box::new(random));
        self
    }

    /// Shorthand for a seeded ChaCha8 source.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random(SeededRandom::from_seed(seed))
    }

    /// Sets the luck modifier (default 0).
    #[must_use]
    pub fn with_luck(mut self, luck: f32) -> Self {
        self.luck = luck;
        self
    }

    /// Binds a parameter.
    #[must_use]
    pub fn with_param(mut self, key: ParamKey, value: ParamValue) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Registers a dynamic drop callback for this evaluation.
    #[must_use]
    pub fn with_dynamic_drop(
        mut self,
        key: DropKey,
        callback: impl Fn(&mut dyn FnMut(ItemStack)) + 'c,
    ) -> Self {
        self.dynamic_drops.insert(key, Arc::new(callback));
        self
    }

    /// Validates the bindings against the contract and freezes the context.
    ///
    /// Without an explicit random source the context falls back to system
    /// entropy and is not reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`LootError::MissingParameter`] if a required key is unbound,
    /// or [`LootError::UnexpectedParameter`] if a bound key falls outside
    /// the contract.
    pub fn build(self, contract: ParamSet) -> LootResult<LootContext<'c>> {
        for key in contract.required() {
            if !self.params.contains_key(key) {
                return Err(LootError::MissingParameter(*key));
            }
        }
        for key in self.params.keys() {
            if !contract.allows(*key) {
                return Err(LootError::UnexpectedParameter(*key));
            }
        }
        Ok(LootContext {
            env: self.env,
            random: self
                .random
                .unwrap_or_else(|| Box::new(SeededRandom::from_entropy())),
            luck: self.luck,
            params: self.params,
            dynamic_drops: self.dynamic_drops,
            visited_tables: Vec::new(),
            visited_conditions: Vec::new(),
        })
    }
}
