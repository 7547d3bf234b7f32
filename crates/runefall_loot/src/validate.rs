//! # Static Validation
//!
//! Load-time structural checking for loot definitions. Validation never
//! aborts on the first defect: every problem found across the whole tree is
//! reported against a dotted path identifying exactly where it sits, so a
//! data author can fix a batch of mistakes in one pass.
//!
//! The traversal uses its own persistent visited sets, independent of the
//! runtime guard stacks in [`LootContext`](crate::context::LootContext):
//! validation forks its state per child so sibling branches never shadow
//! each other, while a genuine reference cycle is reported exactly once.

use crate::params::ParamSet;
use crate::registry::{ConditionKey, LootEnv, TableKey};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

/// Accumulates validation problems keyed by the dotted path of the element
/// that caused them.
///
/// Paths map to problem *lists*: a single element may be broken in several
/// ways at once. Interior mutability keeps the traversal code free of
/// threaded `&mut` plumbing.
#[derive(Debug, Default)]
pub struct ProblemReporter {
    problems: RefCell<BTreeMap<String, Vec<String>>>,
}

impl ProblemReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem at the given path.
    pub fn report(&self, path: &str, problem: String) {
        self.problems
            .borrow_mut()
            .entry(path.to_owned())
            .or_default()
            .push(problem);
    }

    /// True when no problems were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.borrow().is_empty()
    }

    /// Total number of recorded problems across all paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.borrow().values().map(Vec::len).sum()
    }

    /// Consumes the reporter, yielding the path-to-problems multimap.
    #[must_use]
    pub fn into_problems(self) -> BTreeMap<String, Vec<String>> {
        self.problems.into_inner()
    }
}

/// Per-branch traversal state for a validation pass.
///
/// Cloned (via [`for_child`](Self::for_child) and the `enter_*` methods)
/// rather than mutated in place, so state flows down the tree only: two
/// sibling references to the same table are each validated on their own
/// terms.
#[derive(Clone)]
pub struct ValidationContext<'v> {
    reporter: &'v ProblemReporter,
    env: &'v LootEnv,
    contract: ParamSet,
    path: String,
    visited_tables: HashSet<TableKey>,
    visited_conditions: HashSet<ConditionKey>,
}

impl<'v> ValidationContext<'v> {
    /// Creates a root context for one table's validation pass.
    #[must_use]
    pub fn new(reporter: &'v ProblemReporter, env: &'v LootEnv, contract: ParamSet) -> Self {
        Self {
            reporter,
            env,
            contract,
            path: String::new(),
            visited_tables: HashSet::new(),
            visited_conditions: HashSet::new(),
        }
    }

    /// The registries validation resolves references against.
    #[must_use]
    pub fn env(&self) -> &'v LootEnv {
        self.env
    }

    /// The parameter contract in force on this branch.
    #[must_use]
    pub fn contract(&self) -> ParamSet {
        self.contract
    }

    /// Records a problem at this branch's path.
    pub fn report(&self, problem: impl Into<String>) {
        self.reporter.report(&self.path, problem.into());
    }

    /// A child context whose path gains the given segment.
    #[must_use]
    pub fn for_child(&self, segment: &str) -> Self {
        let mut child = self.clone();
        child.path.push_str(segment);
        child
    }

    /// A child context with the visited-table set extended by `key`.
    #[must_use]
    pub fn enter_table(&self, key: &TableKey) -> Self {
        let mut child = self.clone();
        child.visited_tables.insert(key.clone());
        child
    }

    /// True when `key` was already entered on this branch.
    #[must_use]
    pub fn has_visited_table(&self, key: &TableKey) -> bool {
        self.visited_tables.contains(key)
    }

    /// A child context with the visited-condition set extended by `key`.
    #[must_use]
    pub fn enter_condition(&self, key: &ConditionKey) -> Self {
        let mut child = self.clone();
        child.visited_conditions.insert(key.clone());
        child
    }

    /// True when `key` was already entered on this branch.
    #[must_use]
    pub fn has_visited_condition(&self, key: &ConditionKey) -> bool {
        self.visited_conditions.contains(key)
    }

    /// A child context operating under a different parameter contract.
    /// Used when descending into a referenced table, which declares its own.
    #[must_use]
    pub fn with_contract(&self, contract: ParamSet) -> Self {
        let mut child = self.clone();
        child.contract = contract;
        child
    }
}

/// Validates every registered table against the registries in `env`.
///
/// Each table's problems are rooted at its registry key, so a report of
/// `chests/stronghold.pools[0].entries[2]` reads end to end.
#[must_use]
pub fn validate_all(env: &LootEnv) -> ProblemReporter {
    let reporter = ProblemReporter::new();
    for (key, table) in env.tables().iter() {
        let ctx = ValidationContext::new(&reporter, env, table.param_set)
            .enter_table(key)
            .for_child(key.as_str());
        table.validate(&ctx);
    }
    if !reporter.is_empty() {
        tracing::warn!(
            "loot validation found {} problem(s) across registered tables",
            reporter.len()
        );
    }
    reporter
}
