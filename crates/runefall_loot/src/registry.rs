//! # Registries and the Loot Environment
//!
//! Tables and named conditions are registered once at data-load time under
//! namespaced keys and resolved read-only during evaluation. Lookups never
//! fail: unknown keys resolve to shared empty sentinels so downstream code
//! has no null case to handle.

use crate::predicate::LootPredicate;
use crate::table::LootTable;
use runefall_core::ItemCatalog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Namespaced key identifying a loot table in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey(String);

impl TableKey {
    /// Creates a table key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespaced key identifying a registered condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConditionKey(String);

impl ConditionKey {
    /// Creates a condition key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key naming an externally-supplied dynamic drop callback.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DropKey(String);

impl DropKey {
    /// Creates a drop key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of loot tables.
#[derive(Clone, Debug)]
pub struct TableRegistry {
    tables: HashMap<TableKey, Arc<LootTable>>,
    empty: Arc<LootTable>,
}

impl TableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            empty: Arc::new(LootTable::empty()),
        }
    }

    /// Registers a table under a key, replacing any previous binding.
    pub fn register(&mut self, key: TableKey, table: LootTable) {
        self.tables.insert(key, Arc::new(table));
    }

    /// Registers an already-shared table, allowing one table object to be
    /// bound under several keys.
    pub fn register_shared(&mut self, key: TableKey, table: Arc<LootTable>) {
        self.tables.insert(key, table);
    }

    /// Resolves a table, falling back to the shared empty sentinel.
    #[must_use]
    pub fn resolve(&self, key: &TableKey) -> Arc<LootTable> {
        match self.tables.get(key) {
            Some(table) => Arc::clone(table),
            None => {
                tracing::debug!("unknown loot table '{}', using empty sentinel", key);
                Arc::clone(&self.empty)
            }
        }
    }

    /// Whether a key is registered.
    #[must_use]
    pub fn contains(&self, key: &TableKey) -> bool {
        self.tables.contains_key(key)
    }

    /// Iterates all registered tables in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &Arc<LootTable>)> {
        self.tables.iter()
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of named, reusable conditions.
#[derive(Clone, Debug)]
pub struct ConditionRegistry {
    conditions: HashMap<ConditionKey, Arc<LootPredicate>>,
    missing: Arc<LootPredicate>,
}

impl ConditionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            conditions: HashMap::new(),
            // A dangling reference gates its entry off rather than open.
            missing: Arc::new(LootPredicate::Constant(false)),
        }
    }

    /// Registers a condition under a key, replacing any previous binding.
    pub fn register(&mut self, key: ConditionKey, predicate: LootPredicate) {
        self.conditions.insert(key, Arc::new(predicate));
    }

    /// Resolves a condition, falling back to an always-false sentinel.
    #[must_use]
    pub fn resolve(&self, key: &ConditionKey) -> Arc<LootPredicate> {
        match self.conditions.get(key) {
            Some(predicate) => Arc::clone(predicate),
            None => {
                tracing::debug!("unknown loot condition '{}', using false sentinel", key);
                Arc::clone(&self.missing)
            }
        }
    }

    /// Whether a key is registered.
    #[must_use]
    pub fn contains(&self, key: &ConditionKey) -> bool {
        self.conditions.contains_key(key)
    }
}

impl Default for ConditionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a loot evaluation resolves against: tables, named conditions,
/// and item stack limits.
///
/// Built once by the data loader, then published immutably; concurrent
/// evaluations share it by reference with no locking (the publish barrier is
/// the loader's responsibility, not the engine's).
#[derive(Clone, Debug, Default)]
pub struct LootEnv {
    tables: TableRegistry,
    conditions: ConditionRegistry,
    items: ItemCatalog,
}

impl LootEnv {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table registry.
    #[must_use]
    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    /// The condition registry.
    #[must_use]
    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    /// The item stack-limit catalog.
    #[must_use]
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Registers a loot table.
    pub fn register_table(&mut self, key: TableKey, table: LootTable) {
        self.tables.register(key, table);
    }

    /// Registers an already-shared loot table.
    pub fn register_shared_table(&mut self, key: TableKey, table: Arc<LootTable>) {
        self.tables.register_shared(key, table);
    }

    /// Registers a named condition.
    pub fn register_condition(&mut self, key: ConditionKey, predicate: LootPredicate) {
        self.conditions.register(key, predicate);
    }

    /// Registers an item's stack limit.
    pub fn register_item(&mut self, item_id: u32, max_stack: u32) {
        self.items.register(item_id, max_stack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_table_resolves_to_sentinel() {
        let registry = TableRegistry::new();
        let table = registry.resolve(&TableKey::new("missing:key"));
        assert!(table.pools.is_empty());
    }

    #[test]
    fn test_unknown_condition_is_false_sentinel() {
        let registry = ConditionRegistry::new();
        let predicate = registry.resolve(&ConditionKey::new("missing:cond"));
        assert_eq!(*predicate, LootPredicate::Constant(false));
    }

    #[test]
    fn test_shared_registration_aliases() {
        let mut registry = TableRegistry::new();
        let table = Arc::new(LootTable::empty());
        registry.register_shared(TableKey::new("a"), Arc::clone(&table));
        registry.register_shared(TableKey::new("b"), Arc::clone(&table));
        assert!(Arc::ptr_eq(
            &registry.resolve(&TableKey::new("a")),
            &registry.resolve(&TableKey::new("b"))
        ));
    }
}
