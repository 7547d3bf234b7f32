//! # Item Primitives
//!
//! Item identity, item stacks, and the catalog of per-item stack limits.
//! An `ItemStack` is a plain `Copy` value; all item metadata lives in the
//! [`ItemCatalog`] so stacks stay pointer-free.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for an item type. Zero means "no item".
pub type ItemId = u32;

/// Stack limit assumed for items the catalog does not know about.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// A stack of items: an item type plus a count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item type ID, or 0 for an empty stack.
    pub item_id: ItemId,
    /// Number of items in this stack.
    pub count: u32,
}

impl ItemStack {
    /// Creates an empty item stack.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_id: 0,
            count: 0,
        }
    }

    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(item_id: ItemId, count: u32) -> Self {
        Self { item_id, count }
    }

    /// Returns true if this stack holds nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0 || self.item_id == 0
    }

    /// Returns a copy of this stack with a different count.
    #[inline]
    #[must_use]
    pub const fn with_count(self, count: u32) -> Self {
        Self {
            item_id: self.item_id,
            count,
        }
    }
}

/// Registry of per-item stack limits.
///
/// Built once at data-load time and shared read-only afterwards. Unknown
/// items fall back to [`DEFAULT_MAX_STACK`] so lookups never fail.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    max_stacks: HashMap<ItemId, u32>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the stack limit for an item type.
    pub fn register(&mut self, item_id: ItemId, max_stack: u32) {
        self.max_stacks.insert(item_id, max_stack.max(1));
    }

    /// Returns the stack limit for an item type.
    #[must_use]
    pub fn max_stack(&self, item_id: ItemId) -> u32 {
        self.max_stacks
            .get(&item_id)
            .copied()
            .unwrap_or(DEFAULT_MAX_STACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack() {
        assert!(ItemStack::empty().is_empty());
        assert!(ItemStack::new(0, 5).is_empty());
        assert!(ItemStack::new(7, 0).is_empty());
        assert!(!ItemStack::new(7, 1).is_empty());
    }

    #[test]
    fn test_catalog_defaults() {
        let mut catalog = ItemCatalog::new();
        catalog.register(1, 16);
        assert_eq!(catalog.max_stack(1), 16);
        assert_eq!(catalog.max_stack(999), DEFAULT_MAX_STACK);
    }

    #[test]
    fn test_catalog_floor_of_one() {
        let mut catalog = ItemCatalog::new();
        catalog.register(2, 0);
        assert_eq!(catalog.max_stack(2), 1);
    }
}
