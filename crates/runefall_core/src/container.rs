//! # Container Abstraction
//!
//! A container is anything with a fixed number of item slots: a chest, a
//! corpse, a barrel. Game systems that place items (the loot container fill
//! in particular) only ever need slot count, read, and write.

use crate::item::ItemStack;

/// A fixed-size collection of item slots.
pub trait Container {
    /// Number of slots in this container.
    fn size(&self) -> usize;

    /// Returns the stack in a slot, or an empty stack for out-of-range slots.
    fn item(&self, slot: usize) -> ItemStack;

    /// Replaces the stack in a slot. Out-of-range slots are ignored.
    fn set_item(&mut self, slot: usize, stack: ItemStack);
}

/// A plain boxed-slice container.
///
/// The in-engine implementation used by tests and tools; game-side
/// inventories implement [`Container`] themselves.
#[derive(Clone, Debug)]
pub struct SlotContainer {
    slots: Box<[ItemStack]>,
}

impl SlotContainer {
    /// Creates a container with `size` empty slots.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![ItemStack::empty(); size].into_boxed_slice(),
        }
    }

    /// Counts how many slots currently hold an item.
    #[must_use]
    pub fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Total item count across all slots for a specific item type.
    #[must_use]
    pub fn count_item(&self, item_id: u32) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.count)
            .sum()
    }

    /// Total item count across all slots, all item types.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.slots.iter().map(|s| s.count).sum()
    }
}

impl Container for SlotContainer {
    fn size(&self) -> usize {
        self.slots.len()
    }

    fn item(&self, slot: usize) -> ItemStack {
        self.slots.get(slot).copied().unwrap_or_else(ItemStack::empty)
    }

    fn set_item(&mut self, slot: usize, stack: ItemStack) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = stack;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut chest = SlotContainer::new(4);
        chest.set_item(2, ItemStack::new(9, 3));
        assert_eq!(chest.item(2), ItemStack::new(9, 3));
        assert_eq!(chest.occupied_slots(), 1);
        assert_eq!(chest.count_item(9), 3);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut chest = SlotContainer::new(2);
        chest.set_item(10, ItemStack::new(1, 1));
        assert_eq!(chest.total_items(), 0);
        assert!(chest.item(10).is_empty());
    }
}
