//! # Container Fill
//!
//! Distributes generated loot across a container's empty slots. Placement is
//! randomized twice over (shuffled slots, shuffled items) and large stacks
//! are probabilistically broken up first, so an opened chest shows a
//! natural-looking scatter instead of a few dense stacks in the first slots.

use crate::context::LootContext;
use crate::table::LootTable;
use runefall_core::{shuffle, Container, ItemStack};
use std::sync::Arc;

/// Generates loot from `table` and places it into the container's empty
/// slots. Occupied slots are never touched. Surplus items beyond the free
/// slot count are dropped with a warning.
///
/// Generation goes through the splitting path: slots can never hold more
/// than an item's stack limit, and redistribution below only ever shrinks
/// pieces further.
pub(crate) fn fill_container(
    table: &Arc<LootTable>,
    ctx: &mut LootContext<'_>,
    container: &mut dyn Container,
) {
    let mut items = Vec::new();
    {
        let mut collector = |_ctx: &mut LootContext<'_>, stack: ItemStack| items.push(stack);
        LootTable::populate(table, ctx, &mut collector);
    }

    let mut empty_slots: Vec<usize> = (0..container.size())
        .filter(|&slot| container.item(slot).is_empty())
        .collect();
    shuffle(&mut empty_slots, ctx.random());

    let items = redistribute(ctx, items, empty_slots.len());

    for (placed, stack) in items.iter().enumerate() {
        let Some(slot) = empty_slots.pop() else {
            tracing::warn!(
                "container over-filled: dropping {} surplus loot stack(s)",
                items.len() - placed
            );
            return;
        };
        container.set_item(slot, *stack);
    }
}

/// Breaks stacks apart until the item count approaches the free slot count.
///
/// Stacks of count one are fixed. While spare slots remain, a random
/// splittable stack is halved at a random point and each piece settles or
/// re-enters the splittable pool on a coin flip. Item totals are preserved
/// exactly; only the partition changes. The result is shuffled.
#[allow(clippy::cast_possible_truncation)]
fn redistribute(
    ctx: &mut LootContext<'_>,
    items: Vec<ItemStack>,
    free_slots: usize,
) -> Vec<ItemStack> {
    let mut settled = Vec::new();
    let mut splittable = Vec::new();
    for stack in items {
        if stack.is_empty() {
            continue;
        }
        if stack.count > 1 {
            splittable.push(stack);
        } else {
            settled.push(stack);
        }
    }

    while free_slots > settled.len() + splittable.len() && !splittable.is_empty() {
        let index = ctx.random().next_bounded(splittable.len() as u32) as usize;
        let stack = splittable.remove(index);
        // count >= 2 here, so the split point is in [1, count/2].
        let split_count = 1 + ctx.random().next_bounded(stack.count / 2);
        let pieces = [
            stack.with_count(stack.count - split_count),
            stack.with_count(split_count),
        ];
        for piece in pieces {
            if piece.count > 1 && ctx.random().next_bool() {
                splittable.push(piece);
            } else {
                settled.push(piece);
            }
        }
    }

    settled.append(&mut splittable);
    shuffle(&mut settled, ctx.random());
    settled
}
