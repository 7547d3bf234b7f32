//! # Loot Parameters
//!
//! Tables declare which pieces of game state they need through a
//! [`ParamSet`] contract; callers bind concrete [`ParamValue`]s when
//! building a context. The contract is enforced once, at build time.

use runefall_core::ItemStack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, typed slot of per-evaluation game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    /// World position the loot event happened at.
    Origin,
    /// The entity the table is being evaluated for (the one that died,
    /// the block's breaker, the gift recipient).
    ThisEntity,
    /// The entity responsible for the event, if any (the killer).
    AttackingEntity,
    /// The damage source label that triggered the event.
    DamageSource,
    /// The tool used for the event (weapon, pickaxe).
    Tool,
    /// The block type the event happened on.
    BlockId,
    /// Radius of the explosion that caused the event.
    ExplosionRadius,
}

impl ParamKey {
    /// Stable lowercase name, used in diagnostics and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::ThisEntity => "this_entity",
            Self::AttackingEntity => "attacking_entity",
            Self::DamageSource => "damage_source",
            Self::Tool => "tool",
            Self::BlockId => "block_id",
            Self::ExplosionRadius => "explosion_radius",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bound parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// A world position.
    Position([f32; 3]),
    /// An entity handle.
    Entity(u64),
    /// A free-form label (damage source names and the like).
    Label(String),
    /// An item stack (the tool used).
    Stack(ItemStack),
    /// A block type.
    Block(u32),
    /// A scalar quantity (explosion radius).
    Scalar(f32),
}

/// The standard parameter contracts tables declare.
///
/// A closed set: every table names one of these, and the context builder
/// checks required and allowed keys against it at `build()` time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamSet {
    /// No parameters required or allowed.
    #[default]
    Empty,
    /// Block break: block id, origin, and tool; breaker and explosion
    /// radius optional.
    Block,
    /// Entity death: the entity, origin, and damage source; killer and
    /// tool optional.
    Entity,
    /// Container fill: origin; the opening entity optional.
    Chest,
    /// Gift event: origin and the recipient entity.
    Gift,
}

impl ParamSet {
    /// Keys that must be bound before evaluation.
    #[must_use]
    pub const fn required(self) -> &'static [ParamKey] {
        match self {
            Self::Empty => &[],
            Self::Block => &[ParamKey::BlockId, ParamKey::Origin, ParamKey::Tool],
            Self::Entity => &[
                ParamKey::ThisEntity,
                ParamKey::Origin,
                ParamKey::DamageSource,
            ],
            Self::Chest => &[ParamKey::Origin],
            Self::Gift => &[ParamKey::Origin, ParamKey::ThisEntity],
        }
    }

    /// Keys that may be bound in addition to the required ones.
    #[must_use]
    pub const fn optional(self) -> &'static [ParamKey] {
        match self {
            Self::Empty => &[],
            Self::Block => &[ParamKey::ThisEntity, ParamKey::ExplosionRadius],
            Self::Entity => &[ParamKey::AttackingEntity, ParamKey::Tool],
            Self::Chest => &[ParamKey::ThisEntity],
            Self::Gift => &[],
        }
    }

    /// Whether a key is inside this contract at all.
    #[must_use]
    pub fn allows(self, key: ParamKey) -> bool {
        self.required().contains(&key) || self.optional().contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_membership() {
        assert!(ParamSet::Block.allows(ParamKey::Tool));
        assert!(ParamSet::Block.allows(ParamKey::ExplosionRadius));
        assert!(!ParamSet::Block.allows(ParamKey::DamageSource));
        assert!(!ParamSet::Empty.allows(ParamKey::Origin));
    }

    #[test]
    fn test_required_disjoint_from_optional() {
        for set in [
            ParamSet::Empty,
            ParamSet::Block,
            ParamSet::Entity,
            ParamSet::Chest,
            ParamSet::Gift,
        ] {
            for key in set.required() {
                assert!(!set.optional().contains(key));
            }
        }
    }
}
