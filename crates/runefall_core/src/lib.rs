//! # RUNEFALL Core Primitives
//!
//! Shared building blocks for the RUNEFALL game systems:
//! - Item identity, item stacks, and per-item stack-size limits
//! - The container (slot inventory) abstraction
//! - A seedable random-source abstraction with test doubles
//!
//! ## Architecture Rules
//!
//! 1. **Determinism on demand** - every random source is seedable, so any
//!    game-system evaluation can be replayed bit-for-bit
//! 2. **No hidden globals** - randomness is always passed in, never reached
//!    for through thread-local state
//! 3. **Cheap values** - the hot types (`ItemStack`) are `Copy`

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod container;
pub mod item;
pub mod random;

pub use container::{Container, SlotContainer};
pub use item::{ItemCatalog, ItemId, ItemStack, DEFAULT_MAX_STACK};
pub use random::{shuffle, RandomSource, ScriptedRandom, SeededRandom};
