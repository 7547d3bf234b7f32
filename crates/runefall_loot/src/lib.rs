//! # RUNEFALL Loot Engine
//!
//! Data-driven randomized loot generation for the RUNEFALL game engine.
//!
//! ## Design Principles
//!
//! 1. **Immutable table graphs** - Tables, pools, entries, predicates, and
//!    functions are built once at load time and shared as `Arc`s across
//!    concurrent evaluations without locking
//! 2. **Reproducible randomness** - Every draw goes through an injectable
//!    [`RandomSource`](runefall_core::RandomSource); a seeded source replays
//!    an evaluation exactly
//! 3. **Graceful degradation** - Data bugs (cycles, dangling references)
//!    log and skip; only programmer-facing contract violations return errors
//! 4. **Closed dispatch** - Entry, predicate, function, and number-provider
//!    variants are sum types matched exhaustively, not trait objects
//!
//! ## Example
//!
//! ```rust,ignore
//! use runefall_loot::{LootContext, LootTable, ParamSet, TableKey};
//!
//! let table = env.tables().resolve(&TableKey::new("chests/stronghold"));
//! let mut ctx = LootContext::builder(&env)
//!     .with_seed(world_seed)
//!     .with_luck(player_luck)
//!     .build(ParamSet::Chest)?;
//! let drops = LootTable::collect_items(&table, &mut ctx);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod context;
pub mod entry;
pub mod error;
mod fill;
pub mod function;
pub mod params;
pub mod pool;
pub mod predicate;
pub mod provider;
pub mod registry;
pub mod stats;
pub mod table;
pub mod validate;

pub use context::{DynamicDropFn, LootContext, LootContextBuilder, StackConsumer};
pub use entry::{Candidate, LeafEntry, LeafPayload, LootEntry};
pub use error::{LootError, LootResult};
pub use function::LootFunction;
pub use params::{ParamKey, ParamSet, ParamValue};
pub use pool::LootPool;
pub use predicate::LootPredicate;
pub use provider::NumberProvider;
pub use registry::{ConditionKey, ConditionRegistry, DropKey, LootEnv, TableKey, TableRegistry};
pub use stats::LootStatistics;
pub use table::LootTable;
pub use validate::{validate_all, ProblemReporter, ValidationContext};
