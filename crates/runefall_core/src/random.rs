//! # Random Source Abstraction
//!
//! Game systems draw randomness through [`RandomSource`], a small dyn-safe
//! trait. Any [`rand::RngCore`] generator qualifies via a blanket impl, so
//! production code uses [`SeededRandom`] (ChaCha8) while tests can script
//! exact draw sequences with [`ScriptedRandom`].

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// A source of game randomness.
///
/// Implementations must be deterministic for a given seed; reproducibility
/// of an evaluation is only guaranteed within one generator instance.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero; callers must guard empty ranges.
    fn next_bounded(&mut self, bound: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Fair coin flip.
    fn next_bool(&mut self) -> bool;
}

impl<R: RngCore> RandomSource for R {
    fn next_bounded(&mut self, bound: u32) -> u32 {
        self.gen_range(0..bound)
    }

    fn next_f32(&mut self) -> f32 {
        self.gen()
    }

    fn next_bool(&mut self) -> bool {
        self.gen()
    }
}

/// A seedable ChaCha8 generator.
///
/// The default generator for loot evaluation: fast, portable, and fully
/// reproducible from a 64-bit seed.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    inner: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a generator from a 64-bit seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from system entropy.
    ///
    /// Results are not reproducible; tests should use [`Self::from_seed`].
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// A scripted random source for tests (NOT FOR PRODUCTION).
///
/// Draws are served from pre-loaded queues and panic when a queue runs dry,
/// which makes "this code path consumes zero RNG draws" directly testable.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    ints: VecDeque<u32>,
    floats: VecDeque<f32>,
    bools: VecDeque<bool>,
}

impl ScriptedRandom {
    /// Creates a script with no draws at all; any draw panics.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a script serving the given bounded-integer draws in order.
    #[must_use]
    pub fn with_ints(ints: impl IntoIterator<Item = u32>) -> Self {
        Self {
            ints: ints.into_iter().collect(),
            floats: VecDeque::new(),
            bools: VecDeque::new(),
        }
    }

    /// Appends float draws to the script.
    #[must_use]
    pub fn and_floats(mut self, floats: impl IntoIterator<Item = f32>) -> Self {
        self.floats.extend(floats);
        self
    }

    /// Appends coin-flip draws to the script.
    #[must_use]
    pub fn and_bools(mut self, bools: impl IntoIterator<Item = bool>) -> Self {
        self.bools.extend(bools);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn next_bounded(&mut self, bound: u32) -> u32 {
        let value = self
            .ints
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted bounded draw (bound {bound})"));
        assert!(
            value < bound,
            "scripted draw {value} out of range for bound {bound}"
        );
        value
    }

    fn next_f32(&mut self) -> f32 {
        self.floats
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted float draw"))
    }

    fn next_bool(&mut self) -> bool {
        self.bools
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted coin flip"))
    }
}

/// Fisher-Yates shuffle over a [`RandomSource`].
pub fn shuffle<T>(items: &mut [T], random: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        #[allow(clippy::cast_possible_truncation)]
        let j = random.next_bounded(i as u32 + 1) as usize;
        items.swap(i, j);
    }
}
