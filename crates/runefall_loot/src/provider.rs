//! # Number Providers
//!
//! Roll counts, item counts, and thresholds are dynamic: a provider may be a
//! constant or may depend on the context (randomness, luck). Providers are a
//! closed sum type dispatched by pattern matching.

use crate::context::LootContext;
use crate::validate::ValidationContext;
use serde::{Deserialize, Serialize};

/// A context-dependent number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NumberProvider {
    /// A fixed value.
    Constant(f32),
    /// Uniform in `[min, max]` (integer evaluation uses the floored bounds,
    /// inclusive).
    Uniform {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// Number of successes in `n` trials of probability `p`.
    Binomial {
        /// Trial count.
        n: u32,
        /// Per-trial success probability.
        p: f32,
    },
    /// `base + per_luck * luck`; draws nothing from the random source.
    ScaledByLuck {
        /// Value at luck zero.
        base: f32,
        /// Slope per point of luck.
        per_luck: f32,
    },
}

impl NumberProvider {
    /// Evaluates as a float.
    pub fn as_f32(&self, ctx: &mut LootContext<'_>) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Uniform { min, max } => {
                if max <= min {
                    *min
                } else {
                    min + ctx.random().next_f32() * (max - min)
                }
            }
            #[allow(clippy::cast_precision_loss)]
            Self::Binomial { .. } => self.as_i32(ctx) as f32,
            Self::ScaledByLuck { base, per_luck } => base + per_luck * ctx.luck(),
        }
    }

    /// Evaluates as an integer (floored).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_i32(&self, ctx: &mut LootContext<'_>) -> i32 {
        match self {
            Self::Constant(value) => value.floor() as i32,
            Self::Uniform { min, max } => {
                let lo = min.floor() as i32;
                let hi = max.floor() as i32;
                if hi <= lo {
                    lo
                } else {
                    lo + ctx.random().next_bounded((hi - lo + 1) as u32) as i32
                }
            }
            Self::Binomial { n, p } => {
                let mut successes = 0;
                for _ in 0..*n {
                    if ctx.random().next_f32() < *p {
                        successes += 1;
                    }
                }
                successes
            }
            Self::ScaledByLuck { base, per_luck } => (base + per_luck * ctx.luck()).floor() as i32,
        }
    }

    /// Reports structural problems: negative constants or ranges that a
    /// runtime roll count would silently clamp away, and probabilities
    /// outside `[0, 1]`.
    pub fn validate(&self, ctx: &ValidationContext<'_>) {
        match self {
            Self::Constant(value) => {
                if *value < 0.0 {
                    ctx.report(format!("negative constant {value}"));
                }
            }
            Self::Uniform { min, max } => {
                if min > max {
                    ctx.report(format!("inverted range [{min}, {max}]"));
                }
                if *max < 0.0 {
                    ctx.report(format!("negative range [{min}, {max}]"));
                }
            }
            Self::Binomial { p, .. } => {
                if !(0.0..=1.0).contains(p) {
                    ctx.report(format!("probability {p} outside [0, 1]"));
                }
            }
            Self::ScaledByLuck { base, .. } => {
                if *base < 0.0 {
                    ctx.report(format!("negative base {base}"));
                }
            }
        }
    }
}
