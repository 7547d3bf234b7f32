//! # Loot Error Types
//!
//! Only programmer-facing contract violations surface as errors: binding the
//! wrong parameters when building a context, or reading one that was never
//! bound. Data-driven problems (bad references, cycles) are reported through
//! the validation collector or logged at runtime instead - gameplay must
//! degrade gracefully, development-time misuse should fail fast.

use crate::params::ParamKey;
use thiserror::Error;

/// Errors raised by the loot engine's caller-facing contracts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LootError {
    /// A parameter required by the table's contract was never bound.
    #[error("required loot parameter '{0}' was not bound")]
    MissingParameter(ParamKey),

    /// A parameter outside the table's contract was bound.
    #[error("loot parameter '{0}' is not allowed by the table's contract")]
    UnexpectedParameter(ParamKey),

    /// A permitted-but-optional parameter was read without being bound.
    #[error("loot parameter '{0}' is permitted but was not bound")]
    ParameterNotBound(ParamKey),
}

/// Result type for loot operations.
pub type LootResult<T> = Result<T, LootError>;
