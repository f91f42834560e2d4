use thiserror::Error;

use crate::phase::Phase;

/// Failures surfaced by [`LatticeRelation`](crate::LatticeRelation).
///
/// None of these are retried; after any of them the instance should not be
/// trusted any further.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// An absent key was handed to `put` or `get`.
    #[error("key passed to `{operation}` must not be null")]
    NullKey { operation: &'static str },

    /// The order's successor relation loops back on itself.
    #[error("cycle in graph generated by {order} (through key {key})")]
    CycleDetected { order: String, key: String },

    /// `put` while readable, or `get` while writable.
    #[error("lattice is {actual}, operation requires it to be {expected}")]
    PhaseViolation { expected: Phase, actual: Phase },
}

pub type Result<T> = std::result::Result<T, LatticeError>;
