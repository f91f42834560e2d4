use std::fmt;

use crate::error::{LatticeError, Result};

/// Read/write mode of a lattice.
///
/// Writes and reads are batched: cached aggregates are invalidated once when
/// going back to [`Phase::Writable`], never per insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Writable,
    Readable,
}

impl Phase {
    pub fn ensure_writable(self) -> Result<()> {
        self.ensure(Phase::Writable)
    }

    pub fn ensure_readable(self) -> Result<()> {
        self.ensure(Phase::Readable)
    }

    fn ensure(self, expected: Phase) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(LatticeError::PhaseViolation { expected, actual: self })
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Writable => f.write_str("writable"),
            Phase::Readable => f.write_str("readable"),
        }
    }
}
