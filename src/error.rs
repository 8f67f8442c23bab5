//! Allocation failure, the only error the table reports.

use core::fmt;
use std::collections::TryReserveError;
use thiserror::Error;

/// What the table was trying to allocate when it failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Allocation {
    /// A fresh slot array (initial, grown or shrunk).
    SlotArray { capacity: usize },
    /// The table's own copy of a key.
    Key { len: usize },
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allocation::SlotArray { capacity } => write!(f, "slot array of {capacity} slots"),
            Allocation::Key { len } => write!(f, "key copy of {len} bytes"),
        }
    }
}

/// Storage for the slot array or a key copy could not be obtained.
///
/// The table is left exactly as it was before the failing call.
#[derive(Debug, Error)]
#[error("allocation failed: {what}")]
pub struct AllocError {
    what: Allocation,
    #[source]
    source: Option<TryReserveError>,
}

impl AllocError {
    pub(crate) fn slot_array(capacity: usize, source: TryReserveError) -> Self {
        Self {
            what: Allocation::SlotArray { capacity },
            source: Some(source),
        }
    }

    /// Doubling the capacity would overflow `usize`.
    pub(crate) fn capacity_overflow(capacity: usize) -> Self {
        Self {
            what: Allocation::SlotArray {
                capacity: capacity.saturating_mul(2),
            },
            source: None,
        }
    }

    pub(crate) fn key(len: usize, source: TryReserveError) -> Self {
        Self {
            what: Allocation::Key { len },
            source: Some(source),
        }
    }

    pub fn allocation(&self) -> Allocation {
        self.what
    }
}
