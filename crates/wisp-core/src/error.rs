//! Error types for Wisp buffer operations.
//!
//! There are exactly two operating failures: the requested capacity cannot
//! be represented, or the allocator refused the request. Both leave the
//! handle null; the error value only explains why.

use std::error::Error;
use std::fmt;

/// Errors from operations that may allocate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WispError {
    /// The requested capacity exceeds the largest representable capacity.
    ///
    /// Raised before any allocation is attempted, including when
    /// `length + additional` would overflow.
    CapacityOverflow {
        /// Capacity that was asked for (saturated at `usize::MAX`).
        requested: usize,
        /// Largest capacity a buffer may hold.
        max: usize,
    },
    /// The allocator could not provide the block.
    AllocationFailed {
        /// Data capacity of the block that could not be allocated.
        capacity: usize,
    },
}

impl WispError {
    /// Capacity that triggered the failure.
    pub fn requested(&self) -> usize {
        match self {
            Self::CapacityOverflow { requested, .. } => *requested,
            Self::AllocationFailed { capacity } => *capacity,
        }
    }
}

impl fmt::Display for WispError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested, max } => {
                write!(
                    f,
                    "capacity overflow: requested {requested} bytes, maximum {max} bytes"
                )
            }
            Self::AllocationFailed { capacity } => {
                write!(f, "allocation failed for capacity {capacity} bytes")
            }
        }
    }
}

impl Error for WispError {}
