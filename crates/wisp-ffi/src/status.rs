//! C-compatible status codes.
//!
//! [`WispStatus`] is a `repr(i32)` enum returned by every mutating entry
//! point. `Ok` is 0 and every failure is negative; the values are
//! ABI-stable.

use wisp_core::WispError;

/// Status code returned by the `wisp_*` mutators.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WispStatus {
    /// Success.
    Ok = 0,
    /// A required pointer was null or a length was out of range.
    InvalidArgument = -1,
    /// The allocator refused the request. The handle is now null.
    AllocationFailed = -2,
    /// The requested capacity exceeds the maximum. The handle is now null.
    CapacityOverflow = -3,
    /// A Rust panic was caught at the boundary.
    Panicked = -128,
}

impl From<&WispError> for WispStatus {
    fn from(e: &WispError) -> Self {
        match e {
            WispError::CapacityOverflow { .. } => WispStatus::CapacityOverflow,
            WispError::AllocationFailed { .. } => WispStatus::AllocationFailed,
        }
    }
}

impl WispStatus {
    /// Status code for the outcome of a buffer operation.
    pub fn of(result: Result<(), WispError>) -> i32 {
        match result {
            Ok(()) => WispStatus::Ok as i32,
            Err(e) => WispStatus::from(&e) as i32,
        }
    }
}
