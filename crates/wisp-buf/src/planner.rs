//! Capacity planning: exact-fit growth with overflow checks.
//!
//! Neither entry point rounds up. A caller expecting many small appends
//! reserves once up front with [`WispBuf::ensure_capacity`] or
//! [`WispBuf::make_room_for`]; afterwards appends that fit never allocate.
//!
//! Both entry points are fail-fast: a request that cannot be represented or
//! allocated releases the existing block and nulls the handle rather than
//! leaving a truncated string behind.

use wisp_core::WispError;

use crate::alloc::BufAlloc;
use crate::buffer::WispBuf;
use crate::raw::{self, CAP_MAX};

impl<A: BufAlloc> WispBuf<A> {
    /// Guarantee room for at least `new_cap` data bytes, regardless of the
    /// current length.
    ///
    /// Does nothing when the capacity already suffices, so capacity never
    /// decreases. A null handle gets a fresh, empty block.
    ///
    /// # Errors
    ///
    /// [`WispError::CapacityOverflow`] if `new_cap > CAP_MAX`, or
    /// [`WispError::AllocationFailed`]; in both cases the handle is null
    /// afterwards.
    pub fn ensure_capacity(&mut self, new_cap: usize) -> Result<(), WispError> {
        if new_cap > CAP_MAX {
            self.discard("ensure_capacity", new_cap);
            return Err(WispError::CapacityOverflow {
                requested: new_cap,
                max: CAP_MAX,
            });
        }
        if self.data.is_some() && self.capacity() >= new_cap {
            return Ok(());
        }
        self.resize_exact(new_cap)
    }

    /// Guarantee room for `add_len` more bytes beyond the current length.
    ///
    /// Only adjusts the allocation; the length and terminator are left
    /// alone.
    ///
    /// # Errors
    ///
    /// [`WispError::CapacityOverflow`] if `len() + add_len` exceeds
    /// `CAP_MAX` (checked without wrapping), or
    /// [`WispError::AllocationFailed`]; in both cases the handle is null
    /// afterwards.
    pub fn make_room_for(&mut self, add_len: usize) -> Result<(), WispError> {
        let (len, cap) = self.len_cap();
        if add_len > CAP_MAX || len > CAP_MAX - add_len {
            self.discard("make_room_for", len.saturating_add(add_len));
            return Err(WispError::CapacityOverflow {
                requested: len.saturating_add(add_len),
                max: CAP_MAX,
            });
        }
        let new_cap = len + add_len;
        if self.data.is_some() && cap >= new_cap {
            return Ok(());
        }
        self.resize_exact(new_cap)
    }

    fn resize_exact(&mut self, new_cap: usize) -> Result<(), WispError> {
        let old_cap = self.capacity();
        // SAFETY: `data` is live and owned by `alloc`; callers only grow,
        // so new_cap >= len.
        #[allow(unsafe_code)]
        let resized = unsafe { raw::reallocate(&self.alloc, self.data.take(), new_cap) };
        match resized {
            Some(data) => {
                tracing::trace!(old_cap, new_cap, "buffer resized");
                self.data = Some(data);
                Ok(())
            }
            None => {
                tracing::debug!(
                    requested = new_cap,
                    old_cap,
                    "allocation refused; buffer released"
                );
                Err(WispError::AllocationFailed { capacity: new_cap })
            }
        }
    }

    fn discard(&mut self, op: &'static str, requested: usize) {
        let (len, cap) = self.len_cap();
        tracing::debug!(
            op,
            requested,
            len,
            cap,
            max = CAP_MAX,
            "capacity overflow; buffer released"
        );
        self.take_and_null();
    }
}
