//! Test utilities and fault-injecting allocators for Wisp development.
//!
//! The allocators wrap [`Global`] so that the recoverable failure contract
//! of [`WispBuf`](wisp_buf::WispBuf) can be exercised deterministically,
//! without exhausting real memory:
//!
//! - [`FailingAlloc`] refuses every request after the first N succeed.
//! - [`CountingAlloc`] records every call and refuses blocks above a size
//!   ceiling.
//!
//! Both only forward to the global allocator, which is why this crate
//! allows `unsafe` in the trait impls.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use wisp_buf::{BufAlloc, Global};

/// Allocator that succeeds for the first `budget` allocate/reallocate calls
/// and refuses all later ones. Deallocation always succeeds.
#[derive(Debug)]
pub struct FailingAlloc {
    remaining: AtomicUsize,
    refused: AtomicUsize,
}

impl FailingAlloc {
    pub fn new(budget: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(budget),
            refused: AtomicUsize::new(0),
        }
    }

    /// Allocator that refuses everything.
    pub fn exhausted() -> Self {
        Self::new(0)
    }

    /// Number of requests refused so far.
    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::Relaxed)
    }

    /// Grant `n` more successful requests.
    pub fn refill(&self, n: usize) {
        self.remaining.fetch_add(n, Ordering::Relaxed);
    }

    fn take_ticket(&self) -> bool {
        let granted = self
            .remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if !granted {
            self.refused.fetch_add(1, Ordering::Relaxed);
        }
        granted
    }
}

#[allow(unsafe_code)]
unsafe impl BufAlloc for FailingAlloc {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.take_ticket() {
            return None;
        }
        // SAFETY: forwarded caller contract.
        unsafe { Global.allocate(layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if !self.take_ticket() {
            return None;
        }
        // SAFETY: forwarded caller contract.
        unsafe { Global.reallocate(ptr, old, new_size) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { Global.deallocate(ptr, layout) }
    }
}

/// Allocator that counts calls and live bytes, and refuses any block
/// larger than `ceiling` bytes.
#[derive(Debug)]
pub struct CountingAlloc {
    ceiling: usize,
    allocations: AtomicUsize,
    reallocations: AtomicUsize,
    deallocations: AtomicUsize,
    refusals: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl CountingAlloc {
    /// Counting allocator with no practical ceiling.
    pub fn new() -> Self {
        Self::with_ceiling(1 << 30)
    }

    pub fn with_ceiling(ceiling: usize) -> Self {
        Self {
            ceiling,
            allocations: AtomicUsize::new(0),
            reallocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            refusals: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
        }
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    pub fn reallocations(&self) -> usize {
        self.reallocations.load(Ordering::Relaxed)
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    pub fn refusals(&self) -> usize {
        self.refusals.load(Ordering::Relaxed)
    }

    /// Bytes currently held in blocks (headers and terminators included).
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// allocate + reallocate calls that reached the global allocator.
    pub fn total_calls(&self) -> usize {
        self.allocations() + self.reallocations()
    }

    fn refuse(&self, size: usize) -> bool {
        if size > self.ceiling {
            self.refusals.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }
}

impl Default for CountingAlloc {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(unsafe_code)]
unsafe impl BufAlloc for CountingAlloc {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.refuse(layout.size()) {
            return None;
        }
        // SAFETY: forwarded caller contract.
        let block = unsafe { Global.allocate(layout) }?;
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
        Some(block)
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if self.refuse(new_size) {
            return None;
        }
        // SAFETY: forwarded caller contract.
        let block = unsafe { Global.reallocate(ptr, old, new_size) }?;
        self.reallocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(old.size(), Ordering::Relaxed);
        self.live_bytes.fetch_add(new_size, Ordering::Relaxed);
        Some(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
        // SAFETY: forwarded caller contract.
        unsafe { Global.deallocate(ptr, layout) }
    }
}
