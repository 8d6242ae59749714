//! Allocator seam for buffer blocks.
//!
//! Buffers never call the global allocator directly; they go through a
//! [`BufAlloc`] so that a refused allocation is an ordinary `None` rather
//! than a process abort. [`Global`] forwards to `std::alloc`, whose raw
//! functions report failure by returning null.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

/// Raw block allocator used by [`WispBuf`](crate::WispBuf).
///
/// # Safety
///
/// Implementations must behave like `std::alloc`: a returned pointer is
/// valid for reads and writes of `layout.size()` bytes and aligned to
/// `layout.align()`, a successful `reallocate` preserves the first
/// `min(old.size(), new_size)` bytes, and a failed `reallocate` leaves the
/// original block untouched and still owned by the caller.
pub unsafe trait BufAlloc {
    /// Allocate a block for `layout`, or `None` if memory is unavailable.
    ///
    /// # Safety
    ///
    /// `layout.size()` must be non-zero.
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Resize the block at `ptr` to `new_size` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `old`, `new_size`
    /// must be non-zero, and `new_size` rounded up to `old.align()` must not
    /// exceed `isize::MAX`.
    unsafe fn reallocate(&self, ptr: NonNull<u8>, old: Layout, new_size: usize)
        -> Option<NonNull<u8>>;

    /// Release the block at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `layout` and not
    /// released since.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl BufAlloc for Global {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: the caller guarantees a non-zero size.
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded caller contract of `BufAlloc::reallocate`.
        NonNull::new(unsafe { std::alloc::realloc(ptr.as_ptr(), old, new_size) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract of `BufAlloc::deallocate`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// Shared references to an allocator allocate from the same allocator.
unsafe impl<A: BufAlloc + ?Sized> BufAlloc for &A {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: forwarded.
        unsafe { (**self).allocate(layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded.
        unsafe { (**self).reallocate(ptr, old, new_size) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
