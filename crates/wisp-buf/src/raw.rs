//! Block layout: `[Header][data; cap][terminator]`.
//!
//! This is the only module that does pointer arithmetic. A data pointer
//! handed out by [`reallocate`] always sits exactly [`HEADER_SIZE`] bytes
//! past the start of its block, so the header is recovered by stepping
//! back. Every `unsafe` block states the invariant it relies on.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::mem;
use std::ptr::NonNull;

use crate::alloc::BufAlloc;

/// Metadata stored immediately before the data bytes.
#[repr(C)]
pub(crate) struct Header {
    pub(crate) len: usize,
    pub(crate) cap: usize,
}

/// Size of the hidden header preceding the data.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Alignment of every block (and therefore of every data pointer).
pub const HEADER_ALIGN: usize = mem::align_of::<Header>();

/// Largest capacity a buffer may hold.
///
/// A block is `HEADER_SIZE + cap + 1` bytes and no layout may exceed
/// `isize::MAX` once rounded up to [`HEADER_ALIGN`].
pub const CAP_MAX: usize = isize::MAX as usize - HEADER_SIZE - HEADER_ALIGN;

/// Layout of a block holding `cap` data bytes, or `None` past [`CAP_MAX`].
pub(crate) fn layout_for(cap: usize) -> Option<Layout> {
    if cap > CAP_MAX {
        return None;
    }
    Layout::from_size_align(HEADER_SIZE + cap + 1, HEADER_ALIGN).ok()
}

/// Header of the block owning `data`.
///
/// # Safety
///
/// `data` must be a live data pointer returned by [`reallocate`].
pub(crate) unsafe fn header(data: NonNull<u8>) -> NonNull<Header> {
    // SAFETY: data is HEADER_SIZE bytes into its block.
    unsafe { data.sub(HEADER_SIZE).cast() }
}

fn data_of(hdr: NonNull<Header>) -> NonNull<u8> {
    // SAFETY: every block is at least HEADER_SIZE + 1 bytes, so one past
    // the header is still in bounds.
    unsafe { hdr.add(1).cast() }
}

/// Current `(len, cap)`.
///
/// # Safety
///
/// `data` must be a live data pointer returned by [`reallocate`].
pub(crate) unsafe fn len_cap(data: NonNull<u8>) -> (usize, usize) {
    // SAFETY: the header was initialised when the block was created.
    let hdr = unsafe { header(data).as_ref() };
    (hdr.len, hdr.cap)
}

/// Overwrite the stored length.
///
/// # Safety
///
/// `data` must be a live data pointer returned by [`reallocate`].
pub(crate) unsafe fn set_len(data: NonNull<u8>, len: usize) {
    // SAFETY: exclusive access is guaranteed by the caller's `&mut`.
    unsafe { header(data).as_mut().len = len };
}

/// Write the zero terminator at offset `at`.
///
/// # Safety
///
/// `data` must be live and `at <= cap`.
pub(crate) unsafe fn terminate(data: NonNull<u8>, at: usize) {
    // SAFETY: the block reserves cap + 1 data bytes.
    unsafe { data.add(at).write(0) };
}

/// Resize (or create) a block so it holds exactly `new_cap` data bytes.
///
/// With `Some(data)` the block is resized in place or moved; the bytes and
/// `len` are preserved and `cap` is updated. If the allocator refuses, the
/// old block is released and `None` is returned. With `None` a fresh block
/// is created with `len = 0` and a terminator at offset 0.
///
/// # Safety
///
/// `data`, if present, must be a live data pointer returned by this
/// function with the same allocator, and `new_cap` must not be below its
/// current `len`.
pub(crate) unsafe fn reallocate<A: BufAlloc>(
    alloc: &A,
    data: Option<NonNull<u8>>,
    new_cap: usize,
) -> Option<NonNull<u8>> {
    let Some(new_layout) = layout_for(new_cap) else {
        if let Some(data) = data {
            // SAFETY: forwarded caller contract.
            unsafe { release(alloc, data) };
        }
        return None;
    };
    match data {
        Some(data) => {
            // SAFETY: data is live; its cap passed layout_for when created.
            let (old_layout, hdr) = unsafe { (block_layout(data), header(data)) };
            // SAFETY: the block came from `alloc` with `old_layout`; the new
            // size is non-zero and bounded by CAP_MAX.
            match unsafe { alloc.reallocate(hdr.cast(), old_layout, new_layout.size()) } {
                Some(block) => {
                    let mut hdr = block.cast::<Header>();
                    // SAFETY: realloc preserved the initialised header.
                    unsafe { hdr.as_mut().cap = new_cap };
                    Some(data_of(hdr))
                }
                None => {
                    // SAFETY: a refused reallocation leaves the old block ours.
                    unsafe { alloc.deallocate(hdr.cast(), old_layout) };
                    None
                }
            }
        }
        None => {
            // SAFETY: the layout always includes the header, so it is non-zero.
            let block = unsafe { alloc.allocate(new_layout) }?;
            let hdr = block.cast::<Header>();
            // SAFETY: the block is fresh, aligned for Header and large enough.
            unsafe { hdr.as_ptr().write(Header { len: 0, cap: new_cap }) };
            let data = data_of(hdr);
            // SAFETY: offset 0 <= cap.
            unsafe { terminate(data, 0) };
            Some(data)
        }
    }
}

/// Release the block owning `data`.
///
/// # Safety
///
/// `data` must be a live data pointer returned by [`reallocate`] with the
/// same allocator; it is dangling afterwards.
pub(crate) unsafe fn release<A: BufAlloc>(alloc: &A, data: NonNull<u8>) {
    // SAFETY: forwarded caller contract.
    unsafe {
        let layout = block_layout(data);
        alloc.deallocate(header(data).cast(), layout);
    }
}

/// # Safety
///
/// `data` must be live.
unsafe fn block_layout(data: NonNull<u8>) -> Layout {
    // SAFETY: cap <= CAP_MAX was checked when the block was sized, so the
    // layout is valid.
    unsafe {
        let (_, cap) = len_cap(data);
        Layout::from_size_align_unchecked(HEADER_SIZE + cap + 1, HEADER_ALIGN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Global;

    #[test]
    fn header_is_two_words() {
        assert_eq!(HEADER_SIZE, 2 * mem::size_of::<usize>());
        assert_eq!(HEADER_ALIGN, mem::align_of::<usize>());
    }

    #[test]
    fn layout_for_includes_header_and_terminator() {
        let layout = layout_for(10).unwrap();
        assert_eq!(layout.size(), HEADER_SIZE + 11);
        assert_eq!(layout.align(), HEADER_ALIGN);
    }

    #[test]
    fn layout_for_cap_max_is_valid_and_beyond_is_not() {
        assert!(layout_for(CAP_MAX).is_some());
        assert!(layout_for(CAP_MAX + 1).is_none());
        assert!(layout_for(usize::MAX).is_none());
    }

    #[test]
    fn fresh_block_is_empty_and_terminated() {
        unsafe {
            let data = reallocate(&Global, None, 8).unwrap();
            assert_eq!(len_cap(data), (0, 8));
            assert_eq!(data.as_ptr().read(), 0);
            assert_eq!(data.as_ptr() as usize % HEADER_ALIGN, 0);
            release(&Global, data);
        }
    }

    #[test]
    fn grow_preserves_bytes_and_len() {
        unsafe {
            let data = reallocate(&Global, None, 3).unwrap();
            std::ptr::copy_nonoverlapping(b"abc".as_ptr(), data.as_ptr(), 3);
            set_len(data, 3);
            terminate(data, 3);
            let data = reallocate(&Global, Some(data), 100).unwrap();
            assert_eq!(len_cap(data), (3, 100));
            assert_eq!(std::slice::from_raw_parts(data.as_ptr(), 4), b"abc\0");
            release(&Global, data);
        }
    }
}
