//! The owning buffer handle and its core mutators.
//!
//! [`WispBuf`] is pointer-sized (for a zero-sized allocator): either null,
//! the distinguished empty value that owns nothing, or a pointer to the data
//! bytes of one block laid out by the `raw` module. Mutators take
//! `&mut self`, which is the handle's "pointer to handle": any call that may
//! allocate can move the block, and on failure leaves the handle null.

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};
use std::fmt;
use std::mem::{self, ManuallyDrop, MaybeUninit};
use std::ops::Deref;
use std::ptr::{self, NonNull};
use std::slice;

use wisp_core::WispError;

use crate::alloc::{BufAlloc, Global};
use crate::raw;

/// A growable, zero-terminated byte string with a hidden length/capacity
/// header.
///
/// # Invariants (non-null handle)
///
/// - `len() <= capacity() <= CAP_MAX`
/// - the byte at offset `len()` is `0`
/// - the block is exactly `HEADER_SIZE + capacity() + 1` bytes
///
/// A null handle reports length 0 and capacity 0 and holds no memory.
pub struct WispBuf<A: BufAlloc = Global> {
    pub(crate) data: Option<NonNull<u8>>,
    pub(crate) alloc: A,
}

// SAFETY: the block is uniquely owned by the handle; moving the handle
// moves ownership of the block along with the allocator.
unsafe impl<A: BufAlloc + Send> Send for WispBuf<A> {}
// SAFETY: shared references only read; every mutation requires `&mut`.
unsafe impl<A: BufAlloc + Sync> Sync for WispBuf<A> {}

impl WispBuf<Global> {
    /// A null handle using the global allocator. Does not allocate.
    pub const fn new() -> Self {
        Self {
            data: None,
            alloc: Global,
        }
    }

    /// A handle with room for `cap` bytes, using the global allocator.
    pub fn with_capacity(cap: usize) -> Result<Self, WispError> {
        Self::with_capacity_in(cap, Global)
    }

    /// Give up ownership, returning the data pointer as a C string.
    ///
    /// Null for a null handle. Reclaim with [`WispBuf::from_raw`].
    pub fn into_raw(self) -> *mut c_char {
        let this = ManuallyDrop::new(self);
        this.data
            .map_or(ptr::null_mut(), |data| data.as_ptr().cast::<c_char>())
    }

    /// Retake ownership of a pointer produced by [`WispBuf::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must be null or have come from `into_raw` (or from a `wisp-ffi`
    /// function) and must not be owned by any other handle.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        Self {
            data: NonNull::new(ptr.cast::<u8>()),
            alloc: Global,
        }
    }
}

impl<A: BufAlloc> WispBuf<A> {
    /// A null handle that will allocate from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self { data: None, alloc }
    }

    /// A handle with room for `cap` bytes allocated from `alloc`.
    pub fn with_capacity_in(cap: usize, alloc: A) -> Result<Self, WispError> {
        let mut buf = Self::new_in(alloc);
        buf.ensure_capacity(cap)?;
        Ok(buf)
    }

    /// The allocator backing this handle.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    // ── Accessors ─────────────────────────────────────────────────────

    /// Whether this is the null handle.
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Number of meaningful bytes (0 for a null handle).
    pub fn len(&self) -> usize {
        self.len_cap().0
    }

    /// Whether the length is zero (null or not).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes reserved for data, excluding the terminator (0 when null).
    pub fn capacity(&self) -> usize {
        self.len_cap().1
    }

    /// `(len, capacity)` in one header read; `(0, 0)` when null.
    pub fn len_cap(&self) -> (usize, usize) {
        match self.data {
            // SAFETY: a Some data pointer is always live.
            Some(data) => unsafe { raw::len_cap(data) },
            None => (0, 0),
        }
    }

    /// `capacity() - len()`: bytes that can be appended without moving.
    pub fn available(&self) -> usize {
        let (len, cap) = self.len_cap();
        cap - len
    }

    /// The meaningful bytes, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        match self.data {
            // SAFETY: len bytes starting at data are initialised.
            Some(data) => unsafe { slice::from_raw_parts(data.as_ptr(), self.len()) },
            None => &[],
        }
    }

    /// The meaningful bytes followed by the terminator.
    ///
    /// A null handle reads as a lone terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        match self.data {
            // SAFETY: the terminator at offset len is always written.
            Some(data) => unsafe { slice::from_raw_parts(data.as_ptr(), self.len() + 1) },
            None => &[0],
        }
    }

    /// Mutable view of the meaningful bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.data {
            // SAFETY: len bytes are initialised and `&mut self` is exclusive.
            Some(data) => unsafe { slice::from_raw_parts_mut(data.as_ptr(), self.len()) },
            None => &mut [],
        }
    }

    /// The contents as a C string, ending at the first zero byte.
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.as_bytes_with_nul()).unwrap_or_default()
    }

    /// Data pointer usable as a `const char *`; null for a null handle.
    pub fn as_ptr(&self) -> *const c_char {
        self.data
            .map_or(ptr::null(), |data| data.as_ptr().cast_const().cast::<c_char>())
    }

    /// Raw mutable data pointer; null for a null handle.
    pub fn as_mut_ptr(&mut self) -> *mut c_char {
        self.data
            .map_or(ptr::null_mut(), |data| data.as_ptr().cast::<c_char>())
    }

    /// The reserved region after the meaningful bytes, terminator slot
    /// included (`available() + 1` bytes; empty when null).
    ///
    /// Write here after [`ensure_capacity`](Self::ensure_capacity) or
    /// [`make_room_for`](Self::make_room_for), then commit with
    /// [`poke_len`](Self::poke_len).
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        let (len, cap) = self.len_cap();
        match self.data {
            // SAFETY: the block holds cap + 1 data bytes; MaybeUninit
            // tolerates the uninitialised tail.
            Some(data) => unsafe {
                slice::from_raw_parts_mut(
                    data.as_ptr().add(len).cast::<MaybeUninit<u8>>(),
                    cap - len + 1,
                )
            },
            None => &mut [],
        }
    }

    // ── Mutators ──────────────────────────────────────────────────────

    /// Replace the contents with `src`.
    pub fn put(&mut self, src: &[u8]) -> Result<(), WispError> {
        self.ensure_capacity(src.len())?;
        if let Some(data) = self.data {
            // SAFETY: capacity >= src.len(); `&mut self` and `src` cannot
            // overlap.
            unsafe {
                ptr::copy_nonoverlapping(src.as_ptr(), data.as_ptr(), src.len());
            }
            self.commit_len(src.len());
        }
        Ok(())
    }

    /// Replace the contents with the bytes of `src`.
    pub fn put_str(&mut self, src: &str) -> Result<(), WispError> {
        self.put(src.as_bytes())
    }

    /// Replace the contents with a copy of another buffer's bytes.
    ///
    /// A null `other` leaves `self` untouched.
    pub fn put_buf<B: BufAlloc>(&mut self, other: &WispBuf<B>) -> Result<(), WispError> {
        if other.is_null() {
            return Ok(());
        }
        self.put(other.as_bytes())
    }

    /// Append `src`.
    pub fn cat(&mut self, src: &[u8]) -> Result<(), WispError> {
        self.make_room_for(src.len())?;
        if let Some(data) = self.data {
            let len = self.len();
            // SAFETY: capacity >= len + src.len() after make_room_for.
            unsafe {
                ptr::copy_nonoverlapping(src.as_ptr(), data.as_ptr().add(len), src.len());
            }
            self.commit_len(len + src.len());
        }
        Ok(())
    }

    /// Append the bytes of `src`.
    pub fn cat_str(&mut self, src: &str) -> Result<(), WispError> {
        self.cat(src.as_bytes())
    }

    /// Append a copy of another buffer's bytes.
    ///
    /// A null `other` leaves `self` untouched.
    pub fn cat_buf<B: BufAlloc>(&mut self, other: &WispBuf<B>) -> Result<(), WispError> {
        if other.is_null() {
            return Ok(());
        }
        self.cat(other.as_bytes())
    }

    /// Set the length to zero, keeping the allocation. No-op when null.
    pub fn clear(&mut self) {
        if self.data.is_some() {
            self.commit_len(0);
        }
    }

    /// Release the allocation. Equivalent to dropping the handle.
    pub fn free(self) {
        drop(self);
    }

    /// Release the allocation and leave this handle null.
    ///
    /// Safe to call any number of times.
    pub fn take_and_null(&mut self) {
        if let Some(data) = self.data.take() {
            // SAFETY: data was live and is no longer reachable from self.
            unsafe { raw::release(&self.alloc, data) };
        }
    }

    /// Exchange two handles. Never allocates.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Overwrite the stored length without touching the bytes or the
    /// terminator. No-op on a null handle.
    ///
    /// # Safety
    ///
    /// `len` must not exceed [`capacity`](Self::capacity), the first `len`
    /// bytes must be initialised, and the caller must write a zero at offset
    /// `len` before the buffer is read as a C string.
    pub unsafe fn poke_len(&mut self, len: usize) {
        if let Some(data) = self.data {
            debug_assert!(len <= self.capacity(), "poke_len past capacity");
            // SAFETY: data is live.
            unsafe { raw::set_len(data, len) };
        }
    }

    /// An independent copy allocated from a clone of this allocator.
    pub fn try_clone(&self) -> Result<Self, WispError>
    where
        A: Clone,
    {
        let mut out = Self::new_in(self.alloc.clone());
        if !self.is_null() {
            out.put(self.as_bytes())?;
        }
        Ok(out)
    }

    /// Store `len` and write the terminator there.
    pub(crate) fn commit_len(&mut self, len: usize) {
        if let Some(data) = self.data {
            debug_assert!(len <= self.capacity(), "length {len} past capacity");
            // SAFETY: data is live and len <= cap.
            unsafe {
                raw::set_len(data, len);
                raw::terminate(data, len);
            }
        }
    }
}

impl<A: BufAlloc> Drop for WispBuf<A> {
    fn drop(&mut self) {
        self.take_and_null();
    }
}

impl<A: BufAlloc + Default> Default for WispBuf<A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<A: BufAlloc> Deref for WispBuf<A> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: BufAlloc> AsRef<[u8]> for WispBuf<A> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: BufAlloc> fmt::Debug for WispBuf<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("WispBuf(null)");
        }
        let (len, cap) = self.len_cap();
        f.debug_struct("WispBuf")
            .field("len", &len)
            .field("cap", &cap)
            .field(
                "bytes",
                &format_args!("\"{}\"", self.as_bytes().escape_ascii()),
            )
            .finish()
    }
}

/// Appends; a failed append leaves the handle null and reports
/// [`fmt::Error`].
impl<A: BufAlloc> fmt::Write for WispBuf<A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.cat(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl<A: BufAlloc, B: BufAlloc> PartialEq<WispBuf<B>> for WispBuf<A> {
    fn eq(&self, other: &WispBuf<B>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: BufAlloc> Eq for WispBuf<A> {}

impl<A: BufAlloc> PartialEq<[u8]> for WispBuf<A> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl<A: BufAlloc> PartialEq<&[u8]> for WispBuf<A> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<A: BufAlloc, const N: usize> PartialEq<&[u8; N]> for WispBuf<A> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == other.as_slice()
    }
}

impl<A: BufAlloc> PartialEq<str> for WispBuf<A> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: BufAlloc> PartialEq<&str> for WispBuf<A> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl TryFrom<&[u8]> for WispBuf<Global> {
    type Error = WispError;

    fn try_from(src: &[u8]) -> Result<Self, WispError> {
        let mut buf = Self::new();
        buf.put(src)?;
        Ok(buf)
    }
}

impl TryFrom<&str> for WispBuf<Global> {
    type Error = WispError;

    fn try_from(src: &str) -> Result<Self, WispError> {
        Self::try_from(src.as_bytes())
    }
}
