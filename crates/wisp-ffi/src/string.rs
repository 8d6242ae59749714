//! String entry points: replace, append, capacity, housekeeping, queries.
//!
//! Mutators take `char **` and write the (possibly moved or nulled) data
//! pointer back before returning, including when a panic unwinds out of the
//! body. Queries take `const char *` and treat null as an empty string.
//!
//! A source pointer that reaches into the destination block is rejected
//! with `InvalidArgument`, except by `wisp_putwisp` and `wisp_catwisp`,
//! which accept the destination itself as their source.

#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::{ptr, slice};

use wisp_buf::WispBuf;

use crate::status::WispStatus;

const INVALID: i32 = WispStatus::InvalidArgument as i32;

/// A caller's `char *` slot opened as an owned handle.
///
/// Dropping the slot stores the handle's current pointer back.
struct Slot {
    slot: *mut *mut c_char,
    buf: ManuallyDrop<WispBuf>,
}

impl Slot {
    /// # Safety
    ///
    /// `slot` must be non-null and writable, and `*slot` must be null or a
    /// live pointer produced by this crate.
    unsafe fn open(slot: *mut *mut c_char) -> Self {
        // SAFETY: caller contract.
        let raw = unsafe { *slot };
        Self {
            slot,
            // SAFETY: caller contract; ownership returns in `drop`.
            buf: ManuallyDrop::new(unsafe { WispBuf::from_raw(raw) }),
        }
    }
}

impl Deref for Slot {
    type Target = WispBuf;

    fn deref(&self) -> &WispBuf {
        &self.buf
    }
}

impl DerefMut for Slot {
    fn deref_mut(&mut self) -> &mut WispBuf {
        &mut self.buf
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        // SAFETY: `buf` is taken exactly once, here.
        let buf = unsafe { ManuallyDrop::take(&mut self.buf) };
        // SAFETY: `slot` was checked non-null in `open`'s caller.
        unsafe { *self.slot = buf.into_raw() };
    }
}

/// A non-owning view of a `const char *` handle.
///
/// # Safety
///
/// `s` must be null or a live pointer produced by this crate, and must stay
/// live while the view is used.
unsafe fn view(s: *const c_char) -> ManuallyDrop<WispBuf> {
    // SAFETY: caller contract; the view is never dropped.
    ManuallyDrop::new(unsafe { WispBuf::from_raw(s.cast_mut()) })
}

/// `len` bytes at `src`, where null is allowed only for an empty run.
///
/// # Safety
///
/// A non-null `src` must be readable for `len` bytes.
unsafe fn bytes<'a>(src: *const c_char, len: usize) -> Option<&'a [u8]> {
    if src.is_null() {
        return (len == 0).then_some(&[][..]);
    }
    // SAFETY: caller contract.
    Some(unsafe { slice::from_raw_parts(src.cast::<u8>(), len) })
}

/// Whether `len` bytes at `src` reach into the block behind `s`.
fn overlaps(s: &WispBuf, src: *const c_char, len: usize) -> bool {
    if s.is_null() || src.is_null() {
        return false;
    }
    let start = s.as_ptr() as usize;
    let end = start + s.capacity() + 1;
    let from = src as usize;
    from < end && from.saturating_add(len.max(1)) > start
}

// ── Replace ─────────────────────────────────────────────────────

/// Replace `*p` with the zero-terminated string `cstr`.
#[no_mangle]
pub extern "C" fn wisp_put(p: *mut *mut c_char, cstr: *const c_char) -> i32 {
    ffi_guard!({
        if p.is_null() || cstr.is_null() {
            return INVALID;
        }
        // SAFETY: cstr is a caller-provided C string.
        let src = unsafe { CStr::from_ptr(cstr) }.to_bytes();
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        if overlaps(&s, cstr, src.len()) {
            return INVALID;
        }
        WispStatus::of(s.put(src))
    })
}

/// Replace `*p` with `len` bytes from `src`. `src` may be null when `len`
/// is 0.
#[no_mangle]
pub extern "C" fn wisp_putlen(p: *mut *mut c_char, src: *const c_char, len: usize) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: src is readable for len bytes per the caller.
        let Some(run) = (unsafe { bytes(src, len) }) else {
            return INVALID;
        };
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        if overlaps(&s, src, len) {
            return INVALID;
        }
        WispStatus::of(s.put(run))
    })
}

/// Replace `*p` with a copy of `other`. A null `other` leaves `*p` alone;
/// `other` may equal `*p`.
#[no_mangle]
pub extern "C" fn wisp_putwisp(p: *mut *mut c_char, other: *const c_char) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: p is non-null.
        if other.is_null() || ptr::eq(other, unsafe { *p }) {
            return WispStatus::Ok as i32;
        }
        // SAFETY: other is a distinct wisp pointer.
        let other = unsafe { view(other) };
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        WispStatus::of(s.put_buf(&*other))
    })
}

// ── Append ──────────────────────────────────────────────────────

/// Append the zero-terminated string `cstr` to `*p`.
#[no_mangle]
pub extern "C" fn wisp_cat(p: *mut *mut c_char, cstr: *const c_char) -> i32 {
    ffi_guard!({
        if p.is_null() || cstr.is_null() {
            return INVALID;
        }
        // SAFETY: cstr is a caller-provided C string.
        let src = unsafe { CStr::from_ptr(cstr) }.to_bytes();
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        if overlaps(&s, cstr, src.len()) {
            return INVALID;
        }
        WispStatus::of(s.cat(src))
    })
}

/// Append `len` bytes from `src` to `*p`. `src` may be null when `len` is 0.
#[no_mangle]
pub extern "C" fn wisp_catlen(p: *mut *mut c_char, src: *const c_char, len: usize) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: src is readable for len bytes per the caller.
        let Some(run) = (unsafe { bytes(src, len) }) else {
            return INVALID;
        };
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        if overlaps(&s, src, len) {
            return INVALID;
        }
        WispStatus::of(s.cat(run))
    })
}

/// Append a copy of `other` to `*p`. A null `other` leaves `*p` alone;
/// `other` may equal `*p`, doubling the string.
#[no_mangle]
pub extern "C" fn wisp_catwisp(p: *mut *mut c_char, other: *const c_char) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        if other.is_null() {
            return WispStatus::Ok as i32;
        }
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        if ptr::eq(other, s.as_ptr()) {
            let copy = s.as_bytes().to_vec();
            return WispStatus::of(s.cat(&copy));
        }
        // SAFETY: other is a distinct wisp pointer.
        let other = unsafe { view(other) };
        WispStatus::of(s.cat_buf(&*other))
    })
}

// ── Capacity ────────────────────────────────────────────────────

/// Make sure `*p` can hold `cap` bytes without reallocating.
#[no_mangle]
pub extern "C" fn wisp_ensurecap(p: *mut *mut c_char, cap: usize) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        WispStatus::of(s.ensure_capacity(cap))
    })
}

/// Make sure `len` more bytes can be appended to `*p` without reallocating.
#[no_mangle]
pub extern "C" fn wisp_makeroomfor(p: *mut *mut c_char, len: usize) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        WispStatus::of(s.make_room_for(len))
    })
}

// ── Housekeeping ────────────────────────────────────────────────

/// Set the length of `*p` to 0, keeping its allocation.
#[no_mangle]
pub extern "C" fn wisp_clear(p: *mut *mut c_char) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        s.clear();
        WispStatus::Ok as i32
    })
}

/// Release `s`. Null is allowed.
#[no_mangle]
pub extern "C" fn wisp_free(s: *mut c_char) {
    // SAFETY: s is null or a wisp pointer the caller gives up.
    drop(unsafe { WispBuf::from_raw(s) });
}

/// Release `*p` and set it to null. `*p` may already be null.
#[no_mangle]
pub extern "C" fn wisp_wipe(p: *mut *mut c_char) -> i32 {
    ffi_guard!({
        if p.is_null() {
            return INVALID;
        }
        // SAFETY: p is non-null; *p is a wisp pointer or null.
        let mut s = unsafe { Slot::open(p) };
        s.take_and_null();
        WispStatus::Ok as i32
    })
}

/// Exchange `*a` and `*b`.
#[no_mangle]
pub extern "C" fn wisp_swap(a: *mut *mut c_char, b: *mut *mut c_char) -> i32 {
    if a.is_null() || b.is_null() {
        return INVALID;
    }
    // SAFETY: both slots are non-null; ptr::swap allows a == b.
    unsafe { ptr::swap(a, b) };
    WispStatus::Ok as i32
}

/// Overwrite the stored length of `s` without touching its bytes.
///
/// Fails with `InvalidArgument` when `s` is null or `len` exceeds the
/// capacity. The caller is responsible for the terminator.
#[no_mangle]
pub extern "C" fn wisp_pokelen(s: *mut c_char, len: usize) -> i32 {
    if s.is_null() {
        return INVALID;
    }
    // SAFETY: s is a live wisp pointer.
    let mut buf = unsafe { view(s) };
    if len > buf.capacity() {
        return INVALID;
    }
    // SAFETY: len <= capacity; the bytes are the caller's to vouch for.
    unsafe { buf.poke_len(len) };
    WispStatus::Ok as i32
}

/// Strip bytes found in the zero-terminated `cut_set` from both ends of `s`.
/// A null `s` is left alone.
#[no_mangle]
pub extern "C" fn wisp_trim(s: *mut c_char, cut_set: *const c_char) -> i32 {
    ffi_guard!({
        if cut_set.is_null() {
            return INVALID;
        }
        // SAFETY: cut_set is a caller-provided C string.
        let cut = unsafe { CStr::from_ptr(cut_set) }.to_bytes();
        // SAFETY: s is null or a live wisp pointer; trim never reallocates.
        let mut buf = unsafe { view(s) };
        buf.trim(cut);
        WispStatus::Ok as i32
    })
}

// ── Queries ─────────────────────────────────────────────────────

/// Bytes in use, excluding the terminator. 0 for null.
#[no_mangle]
pub extern "C" fn wisp_len(s: *const c_char) -> usize {
    // SAFETY: s is null or a live wisp pointer.
    unsafe { view(s) }.len()
}

/// Bytes allocated for content, excluding the terminator. 0 for null.
#[no_mangle]
pub extern "C" fn wisp_cap(s: *const c_char) -> usize {
    // SAFETY: s is null or a live wisp pointer.
    unsafe { view(s) }.capacity()
}

/// Length and capacity in one call.
#[no_mangle]
pub extern "C" fn wisp_lencap(s: *const c_char, out_len: *mut usize, out_cap: *mut usize) -> i32 {
    if out_len.is_null() || out_cap.is_null() {
        return INVALID;
    }
    // SAFETY: s is null or a live wisp pointer.
    let (len, cap) = unsafe { view(s) }.len_cap();
    // SAFETY: both out-pointers are non-null and writable.
    unsafe {
        *out_len = len;
        *out_cap = cap;
    }
    WispStatus::Ok as i32
}

/// Capacity minus length. 0 for null.
#[no_mangle]
pub extern "C" fn wisp_avail(s: *const c_char) -> usize {
    // SAFETY: s is null or a live wisp pointer.
    unsafe { view(s) }.available()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::ffi::CString;

    fn read(s: *const c_char) -> &'static [u8] {
        assert!(!s.is_null());
        // SAFETY: test pointers come from wisp_* calls.
        unsafe { CStr::from_ptr(s) }.to_bytes()
    }

    #[test]
    fn put_then_cat_is_a_c_string() {
        let mut s: *mut c_char = ptr::null_mut();
        let hello = CString::new("Hello").unwrap();
        let world = CString::new(" World").unwrap();
        assert_eq!(wisp_put(&mut s, hello.as_ptr()), 0);
        assert_eq!(wisp_cat(&mut s, world.as_ptr()), 0);
        assert_eq!(read(s), b"Hello World");
        assert_eq!(wisp_len(s), 11);
        assert_eq!(wisp_cap(s), 11);
        assert_eq!(wisp_avail(s), 0);
        wisp_free(s);
    }

    #[test]
    fn null_arguments_are_rejected() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_put(ptr::null_mut(), c"x".as_ptr()), INVALID);
        assert_eq!(wisp_put(&mut s, ptr::null()), INVALID);
        assert_eq!(wisp_catlen(&mut s, ptr::null(), 3), INVALID);
        assert_eq!(wisp_wipe(ptr::null_mut()), INVALID);
        assert_eq!(wisp_trim(s, ptr::null()), INVALID);
        assert!(s.is_null());
    }

    #[test]
    fn null_source_with_zero_length_allocates_empty() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_putlen(&mut s, ptr::null(), 0), 0);
        assert!(!s.is_null());
        assert_eq!(read(s), b"");
        assert_eq!(wisp_wipe(&mut s), 0);
        assert!(s.is_null());
        assert_eq!(wisp_wipe(&mut s), 0);
    }

    #[test]
    fn lengths_may_include_interior_zeros() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_putlen(&mut s, b"a\0b".as_ptr().cast(), 3), 0);
        assert_eq!(wisp_len(s), 3);
        assert_eq!(read(s), b"a");
        wisp_free(s);
    }

    #[test]
    fn overflow_nulls_the_callers_pointer() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_put(&mut s, c"doomed".as_ptr()), 0);
        assert_eq!(
            wisp_makeroomfor(&mut s, usize::MAX),
            WispStatus::CapacityOverflow as i32
        );
        assert!(s.is_null());
        assert_eq!(wisp_len(s), 0);
    }

    #[test]
    fn ensurecap_and_lencap() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_ensurecap(&mut s, 40), 0);
        assert_eq!(wisp_catlen(&mut s, b"abcd".as_ptr().cast(), 4), 0);
        let (mut len, mut cap) = (0, 0);
        assert_eq!(wisp_lencap(s, &mut len, &mut cap), 0);
        assert_eq!((len, cap), (4, 40));
        assert_eq!(wisp_lencap(s, ptr::null_mut(), &mut cap), INVALID);
        wisp_free(s);
    }

    #[test]
    fn putwisp_and_catwisp_including_self() {
        let mut a: *mut c_char = ptr::null_mut();
        let mut b: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_put(&mut a, c"ab".as_ptr()), 0);
        assert_eq!(wisp_putwisp(&mut b, a), 0);
        assert_eq!(read(b), b"ab");

        let same = a;
        assert_eq!(wisp_catwisp(&mut a, same), 0);
        assert_eq!(read(a), b"abab");
        let same = a;
        assert_eq!(wisp_putwisp(&mut a, same), 0);
        assert_eq!(read(a), b"abab");

        assert_eq!(wisp_catwisp(&mut a, b), 0);
        assert_eq!(read(a), b"ababab");
        assert_eq!(wisp_catwisp(&mut a, ptr::null()), 0);
        assert_eq!(wisp_putwisp(&mut a, ptr::null()), 0);
        assert_eq!(read(a), b"ababab");
        wisp_free(a);
        wisp_free(b);
    }

    #[test]
    fn clear_swap_trim() {
        let mut a: *mut c_char = ptr::null_mut();
        let mut b: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_put(&mut a, c"  padded  ".as_ptr()), 0);
        assert_eq!(wisp_swap(&mut a, &mut b), 0);
        assert!(a.is_null());
        assert_eq!(wisp_trim(b, c" ".as_ptr()), 0);
        assert_eq!(read(b), b"padded");
        assert_eq!(wisp_cap(b), 10);

        assert_eq!(wisp_clear(&mut b), 0);
        assert_eq!(read(b), b"");
        assert_eq!(wisp_cap(b), 10);
        assert_eq!(wisp_trim(ptr::null_mut(), c" ".as_ptr()), 0);
        wisp_free(b);
    }

    #[test]
    fn pokelen_is_bounded_by_capacity() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_put(&mut s, c"abcdef".as_ptr()), 0);
        assert_eq!(wisp_pokelen(s, 3), 0);
        assert_eq!(wisp_len(s), 3);
        assert_eq!(wisp_pokelen(s, 7), INVALID);
        assert_eq!(wisp_pokelen(ptr::null_mut(), 0), INVALID);
        wisp_free(s);
    }

    #[test]
    fn queries_on_null_report_zero() {
        assert_eq!(wisp_len(ptr::null()), 0);
        assert_eq!(wisp_cap(ptr::null()), 0);
        assert_eq!(wisp_avail(ptr::null()), 0);
        wisp_free(ptr::null_mut());
    }

    #[test]
    fn source_inside_destination_is_rejected() {
        let mut s: *mut c_char = ptr::null_mut();
        assert_eq!(wisp_put(&mut s, c"overlapping".as_ptr()), 0);
        let before = s;

        let same = s;
        assert_eq!(wisp_put(&mut s, same), INVALID);
        assert_eq!(wisp_cat(&mut s, same), INVALID);
        // SAFETY: offset 4 is inside the 11-byte string.
        let tail = unsafe { s.add(4) };
        assert_eq!(wisp_putlen(&mut s, tail, 3), INVALID);
        assert_eq!(wisp_catlen(&mut s, tail, 7), INVALID);

        assert_eq!(s, before);
        assert_eq!(read(s), b"overlapping");
        wisp_free(s);
    }

    #[test]
    fn source_next_to_destination_is_accepted() {
        let mut s: *mut c_char = ptr::null_mut();
        let other = c"elsewhere";
        assert_eq!(wisp_put(&mut s, c"here".as_ptr()), 0);
        // SAFETY: s is a live wisp pointer.
        assert!(!overlaps(&*unsafe { view(s) }, other.as_ptr(), 9));
        assert_eq!(wisp_cat(&mut s, other.as_ptr()), 0);
        assert_eq!(read(s), b"hereelsewhere");
        wisp_free(s);
    }

    proptest! {
        #[test]
        fn putlen_then_catlen_concatenates(
            a in prop::collection::vec(1u8..=255, 0..64),
            b in prop::collection::vec(1u8..=255, 0..64),
        ) {
            let mut s: *mut c_char = ptr::null_mut();
            prop_assert_eq!(wisp_putlen(&mut s, a.as_ptr().cast(), a.len()), 0);
            prop_assert_eq!(wisp_catlen(&mut s, b.as_ptr().cast(), b.len()), 0);
            let expected = [a.as_slice(), b.as_slice()].concat();
            prop_assert_eq!(read(s), expected.as_slice());

            let (mut len, mut cap) = (0usize, 0usize);
            prop_assert_eq!(wisp_lencap(s, &mut len, &mut cap), 0);
            prop_assert_eq!(len, a.len() + b.len());
            prop_assert_eq!(wisp_avail(s), cap - len);
            wisp_free(s);
        }

        #[test]
        fn trim_matches_byte_set(body in "[ xy]{0,32}") {
            let mut s: *mut c_char = ptr::null_mut();
            prop_assert_eq!(wisp_putlen(&mut s, body.as_ptr().cast(), body.len()), 0);
            prop_assert_eq!(wisp_trim(s, c" ".as_ptr()), 0);
            prop_assert_eq!(read(s), body.trim_matches(' ').as_bytes());
            wisp_free(s);
        }
    }
}
