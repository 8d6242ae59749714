//! End-to-end walk through the public surface: build, replace, append
//! formatted text, trim, and hand the bytes to C-string consumers.

use std::fmt::Write as _;

use wisp_buf::{wisp_catf, WispBuf};
use wisp_printf::{fargs, Printf};

#[test]
fn hello_then_pancakes() {
    let mut s = WispBuf::new();
    s.put(b"Hello World").unwrap();
    assert_eq!(s.len(), 11);
    assert_eq!(s, "Hello World");

    s.put(b"How about some pancakes?").unwrap();
    assert_eq!(s.len(), 24);
    assert!(s.capacity() >= 24);

    let args = fargs![5];

    let p = Printf::new(" Sure! I'd like %d.", args).unwrap();
    s.cat_formatted(&p).unwrap();
    assert_eq!(s, "How about some pancakes? Sure! I'd like 5.");
    assert_eq!(s.len(), 42);
    assert_eq!(s.as_c_str().to_bytes().len(), 42);
}

#[test]
fn printf_and_rust_formatting_agree() {
    let mut c_style = WispBuf::new();
    let args = fargs!["id", 42, 2.5];
    let p = Printf::new("%-6s|%4d|%.2f", args).unwrap();
    c_style.put_formatted(&p).unwrap();

    let mut rust_style = WispBuf::new();
    wisp_catf!(rust_style, "{:<6}|{:>4}|{:.2}", "id", 42, 2.5).unwrap();

    assert_eq!(c_style, rust_style);
}

#[test]
fn fmt_write_appends() {
    let mut s = WispBuf::new();
    for i in 0..3 {
        write!(s, "[{i}]").unwrap();
    }
    assert_eq!(s, "[0][1][2]");
}

#[test]
fn buffers_copy_between_each_other() {
    let src = WispBuf::try_from("shared").unwrap();
    let mut dst = WispBuf::try_from("prefix-").unwrap();
    dst.cat_buf(&src).unwrap();
    assert_eq!(dst, "prefix-shared");

    dst.put_buf(&src).unwrap();
    assert_eq!(dst, src);

    let null = WispBuf::new();
    dst.cat_buf(&null).unwrap();
    dst.put_buf(&null).unwrap();
    assert_eq!(dst, "shared");
}

#[test]
fn trim_after_format() {
    let mut s = WispBuf::new();
    wisp_catf!(s, "{:^11}", "core").unwrap();
    assert_eq!(s.len(), 11);
    s.trim(b" ");
    assert_eq!(s, "core");
    assert_eq!(s.capacity(), 11);
}

#[test]
fn raw_pointer_round_trip() {
    let s = WispBuf::try_from("through C").unwrap();
    let raw = s.into_raw();
    // SAFETY: `raw` came from into_raw and is reclaimed exactly once.
    let back = unsafe { WispBuf::from_raw(raw) };
    assert_eq!(back, "through C");
}

#[test]
fn poke_len_after_writing_spare_capacity() {
    let mut s = WispBuf::with_capacity(8).unwrap();
    let spare = s.spare_capacity_mut();
    assert_eq!(spare.len(), 9);
    for (slot, b) in spare.iter_mut().zip(b"abc\0") {
        slot.write(*b);
    }
    // SAFETY: three bytes and the terminator were just written.
    unsafe { s.poke_len(3) };
    assert_eq!(s, "abc");
    assert_eq!(s.available(), 5);
}
