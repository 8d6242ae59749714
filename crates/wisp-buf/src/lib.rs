//! Header-prefixed growable byte strings.
//!
//! A [`WispBuf`] is a single pointer-sized owning handle. A non-null handle
//! points at byte 0 of its data; the length and capacity live in a header
//! immediately before it, and a zero terminator always follows the last
//! meaningful byte. The handle can therefore be passed anywhere a C string
//! is expected without a second metadata pointer. Apart from `wisp-ffi` and
//! the test allocators, this is the only crate that contains `unsafe` code.
//!
//! # Architecture
//!
//! ```text
//! WispBuf<A: BufAlloc>
//! ├── raw      [Header{len,cap}][data .. cap][0]  (single block, A-owned)
//! ├── planner  ensure_capacity / make_room_for (overflow-checked, exact fit)
//! ├── buffer   put / cat / clear / swap / free / accessors
//! ├── trim     byte-set trimming in place
//! └── bridge   cat_formatted / put_formatted over ChunkFormatter
//! ```
//!
//! # Failure model
//!
//! Every operation that may allocate returns `Result<(), WispError>`. On
//! `Err` the handle has already been released and is null: the previous
//! contents are gone, never left dangling or silently truncated.
//!
//! ```
//! use wisp_buf::{wisp_catf, WispBuf};
//!
//! let mut s = WispBuf::new();
//! s.put_str("Hello World")?;
//! assert_eq!(s.len(), 11);
//! s.put_str("How about some pancakes?")?;
//! wisp_catf!(s, " Sure! I'd like {}.", 5)?;
//! assert_eq!(s, "How about some pancakes? Sure! I'd like 5.");
//! # Ok::<(), wisp_core::WispError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod bridge;
pub mod buffer;
pub mod planner;
mod raw;
pub mod trim;

pub use alloc::{BufAlloc, Global};
pub use buffer::WispBuf;
pub use raw::{CAP_MAX, HEADER_ALIGN, HEADER_SIZE};
pub use wisp_core::{ChunkFormatter, WispError};

/// Append formatted output to a [`WispBuf`], `format!`-style.
///
/// Expands to [`WispBuf::cat_fmt`] and evaluates to its `Result`.
#[macro_export]
macro_rules! wisp_catf {
    ($buf:expr, $($arg:tt)*) => {
        $buf.cat_fmt(::core::format_args!($($arg)*))
    };
}

/// Replace the contents of a [`WispBuf`] with formatted output.
///
/// Expands to [`WispBuf::put_fmt`] and evaluates to its `Result`.
#[macro_export]
macro_rules! wisp_putf {
    ($buf:expr, $($arg:tt)*) => {
        $buf.put_fmt(::core::format_args!($($arg)*))
    };
}
