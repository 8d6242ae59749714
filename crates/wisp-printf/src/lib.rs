//! printf-compatible formatting through the Wisp chunk interface.
//!
//! [`Printf`] pairs a C format string with a slice of [`FormatArg`]s. It is
//! parsed and checked once, at construction, and then renders infallibly
//! through [`ChunkFormatter`](wisp_core::ChunkFormatter), so it can be
//! appended to a buffer chunk by chunk without an intermediate string.
//!
//! Semantics follow C99 `printf` with the stb_sprintf choices where the two
//! differ (notably `%p`, printed as zero-padded lowercase hex without a
//! `0x` prefix).
//!
//! ```
//! use wisp_printf::{fargs, format_to_vec, Printf};
//!
//! let out = format_to_vec(b"%-4s|%5.1f|%#x", fargs!["ab", 3.14159, 255])?;
//! assert_eq!(out, b"ab  |  3.1|0xff");
//! # Ok::<(), wisp_printf::PrintfError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arg;
pub mod error;
pub mod render;
pub mod spec;

pub use arg::FormatArg;
pub use error::PrintfError;
pub use render::{format_to_vec, Printf};
pub use spec::{
    parse_format_string, Conversion, FormatFlags, FormatSegment, FormatSpec, LengthMod,
    Precision, Width,
};

/// Build a `&[FormatArg]` from heterogeneous values.
///
/// ```
/// assert_eq!(wisp_printf::fargs![1, "two", 3.0].len(), 3);
/// ```
#[macro_export]
macro_rules! fargs {
    ($($arg:expr),* $(,)?) => {
        &[$($crate::FormatArg::from($arg)),*][..]
    };
}
