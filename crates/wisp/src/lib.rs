//! Wisp: growable, zero-terminated byte strings with a hidden
//! length/capacity header, and printf-style formatting straight into them.
//!
//! This is the facade crate that re-exports the public API of the Wisp
//! sub-crates and adds the printf-shaped entry points on [`WispBuf`].
//!
//! # Quick start
//!
//! ```rust
//! use wisp::prelude::*;
//!
//! let mut s = WispBuf::new();
//! s.put(b"Hello World")?;
//! assert_eq!(s.len(), 11);
//!
//! s.put(b"How about some pancakes?")?;
//! s.cat_printf(" Sure! I'd like %d.", fargs![5])?;
//! assert_eq!(s, "How about some pancakes? Sure! I'd like 5.");
//!
//! s.trim(b".5 ");
//! assert_eq!(s.as_c_str().to_bytes(), b"How about some pancakes? Sure! I'd like");
//! # Ok::<(), wisp::Error>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`chunk`] | `wisp-core` | Chunk formatter contract, `WispError` |
//! | [`buf`] | `wisp-buf` | `WispBuf`, capacity planner, allocators |
//! | [`printf`] | `wisp-printf` | C format strings and `Printf` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod ext;

pub use error::Error;
pub use ext::PrintfExt;

/// Chunked formatting contract and the buffer error type (`wisp-core`).
pub use wisp_core as chunk;

/// The buffer handle and its allocators (`wisp-buf`).
///
/// [`buf::WispBuf`] is also in the [`prelude`].
pub use wisp_buf as buf;

/// printf-compatible formatting (`wisp-printf`).
pub use wisp_printf as printf;

/// Append C-formatted text to a buffer.
///
/// `wisp_cat_printf!(s, "%d-%s", 1, "x")` is
/// `s.cat_printf("%d-%s", fargs![1, "x"])`.
#[macro_export]
macro_rules! wisp_cat_printf {
    ($buf:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::PrintfExt::cat_printf(&mut $buf, $fmt, $crate::printf::fargs![$($arg),*])
    };
}

/// Common imports for typical Wisp usage.
///
/// ```rust
/// use wisp::prelude::*;
/// ```
pub mod prelude {
    pub use wisp_buf::{wisp_catf, wisp_putf, BufAlloc, Global, WispBuf};
    pub use wisp_core::{ChunkFormatter, WispError};
    pub use wisp_printf::{fargs, FormatArg, Printf, PrintfError};

    pub use crate::{wisp_cat_printf, Error, PrintfExt};
}
