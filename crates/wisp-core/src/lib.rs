//! Core types and traits for Wisp byte buffers.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! error taxonomy shared by every Wisp crate and the chunked formatter
//! interface through which formatted output reaches a buffer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chunk;
pub mod error;

pub use chunk::{ChunkFormatter, ChunkSink, ChunkWriter, SCRATCH_LEN};
pub use error::WispError;
