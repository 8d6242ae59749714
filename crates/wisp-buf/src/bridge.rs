//! Formatted append: drives a [`ChunkFormatter`] straight into a buffer.
//!
//! The bridge owns one scratch array for the duration of the call. Every
//! chunk the formatter produces is appended with [`WispBuf::cat`]; if that
//! append fails the handle is already null, so the sink answers `Break` and
//! the formatter stops producing output.

use std::fmt;
use std::ops::ControlFlow;

use wisp_core::{ChunkFormatter, WispError, SCRATCH_LEN};

use crate::alloc::BufAlloc;
use crate::buffer::WispBuf;

impl<A: BufAlloc> WispBuf<A> {
    /// Append everything `formatter` renders.
    ///
    /// A null handle that receives no output stays null.
    ///
    /// # Errors
    ///
    /// The first append failure; the handle is null and the formatter was
    /// told to stop.
    pub fn cat_formatted<F: ChunkFormatter + ?Sized>(
        &mut self,
        formatter: &F,
    ) -> Result<(), WispError> {
        let mut scratch = [0u8; SCRATCH_LEN];
        let mut failure = None;
        formatter.render(&mut scratch, &mut |chunk: &[u8]| match self.cat(chunk) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                failure = Some(e);
                ControlFlow::Break(())
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Replace the contents with everything `formatter` renders.
    ///
    /// The existing allocation is reused when it is large enough.
    pub fn put_formatted<F: ChunkFormatter + ?Sized>(
        &mut self,
        formatter: &F,
    ) -> Result<(), WispError> {
        self.clear();
        self.cat_formatted(formatter)
    }

    /// Append `format_args!` output. See also [`wisp_catf!`](crate::wisp_catf).
    pub fn cat_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), WispError> {
        self.cat_formatted(&args)
    }

    /// Replace the contents with `format_args!` output.
    pub fn put_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), WispError> {
        self.put_formatted(&args)
    }
}
