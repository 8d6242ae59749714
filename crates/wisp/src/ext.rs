//! printf-shaped methods on [`WispBuf`].

use wisp_buf::{BufAlloc, WispBuf};
use wisp_printf::{FormatArg, Printf};

use crate::Error;

/// C-style formatted replace and append.
///
/// The format is parsed and checked against `args` before the buffer is
/// touched, so a bad format leaves it unchanged. A failure to grow leaves
/// it null, like every other mutator.
pub trait PrintfExt {
    /// Append the formatted text.
    fn cat_printf<F: AsRef<[u8]> + ?Sized>(
        &mut self,
        fmt: &F,
        args: &[FormatArg<'_>],
    ) -> Result<(), Error>;

    /// Replace the contents with the formatted text.
    fn put_printf<F: AsRef<[u8]> + ?Sized>(
        &mut self,
        fmt: &F,
        args: &[FormatArg<'_>],
    ) -> Result<(), Error>;
}

impl<A: BufAlloc> PrintfExt for WispBuf<A> {
    fn cat_printf<F: AsRef<[u8]> + ?Sized>(
        &mut self,
        fmt: &F,
        args: &[FormatArg<'_>],
    ) -> Result<(), Error> {
        let printf = Printf::new(fmt, args)?;
        self.cat_formatted(&printf)?;
        Ok(())
    }

    fn put_printf<F: AsRef<[u8]> + ?Sized>(
        &mut self,
        fmt: &F,
        args: &[FormatArg<'_>],
    ) -> Result<(), Error> {
        let printf = Printf::new(fmt, args)?;
        self.put_formatted(&printf)?;
        Ok(())
    }
}
