//! Unified error for the facade's printf entry points.

use std::error::Error as StdError;
use std::fmt;

use wisp_core::WispError;
use wisp_printf::PrintfError;

/// Either the format was rejected or the buffer could not grow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The format string or its arguments were invalid. The buffer was not
    /// touched.
    Format(PrintfError),
    /// The buffer failed to grow and is now null.
    Buffer(WispError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => write!(f, "format error: {e}"),
            Self::Buffer(e) => write!(f, "buffer error: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Format(e) => Some(e),
            Self::Buffer(e) => Some(e),
        }
    }
}

impl From<PrintfError> for Error {
    fn from(e: PrintfError) -> Self {
        Self::Format(e)
    }
}

impl From<WispError> for Error {
    fn from(e: WispError) -> Self {
        Self::Buffer(e)
    }
}
