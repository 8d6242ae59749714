//! Format-string and argument errors.

use std::error::Error;
use std::fmt;

/// Why a [`Printf`](crate::Printf) could not be built.
///
/// Offsets are byte positions in the format string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintfError {
    /// A `%` with no conversion before the end of the string.
    Truncated {
        /// Offset of the dangling `%`.
        offset: usize,
    },
    /// The conversion byte is not supported.
    UnknownConversion {
        /// Offset of the conversion byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },
    /// A width or precision does not fit in a C `int`.
    NumberTooLarge {
        /// Offset where the number starts.
        offset: usize,
    },
    /// The format consumes more arguments than were supplied.
    MissingArgument {
        /// Zero-based index of the missing argument.
        index: usize,
    },
    /// An argument's kind does not suit its conversion.
    ArgumentMismatch {
        /// Zero-based index of the argument.
        index: usize,
        /// What the conversion needs.
        expected: &'static str,
        /// What was supplied.
        found: &'static str,
    },
}

impl fmt::Display for PrintfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => {
                write!(f, "format string ends inside a conversion at byte {offset}")
            }
            Self::UnknownConversion { offset, byte } => {
                write!(
                    f,
                    "unsupported conversion '{}' at byte {offset}",
                    byte.escape_ascii()
                )
            }
            Self::NumberTooLarge { offset } => {
                write!(f, "width or precision too large at byte {offset}")
            }
            Self::MissingArgument { index } => {
                write!(f, "missing argument {index}")
            }
            Self::ArgumentMismatch {
                index,
                expected,
                found,
            } => {
                write!(f, "argument {index}: expected {expected}, found {found}")
            }
        }
    }
}

impl Error for PrintfError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            PrintfError::UnknownConversion {
                offset: 3,
                byte: b'q'
            }
            .to_string(),
            "unsupported conversion 'q' at byte 3"
        );
        assert_eq!(
            PrintfError::ArgumentMismatch {
                index: 1,
                expected: "string",
                found: "float"
            }
            .to_string(),
            "argument 1: expected string, found float"
        );
        assert_eq!(
            PrintfError::MissingArgument { index: 0 }.to_string(),
            "missing argument 0"
        );
    }
}
