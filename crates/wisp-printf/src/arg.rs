//! Typed stand-ins for C variadic arguments.

/// One argument consumed by a conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormatArg<'a> {
    /// Signed integer (`d`, `i`, and `*` widths).
    Int(i64),
    /// Unsigned integer (`u`, `o`, `x`, `X`).
    Uint(u64),
    /// Floating point (`f`, `e`, `g` families).
    Float(f64),
    /// Single byte (`c`).
    Char(u8),
    /// Byte string (`s`); not required to be UTF-8 or terminated.
    Str(&'a [u8]),
    /// Address (`p`).
    Ptr(usize),
}

impl FormatArg<'_> {
    /// Short name of the argument kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Uint(_) => "unsigned",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Ptr(_) => "pointer",
        }
    }

    /// Integer view used by integer conversions and `*` fields.
    ///
    /// Unsigned values and pointers are reinterpreted bit for bit, as a C
    /// varargs read would.
    pub(crate) fn as_bits(&self) -> Option<u64> {
        match *self {
            Self::Int(v) => Some(v as u64),
            Self::Uint(v) => Some(v),
            Self::Char(c) => Some(u64::from(c)),
            Self::Ptr(p) => Some(p as u64),
            Self::Float(_) | Self::Str(_) => None,
        }
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for FormatArg<'_> {
            fn from(v: $t) -> Self {
                FormatArg::Int(v as i64)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for FormatArg<'_> {
            fn from(v: $t) -> Self {
                FormatArg::Uint(v as u64)
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FormatArg<'_> {
    fn from(v: f32) -> Self {
        FormatArg::Float(f64::from(v))
    }
}

impl From<f64> for FormatArg<'_> {
    fn from(v: f64) -> Self {
        FormatArg::Float(v)
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(v: &'a str) -> Self {
        FormatArg::Str(v.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for FormatArg<'a> {
    fn from(v: &'a [u8]) -> Self {
        FormatArg::Str(v)
    }
}

impl<'a> From<&'a String> for FormatArg<'a> {
    fn from(v: &'a String) -> Self {
        FormatArg::Str(v.as_bytes())
    }
}

impl<T> From<*const T> for FormatArg<'_> {
    fn from(p: *const T) -> Self {
        FormatArg::Ptr(p as usize)
    }
}

impl<T> From<*mut T> for FormatArg<'_> {
    fn from(p: *mut T) -> Self {
        FormatArg::Ptr(p as usize)
    }
}
