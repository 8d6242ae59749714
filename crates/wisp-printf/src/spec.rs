//! Format string parsing.
//!
//! A format string is split into [`FormatSegment`]s: literal runs (borrowed
//! from the input) and conversion specifications of the form
//! `%[flags][width][.precision][length]conversion`.

use smallvec::SmallVec;

use crate::error::PrintfError;

/// Flag characters that may follow `%`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatFlags {
    /// `-`: left-justify within the field width.
    pub left: bool,
    /// `+`: always print a sign for signed conversions.
    pub plus: bool,
    /// ` `: print a space where a `+` would go.
    pub space: bool,
    /// `#`: alternate form (`0x` prefix, leading octal zero, kept point).
    pub alt: bool,
    /// `0`: pad with zeros instead of spaces.
    pub zero: bool,
}

/// Minimum field width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Width {
    /// No minimum.
    #[default]
    None,
    /// Literal width.
    Fixed(usize),
    /// `*`: taken from the next integer argument.
    FromArg,
}

/// Precision (`.N`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// Conversion default.
    #[default]
    None,
    /// Literal precision (`.` alone means 0).
    Fixed(usize),
    /// `.*`: taken from the next integer argument.
    FromArg,
}

/// Length modifier; selects the integer width the value is truncated to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthMod {
    /// C `int`.
    #[default]
    None,
    /// `hh`: `char`.
    Char,
    /// `h`: `short`.
    Short,
    /// `l`: `long`.
    Long,
    /// `ll`: `long long`.
    LongLong,
    /// `j`: `intmax_t`.
    IntMax,
    /// `z`: `size_t`.
    Size,
    /// `t`: `ptrdiff_t`.
    PtrDiff,
    /// `L`: `long double` (floats render as `f64`).
    LongDouble,
}

impl LengthMod {
    /// Width in bits an integer argument is truncated to.
    pub fn int_bits(self) -> u32 {
        match self {
            Self::Char => 8,
            Self::Short => 16,
            Self::None | Self::LongDouble => 32,
            Self::Long | Self::LongLong | Self::IntMax | Self::Size | Self::PtrDiff => 64,
        }
    }
}

/// The conversion character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    /// `d` / `i`.
    Signed,
    /// `u`.
    Unsigned,
    /// `o`.
    Octal,
    /// `x`.
    HexLower,
    /// `X`.
    HexUpper,
    /// `c`.
    Char,
    /// `s`.
    Str,
    /// `p`.
    Pointer,
    /// `f` / `F`.
    Fixed {
        /// `F`: `INF`/`NAN`.
        upper: bool,
    },
    /// `e` / `E`.
    Exp {
        /// `E`.
        upper: bool,
    },
    /// `g` / `G`.
    General {
        /// `G`.
        upper: bool,
    },
}

impl Conversion {
    fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            b'd' | b'i' => Self::Signed,
            b'u' => Self::Unsigned,
            b'o' => Self::Octal,
            b'x' => Self::HexLower,
            b'X' => Self::HexUpper,
            b'c' => Self::Char,
            b's' => Self::Str,
            b'p' => Self::Pointer,
            b'f' => Self::Fixed { upper: false },
            b'F' => Self::Fixed { upper: true },
            b'e' => Self::Exp { upper: false },
            b'E' => Self::Exp { upper: true },
            b'g' => Self::General { upper: false },
            b'G' => Self::General { upper: true },
            _ => return None,
        })
    }

    /// Whether the conversion takes a floating-point argument.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::Fixed { .. } | Self::Exp { .. } | Self::General { .. }
        )
    }
}

/// One parsed conversion specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    /// Flags.
    pub flags: FormatFlags,
    /// Field width.
    pub width: Width,
    /// Precision.
    pub precision: Precision,
    /// Length modifier.
    pub length: LengthMod,
    /// Conversion.
    pub conversion: Conversion,
}

/// A piece of a parsed format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// Bytes copied verbatim (`%%` becomes a one-byte literal).
    Literal(&'a [u8]),
    /// A conversion consuming one or more arguments.
    Spec(FormatSpec),
}

/// Largest width or precision accepted (C `int`).
const NUMBER_MAX: usize = i32::MAX as usize;

/// Split `fmt` into literal runs and conversion specifications.
pub fn parse_format_string(fmt: &[u8]) -> Result<SmallVec<[FormatSegment<'_>; 8]>, PrintfError> {
    let mut segments = SmallVec::new();
    let mut pos = 0;
    while pos < fmt.len() {
        let run_end = fmt[pos..]
            .iter()
            .position(|&b| b == b'%')
            .map_or(fmt.len(), |i| pos + i);
        if run_end > pos {
            segments.push(FormatSegment::Literal(&fmt[pos..run_end]));
        }
        if run_end == fmt.len() {
            break;
        }
        let percent = run_end;
        if fmt.get(percent + 1) == Some(&b'%') {
            segments.push(FormatSegment::Literal(&fmt[percent + 1..percent + 2]));
            pos = percent + 2;
            continue;
        }
        let (spec, next) = parse_spec(fmt, percent)?;
        segments.push(FormatSegment::Spec(spec));
        pos = next;
    }
    Ok(segments)
}

/// Parse the specification starting at the `%` at `percent`; returns it and
/// the offset just past the conversion byte.
fn parse_spec(fmt: &[u8], percent: usize) -> Result<(FormatSpec, usize), PrintfError> {
    let truncated = PrintfError::Truncated { offset: percent };
    let mut pos = percent + 1;

    let mut flags = FormatFlags::default();
    while let Some(&b) = fmt.get(pos) {
        match b {
            b'-' => flags.left = true,
            b'+' => flags.plus = true,
            b' ' => flags.space = true,
            b'#' => flags.alt = true,
            b'0' => flags.zero = true,
            _ => break,
        }
        pos += 1;
    }

    let width = if fmt.get(pos) == Some(&b'*') {
        pos += 1;
        Width::FromArg
    } else {
        match parse_number(fmt, &mut pos)? {
            Some(n) => Width::Fixed(n),
            None => Width::None,
        }
    };

    let precision = if fmt.get(pos) == Some(&b'.') {
        pos += 1;
        if fmt.get(pos) == Some(&b'*') {
            pos += 1;
            Precision::FromArg
        } else {
            Precision::Fixed(parse_number(fmt, &mut pos)?.unwrap_or(0))
        }
    } else {
        Precision::None
    };

    let length = match (fmt.get(pos), fmt.get(pos + 1)) {
        (Some(b'h'), Some(b'h')) => {
            pos += 2;
            LengthMod::Char
        }
        (Some(b'l'), Some(b'l')) => {
            pos += 2;
            LengthMod::LongLong
        }
        (Some(&b), _) => {
            let m = match b {
                b'h' => LengthMod::Short,
                b'l' => LengthMod::Long,
                b'j' => LengthMod::IntMax,
                b'z' => LengthMod::Size,
                b't' => LengthMod::PtrDiff,
                b'L' => LengthMod::LongDouble,
                _ => LengthMod::None,
            };
            if m != LengthMod::None {
                pos += 1;
            }
            m
        }
        (None, _) => return Err(truncated),
    };

    let &byte = fmt.get(pos).ok_or(truncated)?;
    let conversion =
        Conversion::from_byte(byte).ok_or(PrintfError::UnknownConversion { offset: pos, byte })?;
    Ok((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos + 1,
    ))
}

fn parse_number(fmt: &[u8], pos: &mut usize) -> Result<Option<usize>, PrintfError> {
    let start = *pos;
    let mut value: usize = 0;
    while let Some(&b) = fmt.get(*pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(b - b'0')))
            .filter(|&v| v <= NUMBER_MAX)
            .ok_or(PrintfError::NumberTooLarge { offset: start })?;
        *pos += 1;
    }
    Ok((*pos > start).then_some(value))
}
