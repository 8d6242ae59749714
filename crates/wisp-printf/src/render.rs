//! Rendering parsed specifications through a [`ChunkWriter`].

use std::ops::ControlFlow;
use std::slice;

use smallvec::SmallVec;
use wisp_core::{ChunkFormatter, ChunkSink, ChunkWriter, SCRATCH_LEN};

use crate::arg::FormatArg;
use crate::error::PrintfError;
use crate::spec::{
    parse_format_string, Conversion, FormatFlags, FormatSegment, FormatSpec, LengthMod,
    Precision, Width,
};

/// Default precision of the float conversions.
const FLOAT_PRECISION: usize = 6;

/// Hex digits printed by `%p`.
const POINTER_DIGITS: usize = 2 * std::mem::size_of::<usize>();

/// A validated format string bound to its arguments.
///
/// Construction parses the format and checks every conversion against its
/// argument, so [`render`](ChunkFormatter::render) cannot fail. Surplus
/// arguments are ignored, as in C.
#[derive(Clone, Debug)]
pub struct Printf<'a> {
    segments: SmallVec<[FormatSegment<'a>; 8]>,
    args: &'a [FormatArg<'a>],
}

impl<'a> Printf<'a> {
    /// Parse `fmt` and check it against `args`.
    pub fn new<F: AsRef<[u8]> + ?Sized>(
        fmt: &'a F,
        args: &'a [FormatArg<'a>],
    ) -> Result<Self, PrintfError> {
        let segments = parse_format_string(fmt.as_ref())?;
        validate(&segments, args)?;
        Ok(Self { segments, args })
    }

    /// The parsed format.
    pub fn segments(&self) -> &[FormatSegment<'a>] {
        &self.segments
    }

    /// Number of arguments the format consumes.
    pub fn args_consumed(&self) -> usize {
        self.segments
            .iter()
            .map(|seg| match seg {
                FormatSegment::Literal(_) => 0,
                FormatSegment::Spec(spec) => {
                    1 + usize::from(spec.width == Width::FromArg)
                        + usize::from(spec.precision == Precision::FromArg)
                }
            })
            .sum()
    }
}

impl ChunkFormatter for Printf<'_> {
    fn render(&self, scratch: &mut [u8; SCRATCH_LEN], sink: &mut ChunkSink<'_>) {
        let mut w = ChunkWriter::new(scratch, sink);
        let mut args = self.args.iter();
        for seg in &self.segments {
            let flow = match seg {
                FormatSegment::Literal(bytes) => w.push(bytes),
                FormatSegment::Spec(spec) => render_spec(&mut w, spec, &mut args),
            };
            if flow.is_break() {
                return;
            }
        }
        let _ = w.finish();
    }
}

/// Format into a fresh `Vec<u8>` (the `sprintf` shape).
pub fn format_to_vec<F: AsRef<[u8]> + ?Sized>(
    fmt: &F,
    args: &[FormatArg<'_>],
) -> Result<Vec<u8>, PrintfError> {
    let printf = Printf::new(fmt, args)?;
    let mut out = Vec::new();
    let mut scratch = [0u8; SCRATCH_LEN];
    printf.render(&mut scratch, &mut |chunk: &[u8]| {
        out.extend_from_slice(chunk);
        ControlFlow::Continue(())
    });
    Ok(out)
}

fn is_integer(arg: &FormatArg<'_>) -> bool {
    arg.as_bits().is_some()
}

fn is_string(arg: &FormatArg<'_>) -> bool {
    matches!(arg, FormatArg::Str(_))
}

fn is_pointer(arg: &FormatArg<'_>) -> bool {
    matches!(arg, FormatArg::Ptr(_) | FormatArg::Uint(_))
}

fn is_float(arg: &FormatArg<'_>) -> bool {
    matches!(arg, FormatArg::Float(_))
}

fn validate(segments: &[FormatSegment<'_>], args: &[FormatArg<'_>]) -> Result<(), PrintfError> {
    let mut next = 0;
    let mut take = |expected: &'static str,
                    accepts: fn(&FormatArg<'_>) -> bool|
     -> Result<(), PrintfError> {
        let index = next;
        next += 1;
        let arg = args.get(index).ok_or(PrintfError::MissingArgument { index })?;
        if accepts(arg) {
            Ok(())
        } else {
            Err(PrintfError::ArgumentMismatch {
                index,
                expected,
                found: arg.kind(),
            })
        }
    };
    for seg in segments {
        let FormatSegment::Spec(spec) = seg else {
            continue;
        };
        if spec.width == Width::FromArg {
            take("int", is_integer)?;
        }
        if spec.precision == Precision::FromArg {
            take("int", is_integer)?;
        }
        match spec.conversion {
            Conversion::Str => take("string", is_string)?,
            Conversion::Pointer => take("pointer", is_pointer)?,
            c if c.is_float() => take("float", is_float)?,
            Conversion::Char => take("char", is_integer)?,
            _ => take("integer", is_integer)?,
        }
    }
    Ok(())
}

/// Resolved field parameters for one conversion.
#[derive(Clone, Copy)]
struct Field {
    flags: FormatFlags,
    width: usize,
    precision: Option<usize>,
}

/// Next argument read as a C `int` (for `*` fields).
fn next_c_int(args: &mut slice::Iter<'_, FormatArg<'_>>) -> i64 {
    args.next()
        .and_then(FormatArg::as_bits)
        .map_or(0, |bits| i64::from(bits as i32))
}

fn render_spec(
    w: &mut ChunkWriter<'_, '_, '_>,
    spec: &FormatSpec,
    args: &mut slice::Iter<'_, FormatArg<'_>>,
) -> ControlFlow<()> {
    let mut flags = spec.flags;
    let width = match spec.width {
        Width::None => 0,
        Width::Fixed(n) => n,
        Width::FromArg => {
            let v = next_c_int(args);
            // A negative `*` width means left-justify.
            if v < 0 {
                flags.left = true;
            }
            v.unsigned_abs() as usize
        }
    };
    let precision = match spec.precision {
        Precision::None => None,
        Precision::Fixed(n) => Some(n),
        // A negative `*` precision is taken as if omitted.
        Precision::FromArg => usize::try_from(next_c_int(args)).ok(),
    };
    let Some(arg) = args.next() else {
        return ControlFlow::Continue(());
    };
    let field = Field {
        flags,
        width,
        precision,
    };

    match (spec.conversion, *arg) {
        (Conversion::Str, FormatArg::Str(bytes)) => {
            let shown = precision.map_or(bytes, |p| &bytes[..p.min(bytes.len())]);
            emit(w, b"", 0, shown, field, false)
        }
        (Conversion::Char, arg) => {
            let byte = arg.as_bits().unwrap_or(0) as u8;
            emit(w, b"", 0, &[byte], field, false)
        }
        (Conversion::Pointer, arg) => render_pointer(w, field, arg.as_bits().unwrap_or(0)),
        (Conversion::Fixed { upper }, FormatArg::Float(v))
        | (Conversion::Exp { upper }, FormatArg::Float(v))
        | (Conversion::General { upper }, FormatArg::Float(v)) => {
            render_float(w, field, spec.conversion, upper, v)
        }
        (conv, arg) => match arg.as_bits() {
            Some(bits) => render_int(w, field, conv, spec.length, bits),
            None => ControlFlow::Continue(()),
        },
    }
}

/// Write `prefix`, `zeros` zeros and `body`, padded to the field width.
fn emit(
    w: &mut ChunkWriter<'_, '_, '_>,
    prefix: &[u8],
    zeros: usize,
    body: &[u8],
    field: Field,
    zero_pad: bool,
) -> ControlFlow<()> {
    let content = prefix.len() + zeros + body.len();
    let pad = field.width.saturating_sub(content);
    if field.flags.left {
        w.push(prefix)?;
        w.push_repeat(b'0', zeros)?;
        w.push(body)?;
        w.push_repeat(b' ', pad)
    } else if zero_pad {
        w.push(prefix)?;
        w.push_repeat(b'0', zeros + pad)?;
        w.push(body)
    } else {
        w.push_repeat(b' ', pad)?;
        w.push(prefix)?;
        w.push_repeat(b'0', zeros)?;
        w.push(body)
    }
}

fn sign_extend(bits: u64, width: u32) -> i64 {
    let shift = 64 - width;
    ((bits << shift) as i64) >> shift
}

fn truncate(bits: u64, width: u32) -> u64 {
    if width >= 64 {
        bits
    } else {
        bits & ((1u64 << width) - 1)
    }
}

/// Digits of `v` in `base`, written right-aligned into `buf`.
fn digits(mut v: u64, base: u64, upper: bool, buf: &mut [u8; 24]) -> &[u8] {
    let table: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = table[(v % base) as usize];
        v /= base;
        if v == 0 {
            break;
        }
    }
    &buf[i..]
}

fn render_int(
    w: &mut ChunkWriter<'_, '_, '_>,
    field: Field,
    conv: Conversion,
    length: LengthMod,
    bits: u64,
) -> ControlFlow<()> {
    let bit_width = length.int_bits();
    let (negative, magnitude) = if conv == Conversion::Signed {
        let v = sign_extend(bits, bit_width);
        (v < 0, v.unsigned_abs())
    } else {
        (false, truncate(bits, bit_width))
    };
    let (base, upper) = match conv {
        Conversion::Octal => (8, false),
        Conversion::HexLower => (16, false),
        Conversion::HexUpper => (16, true),
        _ => (10, false),
    };

    let mut buf = [0u8; 24];
    let mut body = digits(magnitude, base, upper, &mut buf);
    if field.precision == Some(0) && magnitude == 0 {
        body = &[];
    }
    let mut zeros = field
        .precision
        .map_or(0, |p| p.saturating_sub(body.len()));

    let flags = field.flags;
    let prefix: &[u8] = match conv {
        Conversion::Signed if negative => b"-",
        Conversion::Signed if flags.plus => b"+",
        Conversion::Signed if flags.space => b" ",
        Conversion::HexLower if flags.alt && magnitude != 0 => b"0x",
        Conversion::HexUpper if flags.alt && magnitude != 0 => b"0X",
        _ => b"",
    };
    if conv == Conversion::Octal && flags.alt && zeros == 0 && body.first() != Some(&b'0') {
        zeros = 1;
    }
    let zero_pad = flags.zero && field.precision.is_none();
    emit(w, prefix, zeros, body, field, zero_pad)
}

fn render_pointer(w: &mut ChunkWriter<'_, '_, '_>, field: Field, addr: u64) -> ControlFlow<()> {
    let mut buf = [0u8; 24];
    let body = digits(addr, 16, false, &mut buf);
    let zeros = POINTER_DIGITS.saturating_sub(body.len());
    let prefix: &[u8] = if field.flags.alt { b"0x" } else { b"" };
    emit(w, prefix, zeros, body, field, false)
}

fn render_float(
    w: &mut ChunkWriter<'_, '_, '_>,
    field: Field,
    conv: Conversion,
    upper: bool,
    v: f64,
) -> ControlFlow<()> {
    let flags = field.flags;
    let sign: &[u8] = if v.is_sign_negative() && !v.is_nan() {
        b"-"
    } else if flags.plus {
        b"+"
    } else if flags.space {
        b" "
    } else {
        b""
    };
    if !v.is_finite() {
        let body: &[u8] = match (v.is_nan(), upper) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        return emit(w, sign, 0, body, field, false);
    }

    let a = v.abs();
    let text = match conv {
        Conversion::Exp { .. } => exp_form(
            a,
            field.precision.unwrap_or(FLOAT_PRECISION),
            flags.alt,
            upper,
        ),
        Conversion::General { .. } => general_form(a, field.precision, flags.alt, upper),
        _ => fixed_form(a, field.precision.unwrap_or(FLOAT_PRECISION), flags.alt),
    };
    emit_float(w, sign, &text, field, flags.zero)
}

/// Decimal places beyond which an `f64` has only zero digits.
///
/// Every finite `f64` is a multiple of 2^-1074, so its exact decimal
/// expansion ends by this place.
const EXACT_PLACES: usize = 1074;

/// A rendered float: `head`, then `zeros` zero digits, then `tail`.
///
/// Digits past [`EXACT_PLACES`] are counted, not stored, so the text stays
/// bounded whatever the precision.
#[derive(Debug, Default)]
struct FloatText {
    head: String,
    zeros: usize,
    tail: String,
}

impl FloatText {
    fn len(&self) -> usize {
        self.head.len() + self.zeros + self.tail.len()
    }

    fn write(&self, w: &mut ChunkWriter<'_, '_, '_>) -> ControlFlow<()> {
        w.push(self.head.as_bytes())?;
        w.push_repeat(b'0', self.zeros)?;
        w.push(self.tail.as_bytes())
    }
}

fn emit_float(
    w: &mut ChunkWriter<'_, '_, '_>,
    sign: &[u8],
    text: &FloatText,
    field: Field,
    zero_pad: bool,
) -> ControlFlow<()> {
    let pad = field.width.saturating_sub(sign.len() + text.len());
    if field.flags.left {
        w.push(sign)?;
        text.write(w)?;
        w.push_repeat(b' ', pad)
    } else if zero_pad {
        w.push(sign)?;
        w.push_repeat(b'0', pad)?;
        text.write(w)
    } else {
        w.push_repeat(b' ', pad)?;
        w.push(sign)?;
        text.write(w)
    }
}

fn fixed_form(a: f64, prec: usize, alt: bool) -> FloatText {
    let shown = prec.min(EXACT_PLACES);
    let mut head = format!("{a:.shown$}");
    if alt && prec == 0 {
        head.push('.');
    }
    FloatText {
        head,
        zeros: prec - shown,
        tail: String::new(),
    }
}

/// Decimal exponent of `a` once rounded to `prec + 1` significant digits.
fn decimal_exponent(a: f64, prec: usize) -> i32 {
    let shown = prec.min(EXACT_PLACES);
    let rendered = format!("{a:.shown$e}");
    rendered
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0)
}

fn exp_form(a: f64, prec: usize, alt: bool, upper: bool) -> FloatText {
    let shown = prec.min(EXACT_PLACES);
    let rendered = format!("{a:.shown$e}");
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut head = mantissa.to_owned();
    if alt && prec == 0 {
        head.push('.');
    }
    let tail = format!(
        "{}{}{:02}",
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.unsigned_abs()
    );
    FloatText {
        head,
        zeros: prec - shown,
        tail,
    }
}

fn general_form(a: f64, precision: Option<usize>, alt: bool, upper: bool) -> FloatText {
    let p = match precision {
        None => FLOAT_PRECISION,
        Some(0) => 1,
        Some(p) => p,
    };
    let x = if a == 0.0 {
        0
    } else {
        decimal_exponent(a, p - 1)
    };
    let mut text = if x >= -4 && (x as i64) < p as i64 {
        fixed_form(a, (p as i64 - 1 - x as i64) as usize, alt)
    } else {
        exp_form(a, p - 1, alt, upper)
    };
    if !alt {
        text.zeros = 0;
        strip_fraction_zeros(&mut text.head);
    }
    text
}

/// Remove trailing fraction zeros, and then a bare point.
fn strip_fraction_zeros(mantissa: &mut String) {
    if !mantissa.contains('.') {
        return;
    }
    let kept = mantissa.trim_end_matches('0').trim_end_matches('.').len();
    mantissa.truncate(kept);
}
