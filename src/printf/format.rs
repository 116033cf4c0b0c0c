use heapless::Vec;

use core::fmt;
use core::fmt::Write;
use core::slice::from_raw_parts;

use crate::atoi::atoi_usize;
use crate::strlen::strlen;
use crate::variadic::VaList;

/// The most chunks a format string parses into; anything beyond is dropped.
const MAX_CHUNKS: usize = 64;

/// One parsed conversion directive.
#[derive(Debug)]
pub enum FormatSpec {
    Char,
    Decimal(DecimalFormat),
    UnsignedDecimal(DecimalFormat),
    Octal(DecimalFormat),
    Hexadecimal(DecimalFormat),
    FloatingPoint(DecimalFormat),
    ExponentialFloatingPoint(DecimalFormat),
    String,
}

#[derive(Debug, PartialOrd, PartialEq)]
pub enum DecimalFormat {
    Unconstrained,
    SpaceFilled(usize),
    ZeroFilled(usize),
    LeftJustified(usize),
}

/// Write target that stores what fits and counts what the full output needs.
///
/// One byte of the wrapped slice is always held back for the terminator, so
/// a caller can null-terminate whatever was stored.
struct FormatOutput<'a> {
    output: &'a mut [u8],
    pos: usize,
    needed: usize,
}

impl<'a> FormatOutput<'a> {
    fn wrap(output: &'a mut [u8]) -> Self {
        FormatOutput {
            output,
            pos: 0,
            needed: 0,
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.needed += bytes.len();
        let room = self.output.len().saturating_sub(1).saturating_sub(self.pos);
        let take = bytes.len().min(room);
        self.output[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
        self.pos += take;
    }

    /// Null-terminates the stored text and reports the full required length.
    fn finish(self) -> usize {
        if !self.output.is_empty() {
            self.output[self.pos] = 0;
        }
        self.needed
    }
}

impl<'a> Write for FormatOutput<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}

fn write_number<T: fmt::Display>(output: &mut FormatOutput, value: T, width: &DecimalFormat) {
    let _ = match width {
        DecimalFormat::Unconstrained => write!(output, "{}", value),
        DecimalFormat::SpaceFilled(w) => write!(output, "{:1$}", value, *w),
        DecimalFormat::ZeroFilled(w) => write!(output, "{:01$}", value, *w),
        DecimalFormat::LeftJustified(w) => write!(output, "{:<1$}", value, *w),
    };
}

fn write_octal(output: &mut FormatOutput, value: u32, width: &DecimalFormat) {
    let _ = match width {
        DecimalFormat::Unconstrained => write!(output, "{:o}", value),
        DecimalFormat::SpaceFilled(w) => write!(output, "{:1$o}", value, *w),
        DecimalFormat::ZeroFilled(w) => write!(output, "{:01$o}", value, *w),
        DecimalFormat::LeftJustified(w) => write!(output, "{:<1$o}", value, *w),
    };
}

fn write_hexadecimal(output: &mut FormatOutput, value: u32, width: &DecimalFormat) {
    let _ = match width {
        DecimalFormat::Unconstrained => write!(output, "{:x}", value),
        DecimalFormat::SpaceFilled(w) => write!(output, "{:1$x}", value, *w),
        DecimalFormat::ZeroFilled(w) => write!(output, "{:01$x}", value, *w),
        DecimalFormat::LeftJustified(w) => write!(output, "{:<1$x}", value, *w),
    };
}

// C's default of six fractional digits.
fn write_float(output: &mut FormatOutput, value: f64, width: &DecimalFormat) {
    let _ = match width {
        DecimalFormat::Unconstrained => write!(output, "{:.6}", value),
        DecimalFormat::SpaceFilled(w) => write!(output, "{:1$.6}", value, *w),
        DecimalFormat::ZeroFilled(w) => write!(output, "{:01$.6}", value, *w),
        DecimalFormat::LeftJustified(w) => write!(output, "{:<1$.6}", value, *w),
    };
}

fn write_exponential(output: &mut FormatOutput, value: f64, width: &DecimalFormat) {
    let _ = match width {
        DecimalFormat::Unconstrained => write!(output, "{:.6e}", value),
        DecimalFormat::SpaceFilled(w) => write!(output, "{:1$.6e}", value, *w),
        DecimalFormat::ZeroFilled(w) => write!(output, "{:01$.6e}", value, *w),
        DecimalFormat::LeftJustified(w) => write!(output, "{:<1$.6e}", value, *w),
    };
}

impl FormatSpec {
    /// Parses a directive body, conversion character included, width prefix
    /// and all. Returns `None` for an unknown conversion.
    pub fn from(spec: &[u8]) -> Option<FormatSpec> {
        let conversion = *spec.last()? as char;
        let width = Self::parse_simple_number_format(&spec[..spec.len() - 1]);
        match conversion {
            'c' => Some(FormatSpec::Char),
            'd' | 'i' => Some(FormatSpec::Decimal(width)),
            'e' => Some(FormatSpec::ExponentialFloatingPoint(width)),
            'f' => Some(FormatSpec::FloatingPoint(width)),
            'o' => Some(FormatSpec::Octal(width)),
            's' => Some(FormatSpec::String),
            'u' => Some(FormatSpec::UnsignedDecimal(width)),
            'x' => Some(FormatSpec::Hexadecimal(width)),
            _ => None,
        }
    }

    fn parse_simple_number_format(fmt: &[u8]) -> DecimalFormat {
        if fmt.is_empty() {
            return DecimalFormat::Unconstrained;
        }

        match fmt[0] {
            b'-' => {
                if let Some(num) = atoi_usize(&fmt[1..]) {
                    return DecimalFormat::LeftJustified(num);
                }
            }
            b'0' => {
                if let Some(num) = atoi_usize(&fmt[1..]) {
                    return DecimalFormat::ZeroFilled(num);
                }
            }
            _ => {
                if let Some(num) = atoi_usize(fmt) {
                    return DecimalFormat::SpaceFilled(num);
                }
            }
        }

        DecimalFormat::Unconstrained
    }

    /// Consumes one argument off the cursor and renders it.
    fn merge(&self, output: &mut FormatOutput, args: &mut VaList) {
        match self {
            FormatSpec::Char => {
                // chars arrive promoted to int
                let value = args.va_arg::<u32>();
                output.write_bytes(&[value as u8]);
            }
            FormatSpec::Decimal(width) => {
                let value = args.va_arg::<i32>();
                write_number(output, value, width);
            }
            FormatSpec::UnsignedDecimal(width) => {
                let value = args.va_arg::<u32>();
                write_number(output, value, width);
            }
            FormatSpec::Octal(width) => {
                let value = args.va_arg::<u32>();
                write_octal(output, value, width);
            }
            FormatSpec::Hexadecimal(width) => {
                let value = args.va_arg::<u32>();
                write_hexadecimal(output, value, width);
            }
            FormatSpec::FloatingPoint(width) => {
                let value = args.va_arg::<f64>();
                write_float(output, value, width);
            }
            FormatSpec::ExponentialFloatingPoint(width) => {
                let value = args.va_arg::<f64>();
                write_exponential(output, value, width);
            }
            FormatSpec::String => {
                let ptr = args.va_arg::<*const u8>();
                if ptr.is_null() {
                    output.write_bytes(b"(null)");
                } else {
                    let bytes = unsafe { from_raw_parts(ptr, strlen(ptr)) };
                    output.write_bytes(bytes);
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum Chunk<'a> {
    Literal(&'a [u8]),
    Format(FormatSpec),
}

/// A format string parsed into literal runs and conversion directives.
#[derive(Debug)]
pub struct FormatString<'a> {
    chunks: Vec<Chunk<'a>, MAX_CHUNKS>,
}

fn is_spec_type(c: u8) -> bool {
    matches!(
        c,
        b'c' | b'd' | b'e' | b'f' | b'i' | b'o' | b's' | b'u' | b'x'
    )
}

fn find(slice: &[u8], needle: u8) -> Option<usize> {
    slice.iter().position(|b| *b == needle)
}

fn find_if(slice: &[u8], searcher: &dyn Fn(u8) -> bool) -> Option<usize> {
    slice.iter().position(|b| searcher(*b))
}

impl<'a> FormatString<'a> {
    pub fn from(format: &'a [u8]) -> Self {
        let mut chunks: Vec<Chunk<'a>, MAX_CHUNKS> = Vec::new();
        let mut cur = 0;

        while cur < format.len() {
            let perc = match find(&format[cur..], b'%') {
                None => {
                    let _ = chunks.push(Chunk::Literal(&format[cur..]));
                    break;
                }
                Some(off) => cur + off,
            };
            if perc > cur {
                let _ = chunks.push(Chunk::Literal(&format[cur..perc]));
            }

            // "%%" is a literal percent sign
            if format.get(perc + 1) == Some(&b'%') {
                let _ = chunks.push(Chunk::Literal(&format[perc..perc + 1]));
                cur = perc + 2;
                continue;
            }

            match find_if(&format[perc + 1..], &is_spec_type) {
                None => break, // dangling directive, nothing renderable left
                Some(off) => {
                    let end = perc + 1 + off;
                    if let Some(spec) = FormatSpec::from(&format[perc + 1..=end]) {
                        let _ = chunks.push(Chunk::Format(spec));
                    }
                    cur = end + 1;
                }
            }
        }

        Self { chunks }
    }

    /// Renders into `output`, null-terminating whatever fits, and returns the
    /// length the complete text requires, terminator excluded.
    pub fn merge(&self, output: &mut [u8], args: &mut VaList) -> usize {
        let mut target = FormatOutput::wrap(output);
        for chunk in self.chunks.iter() {
            match chunk {
                Chunk::Literal(bytes) => target.write_bytes(bytes),
                Chunk::Format(spec) => spec.merge(&mut target, args),
            }
        }
        target.finish()
    }
}
