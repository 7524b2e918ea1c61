//! Format-string tokenization and replacement-spec parsing.

use core::mem;

use memchr::memchr;

use crate::error::Error;
use crate::radix::Radix;

/// How the field's radix was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BaseSpec {
    /// No base given; decimal.
    Default,
    /// One of the `b`/`o`/`d`/`x` letter bases.
    Named(Radix),
    /// An `r<n>` base.
    Arbitrary(Radix),
    /// An `r<n>` base outside `1..=32`; the field emits padding only.
    Invalid(u64),
}

/// Extra rendering mode attached to the options part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extra {
    None,
    /// Uppercase digit alphabet (`X`, `H`, `R<n>`).
    Uppercase,
    /// Render the argument as a single char (`c`).
    Char,
    /// Render the argument as a prefixed pointer address (`p`).
    Ptr,
}

/// Which side of the field the value is flushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
    Center,
}

/// Field width: fixed, or supplied by the next argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    Fixed(usize),
    Dynamic,
}

/// Parsed replacement field, consumed by the engine before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Replacement<'a> {
    /// Raw spec bytes between the braces.
    pub spec: &'a str,
    pub base: BaseSpec,
    pub extra: Extra,
    pub side: Side,
    pub width: Width,
    pub pad: u8,
}

impl<'a> Replacement<'a> {
    fn new(spec: &'a str) -> Self {
        Self {
            spec,
            base: BaseSpec::Default,
            extra: Extra::None,
            side: Side::Left,
            width: Width::Fixed(0),
            pad: b' ',
        }
    }
}

/// One segment of the format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    /// A run to copy verbatim.
    Literal(&'a str),
    /// A parsed replacement field.
    Field(Replacement<'a>),
}

const PRINTABLE_ASCII: core::ops::RangeInclusive<u8> = 0x20..=0x7e;

/// Splits a format string into literal runs and replacement fields.
///
/// Recoverable oddities found while parsing a spec (an unprintable pad byte,
/// an out-of-range radix) are recorded as notes for the engine to report;
/// they do not fail the parse.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    fmt: &'a str,
    pos: usize,
    notes: Vec<Error>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(fmt: &'a str) -> Self {
        Self {
            fmt,
            pos: 0,
            notes: Vec::new(),
        }
    }

    /// Drains the diagnostics recorded by the last [`next_piece`] call.
    ///
    /// [`next_piece`]: Self::next_piece
    pub(crate) fn take_notes(&mut self) -> Vec<Error> {
        mem::take(&mut self.notes)
    }

    /// Produces the next literal run or replacement field.
    ///
    /// `Ok(None)` signals the end of the format string. A [`BadSpec`] error
    /// leaves the parser positioned after the offending field so the caller
    /// can drop it and continue; [`TruncatedField`] is terminal.
    ///
    /// [`BadSpec`]: Error::BadSpec
    /// [`TruncatedField`]: Error::TruncatedField
    pub(crate) fn next_piece(&mut self) -> Result<Option<Piece<'a>>, Error> {
        let rest = &self.fmt.as_bytes()[self.pos..];
        if rest.is_empty() {
            return Ok(None);
        }
        if rest[0] != b'{' {
            let end = memchr(b'{', rest).unwrap_or(rest.len());
            let literal = &self.fmt[self.pos..self.pos + end];
            self.pos += end;
            return Ok(Some(Piece::Literal(literal)));
        }

        let run = rest.iter().take_while(|&&byte| byte == b'{').count();
        if run > 1 {
            // Doubled braces escape; an odd trailing `{` opens a real field.
            let literal = &self.fmt[self.pos..self.pos + run / 2];
            self.pos += run - run % 2;
            return Ok(Some(Piece::Literal(literal)));
        }

        let body = &rest[1..];
        let Some(close) = memchr(b'}', body) else {
            return Err(Error::TruncatedField { pos: self.pos });
        };
        if let Some(open) = memchr(b'{', body) {
            if open < close {
                // A stray `{` before the closing brace; recover by treating
                // everything up to the next `{` as a literal.
                let literal = &self.fmt[self.pos..self.pos + 1 + open];
                self.pos += 1 + open;
                return Ok(Some(Piece::Literal(literal)));
            }
        }

        let spec = &self.fmt[self.pos + 1..self.pos + 1 + close];
        self.pos += close + 2;
        let replacement = self.parse_spec(spec)?;
        Ok(Some(Piece::Field(replacement)))
    }

    fn parse_spec(&mut self, spec: &'a str) -> Result<Replacement<'a>, Error> {
        let mut replacement = Replacement::new(spec);
        let bytes = spec.as_bytes();
        if bytes.is_empty() {
            return Ok(replacement);
        }

        let mut i = 0;
        if bytes[0] == b':' {
            i = 1;
            let Some(&pad) = bytes.get(i) else {
                return Err(bad_spec(spec, "missing pad byte after ':'"));
            };
            if PRINTABLE_ASCII.contains(&pad) {
                replacement.pad = pad;
            } else {
                self.notes
                    .push(bad_spec(spec, "pad byte is not printable ASCII"));
            }
            i += 1;

            if let Some(&byte) = bytes.get(i) {
                let side = match byte {
                    b'<' | b'+' => Some(Side::Left),
                    b'>' | b'-' => Some(Side::Right),
                    b' ' | b'=' => Some(Side::Center),
                    _ => None,
                };
                if let Some(side) = side {
                    replacement.side = side;
                    i += 1;
                }
            }

            if bytes.get(i) == Some(&b'*') {
                replacement.width = Width::Dynamic;
                i += 1;
            } else {
                let digits_start = i;
                let mut width = 0_usize;
                while let Some(&digit) = bytes.get(i) {
                    if !digit.is_ascii_digit() {
                        break;
                    }
                    width = width
                        .checked_mul(10)
                        .and_then(|width| width.checked_add(usize::from(digit - b'0')))
                        .ok_or_else(|| bad_spec(spec, "width overflows usize"))?;
                    i += 1;
                }
                if i == digits_start {
                    return Err(bad_spec(spec, "missing width"));
                }
                replacement.width = Width::Fixed(width);
            }
        }

        if i < bytes.len() {
            if bytes[i] != b'%' {
                return Err(bad_spec(spec, "expected '%' to start the options part"));
            }
            i += 1;
            self.parse_options(&mut replacement, &bytes[i..])?;
        }
        Ok(replacement)
    }

    fn parse_options(
        &mut self,
        replacement: &mut Replacement<'_>,
        options: &[u8],
    ) -> Result<(), Error> {
        let spec = replacement.spec;
        let head = match options.split_last() {
            None => return Err(bad_spec(spec, "empty options part")),
            Some((&b'p' | &b'P', head)) => {
                replacement.extra = Extra::Ptr;
                replacement.base = BaseSpec::Named(Radix::HEX);
                head
            }
            Some((&b'c' | &b'C', head)) => {
                replacement.extra = Extra::Char;
                head
            }
            _ => options,
        };

        // `Ptr` already renders uppercase, so it keeps the extra slot.
        let set_uppercase = |replacement: &mut Replacement<'_>| {
            if replacement.extra == Extra::None {
                replacement.extra = Extra::Uppercase;
            }
        };

        let named = |radix| BaseSpec::Named(radix);
        match head {
            [] => {}
            [b'b' | b'B'] => replacement.base = named(Radix::BIN),
            [b'o' | b'O'] => replacement.base = named(Radix::OCT),
            [b'd' | b'D'] => replacement.base = named(Radix::DEC),
            [b'x' | b'h'] => replacement.base = named(Radix::HEX),
            [b'X' | b'H'] => {
                replacement.base = named(Radix::HEX);
                set_uppercase(replacement);
            }
            [letter @ (b'r' | b'R'), digits @ ..] => {
                if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
                    return Err(bad_spec(spec, "malformed 'r' radix"));
                }
                let mut base = 0_u64;
                for &digit in digits {
                    base = base
                        .saturating_mul(10)
                        .saturating_add(u64::from(digit - b'0'));
                }
                replacement.base = match u8::try_from(base).ok().and_then(Radix::new) {
                    Some(radix) => BaseSpec::Arbitrary(radix),
                    None => BaseSpec::Invalid(base),
                };
                if *letter == b'R' {
                    set_uppercase(replacement);
                }
            }
            _ => return Err(bad_spec(spec, "unrecognized base")),
        }
        Ok(())
    }
}

fn bad_spec(spec: &str, reason: &'static str) -> Error {
    Error::BadSpec {
        spec: spec.to_owned(),
        reason,
    }
}
