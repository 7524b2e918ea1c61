//! The formatter engine: field dispatch, alignment and category writers.

use core::fmt;
use std::panic::Location;

use crate::argument::Argument;
use crate::buffer::Buf;
use crate::error::Error;
use crate::parser::{BaseSpec, Extra, Parser, Piece, Replacement, Side, Width};
use crate::radix::{self, Radix};
use crate::sink;

/// Runtime formatting engine and the handle passed to [`CustomFmt`] hooks.
///
/// A formatter exclusively borrows its output buffer for the duration of a
/// [`run`] call; it is not re-entrant on the same buffer. Formatting is
/// best-effort: recoverable problems (a malformed spec, a category mismatch,
/// surplus arguments) are reported as diagnostics and the run continues,
/// while an unterminated field or missing argument aborts with an error
/// after partial output has been written.
///
/// [`CustomFmt`]: crate::CustomFmt
/// [`run`]: Self::run
///
/// # Examples
///
/// ```
/// use runtime_fmt::{Argument, Formatter, SmallBuf};
///
/// let mut buf = SmallBuf::<64>::new();
/// Formatter::new(&mut buf)
///     .run("{:0-6%x}", &[Argument::from(255_u32)])
///     .unwrap();
/// assert_eq!(buf.as_slice(), b"0000ff");
/// ```
pub struct Formatter<'a> {
    out: &'a mut dyn Buf,
    permissive: bool,
    caller: &'static Location<'static>,
}

impl fmt::Debug for Formatter<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Formatter")
            .field("permissive", &self.permissive)
            .field("written", &self.out.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Formatter<'a> {
    /// Creates an engine writing into `out`.
    #[track_caller]
    pub fn new(out: &'a mut dyn Buf) -> Self {
        Self {
            out,
            permissive: false,
            caller: Location::caller(),
        }
    }

    /// Enables permissive coercion for every field, not just those with a
    /// `c`/`p` extra.
    #[must_use]
    pub fn permissive(mut self, permissive: bool) -> Self {
        self.permissive = permissive;
        self
    }

    /// Formats `fmt` with the given positional arguments into the output
    /// buffer.
    pub fn run(&mut self, fmt: &str, args: &[Argument<'_>]) -> Result<(), Error> {
        let mut parser = Parser::new(fmt);
        let mut next_arg = 0_usize;
        loop {
            let piece = parser.next_piece();
            for note in parser.take_notes() {
                self.report(&note);
            }
            match piece {
                Ok(None) => break,
                Ok(Some(Piece::Literal(literal))) => self.out.append(literal.as_bytes()),
                Ok(Some(Piece::Field(replacement))) => {
                    if let Err(err) = self.field(&replacement, args, &mut next_arg) {
                        self.report(&err);
                        return Err(err);
                    }
                }
                Err(err) => {
                    self.report(&err);
                    if err.is_fatal() {
                        return Err(err);
                    }
                    // A dropped field; keep going.
                }
            }
        }
        if next_arg < args.len() {
            self.report(&Error::ArgOverflow {
                unused: args.len() - next_arg,
            });
        }
        Ok(())
    }

    fn field<'v>(
        &mut self,
        replacement: &Replacement<'_>,
        args: &[Argument<'v>],
        next_arg: &mut usize,
    ) -> Result<(), Error> {
        let width = match replacement.width {
            Width::Fixed(width) => width,
            Width::Dynamic => {
                let arg = take_arg(args, next_arg)?;
                if arg.is_int(self.permissive) {
                    usize::try_from(arg.as_u64(self.permissive)).unwrap_or(usize::MAX)
                } else {
                    self.report(&Error::CategoryMismatch {
                        wanted: "integer width",
                        found: arg.type_name(),
                    });
                    0
                }
            }
        };

        let arg = take_arg(args, next_arg)?;
        if let Some(custom) = arg.as_custom() {
            // Width is unknown for custom output, so no alignment applies.
            custom.fmt_with(self);
            return Ok(());
        }

        let (base, named) = match replacement.base {
            BaseSpec::Default => (Radix::DEC, true),
            BaseSpec::Named(radix) => (radix, true),
            BaseSpec::Arbitrary(radix) => (radix, false),
            BaseSpec::Invalid(bad) => {
                self.report(&Error::BadBase { base: bad });
                self.out.fill(width, replacement.pad);
                return Ok(());
            }
        };

        match replacement.extra {
            Extra::Char => self.char_field(replacement, width, &arg, true),
            Extra::Ptr => self.ptr_field(replacement, width, base, named, &arg),
            Extra::None | Extra::Uppercase => match arg {
                Argument::Char(_) => self.char_field(replacement, width, &arg, false),
                Argument::Ptr(_) => self.ptr_field(replacement, width, base, named, &arg),
                Argument::CStr(_) | Argument::OwnedStr(_) | Argument::StrView(_) => {
                    self.str_field(replacement, width, &arg);
                }
                _ => self.int_field(replacement, width, base, &arg),
            },
        }
        Ok(())
    }

    fn int_field(
        &mut self,
        replacement: &Replacement<'_>,
        width: usize,
        base: Radix,
        arg: &Argument<'_>,
    ) {
        let upper = replacement.extra == Extra::Uppercase;
        let permissive = self.permissive;
        if arg.is_signed_int(permissive) {
            let value = arg.as_i64(permissive);
            let magnitude = value.unsigned_abs();
            let len = radix::count_digits(base, magnitude) + usize::from(value < 0);
            self.pad_around(replacement, width, len, |f| {
                if value < 0 {
                    f.out.push(b'-');
                }
                radix::write_digits(f.out, base, magnitude, upper);
            });
        } else {
            let value = arg.as_u64(permissive);
            let len = radix::count_digits(base, value);
            self.pad_around(replacement, width, len, |f| {
                radix::write_digits(f.out, base, value, upper);
            });
        }
    }

    fn ptr_field(
        &mut self,
        replacement: &Replacement<'_>,
        width: usize,
        base: Radix,
        named: bool,
        arg: &Argument<'_>,
    ) {
        let permissive = self.permissive || replacement.extra == Extra::Ptr;
        if !arg.is_ptr(permissive) {
            self.report(&Error::CategoryMismatch {
                wanted: "pointer",
                found: arg.type_name(),
            });
        }
        let address = arg.as_ptr(permissive) as u64;
        let prefix = if named {
            match base.get() {
                2 => b'b',
                8 => b'o',
                10 => b'd',
                _ => b'x',
            }
        } else {
            b'z'
        };
        let upper = matches!(replacement.extra, Extra::Uppercase | Extra::Ptr);
        let len = radix::count_digits(base, address) + 2;
        self.pad_around(replacement, width, len, |f| {
            f.out.push(b'0');
            f.out.push(prefix);
            radix::write_digits(f.out, base, address, upper);
        });
    }

    fn char_field(
        &mut self,
        replacement: &Replacement<'_>,
        width: usize,
        arg: &Argument<'_>,
        forced: bool,
    ) {
        let permissive = self.permissive || forced;
        let c = if arg.is_char(permissive) {
            arg.as_char(permissive)
        } else {
            self.report(&Error::CategoryMismatch {
                wanted: "char",
                found: arg.type_name(),
            });
            '\0'
        };
        self.pad_around(replacement, width, c.len_utf8(), |f| {
            f.write_char(c);
        });
    }

    fn str_field(&mut self, replacement: &Replacement<'_>, width: usize, arg: &Argument<'_>) {
        let bytes = arg.as_str(self.permissive);
        self.pad_around(replacement, width, bytes.len(), |f| {
            f.out.append(bytes);
        });
    }

    /// Emits the value produced by `write` together with the field's
    /// padding. A centered field puts the odd pad byte on the right.
    fn pad_around(
        &mut self,
        replacement: &Replacement<'_>,
        width: usize,
        len: usize,
        write: impl FnOnce(&mut Self),
    ) {
        let fill = width.saturating_sub(len);
        self.out.reserve(len + fill);
        match replacement.side {
            Side::Left => {
                write(self);
                self.out.fill(fill, replacement.pad);
            }
            Side::Right => {
                self.out.fill(fill, replacement.pad);
                write(self);
            }
            Side::Center => {
                self.out.fill(fill / 2, replacement.pad);
                write(self);
                self.out.fill(fill - fill / 2, replacement.pad);
            }
        }
    }

    fn report(&self, err: &Error) {
        sink::report_at(self.caller, err);
    }

    /// Appends a string to the output.
    pub fn write_str(&mut self, s: &str) {
        self.out.append(s.as_bytes());
    }

    /// Appends a single char to the output.
    pub fn write_char(&mut self, c: char) {
        let mut utf8 = [0_u8; 4];
        self.out.append(c.encode_utf8(&mut utf8).as_bytes());
    }

    /// Appends the decimal rendering of an integer to the output.
    pub fn write_int(&mut self, value: i64) {
        if value < 0 {
            self.out.push(b'-');
        }
        radix::write_digits(self.out, Radix::DEC, value.unsigned_abs(), false);
    }

    /// Ensures capacity for at least `additional` more output bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.out.reserve(additional);
    }

    /// Direct access to the output buffer.
    pub fn out(&mut self) -> &mut dyn Buf {
        &mut *self.out
    }
}

impl fmt::Write for Formatter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Formatter::write_str(self, s);
        Ok(())
    }
}

fn take_arg<'v>(args: &[Argument<'v>], next_arg: &mut usize) -> Result<Argument<'v>, Error> {
    let arg = args.get(*next_arg).copied().ok_or(Error::ArgUnderflow {
        needed: *next_arg + 1,
        supplied: args.len(),
    })?;
    *next_arg += 1;
    Ok(arg)
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;
    use crate::buffer::SmallBuf;

    fn run(fmt: &str, args: &[Argument<'_>]) -> Result<String, Error> {
        let mut buf = SmallBuf::<64>::new();
        let result = Formatter::new(&mut buf).run(fmt, args);
        let output = String::from_utf8_lossy(buf.as_slice()).into_owned();
        result.map(|()| output)
    }

    fn format(fmt: &str, args: &[Argument<'_>]) -> String {
        run(fmt, args).unwrap()
    }

    #[test]
    fn plain_fields() {
        assert_eq!(format("{}", &[Argument::from(42)]), "42");
        assert_eq!(format("{}", &[Argument::from(-42)]), "-42");
        assert_eq!(format("{}", &[Argument::from("text")]), "text");
        assert_eq!(format("{}", &[Argument::from('ß')]), "ß");
        assert_eq!(format("{}", &[Argument::from(0_u32)]), "0");
    }

    #[test]
    fn left_alignment_is_the_default_side() {
        assert_eq!(format("{:+9}", &[Argument::from(123)]), "123++++++");
        assert_eq!(format("{:_<6}", &[Argument::from("ab")]), "ab____");
    }

    #[test]
    fn right_alignment() {
        assert_eq!(format("{: -10%x}", &[Argument::from(-123)]), "       -7b");
        assert_eq!(format("{:0>4}", &[Argument::from(7)]), "0007");
    }

    #[test]
    fn center_alignment_puts_odd_byte_right() {
        assert_eq!(format("{: =9}", &[Argument::from("123")]), "   123   ");
        assert_eq!(format("{:*=6}", &[Argument::from("ab")]), "**ab**");
        assert_eq!(format("{:*=7}", &[Argument::from("ab")]), "**ab***");
    }

    #[test]
    fn width_smaller_than_value_is_ignored() {
        assert_eq!(format("{:+2}", &[Argument::from(12345)]), "12345");
        assert_eq!(format("{:+5}", &[Argument::from("12345")]), "12345");
    }

    #[test]
    fn dynamic_width_consumes_an_extra_argument() {
        let args = [Argument::from(9_usize), Argument::from("123")];
        assert_eq!(format("{: =*%D}", &args), "   123   ");
    }

    #[test]
    fn dynamic_width_mismatch_coerces_to_zero() {
        let args = [Argument::from("not a width"), Argument::from("123")];
        assert_eq!(format("{: =*}", &args), "123");
    }

    #[test]
    fn named_bases() {
        assert_eq!(format("{%b}", &[Argument::from(42)]), "101010");
        assert_eq!(format("{%o}", &[Argument::from(42)]), "52");
        assert_eq!(format("{%d}", &[Argument::from(42)]), "42");
        assert_eq!(format("{%x}", &[Argument::from(42)]), "2a");
        assert_eq!(format("{%X}", &[Argument::from(42)]), "2A");
        assert_eq!(format("{%h}", &[Argument::from(254)]), "fe");
        assert_eq!(format("{%H}", &[Argument::from(254)]), "FE");
    }

    #[test]
    fn arbitrary_radices() {
        assert_eq!(format("{%r5}", &[Argument::from(789_942)]), "200234232");
        assert_eq!(format("{%r36}", &[Argument::from(0)]), "");
        assert_eq!(format("{%r2}", &[Argument::from(5)]), "101");
        assert_eq!(format("{%R20}", &[Argument::from(1234)]), "31E");
    }

    #[test]
    fn negative_values_in_other_bases() {
        assert_eq!(format("{%x}", &[Argument::from(-255)]), "-ff");
        assert_eq!(format("{%b}", &[Argument::from(-2)]), "-10");
        assert_eq!(format("{}", &[Argument::from(i64::MIN)]), i64::MIN.to_string());
    }

    #[test]
    fn unsigned_values_do_not_get_a_sign() {
        assert_eq!(format("{%x}", &[Argument::from(u64::MAX)]), "f".repeat(16));
    }

    #[test]
    fn invalid_base_emits_padding_only() {
        assert_eq!(format("{:~5%r33}", &[Argument::from(42)]), "~~~~~");
        assert_eq!(format("[{%r0}]", &[Argument::from(42)]), "[]");
    }

    #[test]
    fn pointer_rendering() {
        let value = 0_u8;
        let ptr = &value as *const u8;
        let addr = ptr as usize as u64;

        let rendered = format("{}", &[Argument::from(ptr)]);
        assert_eq!(rendered, std::format!("0d{addr}"));

        let rendered = format("{%x}", &[Argument::from(ptr)]);
        assert_eq!(rendered, std::format!("0x{addr:x}"));

        let rendered = format("{%p}", &[Argument::from(ptr)]);
        assert_eq!(rendered, std::format!("0x{addr:X}"));

        let rendered = format("{%b}", &[Argument::from(ptr)]);
        assert_eq!(rendered, std::format!("0b{addr:b}"));
    }

    #[test]
    fn arbitrary_radix_pointers_use_the_z_prefix() {
        let value = 0_u8;
        let ptr = &value as *const u8;
        let rendered = format("{%r16}", &[Argument::from(ptr)]);
        let addr = ptr as usize as u64;
        assert_eq!(rendered, std::format!("0z{addr:x}"));
    }

    #[test]
    fn cstr_with_ptr_extra_formats_its_address() {
        let owned = CString::new("xyz").unwrap();
        let addr = owned.as_ptr() as usize as u64;
        let rendered = format("{%p}", &[Argument::from(owned.as_c_str())]);
        assert_eq!(rendered, std::format!("0x{addr:X}"));
    }

    #[test]
    fn pointer_width_accounts_for_the_prefix() {
        let args = [Argument::from(core::ptr::null::<u8>())];
        assert_eq!(format("{:.>5%p}", &args), "..0x0");
        assert_eq!(format("{:.>5}", &[Argument::from(42)]), "...42");
    }

    #[test]
    fn char_extra_takes_the_first_char() {
        assert_eq!(format("{%c}", &[Argument::from("abc")]), "a");
        assert_eq!(format("{%c}", &[Argument::from("")]), " ");
        assert_eq!(format("{:-=5%c}", &[Argument::from("xyz")]), "--x--");
    }

    #[test]
    fn char_mismatch_falls_back_to_the_sentinel() {
        assert_eq!(format("{%c}", &[Argument::from(42)]), "\0");
    }

    #[test]
    fn arguments_keep_their_own_category() {
        // A base option does not turn a pointer or string into an integer.
        let ptr = core::ptr::null::<u8>();
        assert_eq!(format("{%d}", &[Argument::from(ptr)]), "0d0");
        assert_eq!(format("{%x}", &[Argument::from("ff")]), "ff");
    }

    #[test]
    fn ptr_extra_mismatch_falls_back_to_address_zero() {
        assert_eq!(format("{%p}", &[Argument::from(42)]), "0x0");
    }

    #[test]
    fn escaped_braces() {
        assert_eq!(format("{{", &[]), "{");
        assert_eq!(format("{{{{", &[]), "{{");
        assert_eq!(format("a{{b", &[]), "a{b");
        assert_eq!(format("{{{}}}", &[Argument::from(1)]), "{1}}");
    }

    #[test]
    fn literal_only_format_is_preserved() {
        assert_eq!(format("no fields at all", &[]), "no fields at all");
    }

    #[test]
    fn truncated_field_aborts_with_partial_output() {
        let (output, err) = {
            let mut buf = SmallBuf::<64>::new();
            let err = Formatter::new(&mut buf)
                .run("before {", &[])
                .unwrap_err();
            (String::from_utf8_lossy(buf.as_slice()).into_owned(), err)
        };
        assert_eq!(output, "before ");
        assert_eq!(err, Error::TruncatedField { pos: 7 });
    }

    #[test]
    fn bad_spec_drops_the_field_and_continues() {
        assert_eq!(format("a{%q}b{}c", &[Argument::from(1)]), "ab1c");
    }

    #[test]
    fn dropped_field_consumes_no_argument() {
        assert_eq!(format("{%q}{}", &[Argument::from(7)]), "7");
    }

    #[test]
    fn arg_underflow_aborts() {
        let err = run("{} {}", &[Argument::from(1)]).unwrap_err();
        assert_eq!(
            err,
            Error::ArgUnderflow {
                needed: 2,
                supplied: 1
            }
        );
    }

    #[test]
    fn arg_overflow_still_produces_output() {
        let args = [Argument::from(1), Argument::from(2)];
        assert_eq!(format("{}", &args), "1");
    }

    #[test]
    fn permissive_mode_lets_a_char_supply_the_dynamic_width() {
        let args = [Argument::from('\u{4}'), Argument::from("ab")];
        let mut buf = SmallBuf::<16>::new();
        Formatter::new(&mut buf)
            .permissive(true)
            .run("{:->*}", &args)
            .unwrap();
        assert_eq!(buf.as_slice(), b"--ab");

        // Without permissive coercion the width argument is a mismatch.
        let mut buf = SmallBuf::<16>::new();
        Formatter::new(&mut buf).run("{:->*}", &args).unwrap();
        assert_eq!(buf.as_slice(), b"ab");
    }

    #[test]
    fn custom_values_skip_alignment() {
        struct Dashes(usize);

        impl crate::CustomFmt for Dashes {
            fn fmt_with(&self, f: &mut Formatter<'_>) {
                for _ in 0..self.0 {
                    f.write_char('-');
                }
            }
        }

        let dashes = Dashes(3);
        let args = [Argument::custom(&dashes)];
        assert_eq!(format("[{:x>9}]", &args), "[---]");
    }

    #[test]
    fn formatter_handle_writers() {
        let mut buf = SmallBuf::<64>::new();
        let mut formatter = Formatter::new(&mut buf);
        formatter.write_str("x=");
        formatter.write_int(-42);
        formatter.write_char('!');
        formatter.reserve(16);
        formatter.out().push(b'.');
        assert_eq!(buf.as_slice(), b"x=-42!.");
    }
}
