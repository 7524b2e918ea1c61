//! Output sinks, the color-mode flag and stderr diagnostics.

use std::io::{self, Write};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::argument::Argument;
use crate::buffer::SmallBuf;
use crate::error::Error;
use crate::format::Formatter;

/// Whether colored error output is enabled. Only ever observed by the sinks
/// and diagnostics; relaxed ordering suffices.
static COLOR_MODE: AtomicBool = AtomicBool::new(false);

const RED_BOLD: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Inline capacity used by the entry-point buffers.
pub(crate) const STACK_CAPACITY: usize = 256;

/// Toggles colored error output, returning the previous setting.
pub fn set_color_mode(enabled: bool) -> bool {
    COLOR_MODE.swap(enabled, Ordering::Relaxed)
}

/// Returns whether colored error output is enabled.
pub fn color_mode() -> bool {
    COLOR_MODE.load(Ordering::Relaxed)
}

/// Formats into a stack buffer and flushes the result to `sink`.
///
/// Formatting is best-effort: engine errors are reported as diagnostics and
/// whatever output was produced is still flushed. The returned error is the
/// sink's, not the engine's.
///
/// # Examples
///
/// ```
/// use runtime_fmt::{print, Argument};
///
/// let mut out = Vec::new();
/// print(&mut out, "{} + {} = {}", &runtime_fmt::runtime_args!(1, 2, 3)).unwrap();
/// assert_eq!(out, b"1 + 2 = 3");
/// ```
#[track_caller]
pub fn print<W: Write>(sink: &mut W, fmt: &str, args: &[Argument<'_>]) -> io::Result<()> {
    let mut buf = SmallBuf::<STACK_CAPACITY>::new();
    let _ = Formatter::new(&mut buf).run(fmt, args);
    sink.write_all(buf.as_slice())
}

/// Like [`print`], appending a newline before flushing.
#[track_caller]
pub fn println<W: Write>(sink: &mut W, fmt: &str, args: &[Argument<'_>]) -> io::Result<()> {
    let mut buf = SmallBuf::<STACK_CAPACITY>::new();
    let _ = Formatter::new(&mut buf).run(fmt, args);
    buf.push(b'\n');
    sink.write_all(buf.as_slice())
}

/// Formats to stderr, wrapped in bold red when color mode is on.
#[track_caller]
pub fn print_error(fmt: &str, args: &[Argument<'_>]) -> io::Result<()> {
    let mut buf = SmallBuf::<STACK_CAPACITY>::new();
    let _ = Formatter::new(&mut buf).run(fmt, args);
    write_colored(&mut io::stderr().lock(), buf.as_slice())
}

/// Like [`print_error`], appending a newline after the colored message.
#[track_caller]
pub fn println_error(fmt: &str, args: &[Argument<'_>]) -> io::Result<()> {
    let mut buf = SmallBuf::<STACK_CAPACITY>::new();
    let _ = Formatter::new(&mut buf).run(fmt, args);
    let mut stderr = io::stderr().lock();
    write_colored(&mut stderr, buf.as_slice())?;
    stderr.write_all(b"\n")
}

/// Runs the engine for its diagnostic side effects in debug builds; the
/// output is discarded. Does nothing in release builds.
#[track_caller]
pub fn discard(fmt: &str, args: &[Argument<'_>]) {
    if cfg!(debug_assertions) {
        let mut buf = SmallBuf::<STACK_CAPACITY>::new();
        let _ = Formatter::new(&mut buf).run(fmt, args);
    }
}

fn write_colored<W: Write>(sink: &mut W, bytes: &[u8]) -> io::Result<()> {
    if color_mode() {
        sink.write_all(RED_BOLD.as_bytes())?;
        sink.write_all(bytes)?;
        sink.write_all(RESET.as_bytes())
    } else {
        sink.write_all(bytes)
    }
}

/// Routes a recovered engine error to the diagnostics channel, attributed
/// to the format call site.
pub(crate) fn report_at(caller: &'static Location<'static>, err: &Error) {
    log::warn!("in {}:{}: {err}", caller.file(), caller.line());
    #[cfg(feature = "stderr-diag")]
    {
        let line = std::format!("in {}:{}:\n  {err}\n", caller.file(), caller.line());
        let _ = write_colored(&mut io::stderr().lock(), line.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_flushes_to_any_io_writer() {
        let mut out = Vec::new();
        print(&mut out, "{}-{}", &[Argument::from(1), Argument::from(2)]).unwrap();
        assert_eq!(out, b"1-2");
    }

    #[test]
    fn println_appends_exactly_one_newline() {
        let mut out = Vec::new();
        println(&mut out, "line", &[]).unwrap();
        assert_eq!(out, b"line\n");
    }

    #[test]
    fn print_is_best_effort_on_engine_errors() {
        let mut out = Vec::new();
        print(&mut out, "partial {", &[]).unwrap();
        assert_eq!(out, b"partial ");
    }

    // The color flag is process-wide, so everything touching it lives in a
    // single test to keep the parallel test runner away from races.
    #[test]
    fn color_mode_controls_escapes() {
        let initial = set_color_mode(false);
        let mut out = Vec::new();
        write_colored(&mut out, b"boom").unwrap();
        assert_eq!(out, b"boom");

        assert!(!set_color_mode(true));
        assert!(color_mode());
        let mut out = Vec::new();
        write_colored(&mut out, b"boom").unwrap();
        assert_eq!(out, b"\x1b[1;31mboom\x1b[0m");

        assert!(set_color_mode(initial));
    }

    #[test]
    fn discard_never_panics() {
        discard("{} {", &[Argument::from(1)]);
        discard("{}", &[]);
    }
}
