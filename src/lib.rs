//! Runtime-driven text formatting into small, promotable buffers.
//!
//! # What?
//!
//! This crate formats brace-delimited replacement fields against a
//! positional slice of heterogeneous [`Argument`] values. Unlike `std`'s
//! compile-time-checked formatting, the format string is data: specifier
//! syntax and argument-type compatibility are validated while formatting
//! runs, which makes the engine usable with format strings loaded from
//! configuration, templates or wire messages.
//!
//! Features:
//!
//! - Output goes through [`SmallBuf`], an inline-first byte buffer that only
//!   touches the heap once a write outgrows its inline capacity.
//! - Integers render in any radix from 1 (unary, capped with an ellipsis)
//!   to 32, selected per field: `{%b}`, `{%X}`, `{%r5}`.
//! - Fields align left, right or centered to a fixed or argument-supplied
//!   width, with any printable ASCII pad byte: `{:0>8%x}`, `{: =*}`.
//! - Formatting never panics. Malformed fields and mismatched arguments are
//!   reported as diagnostics through [`log`] and the engine produces
//!   best-effort output; only an unterminated field or a missing argument
//!   aborts a [`try_format`] run.
//! - User-defined types participate through the [`CustomFmt`] hook.
//!
//! # Replacement fields
//!
//! A field is `{`, an optional alignment part, an optional options part and
//! `}`. Literal braces are escaped by doubling (`{{`).
//!
//! ```text
//! alignment := ":" pad [side] width      side: < + left, > - right, space = center
//! width     := digits | "*"              "*" consumes the next argument
//! options   := "%" base [extra]          base: b o d x h, X H (uppercase), r<n>
//! extra     := c (as char) | p (as pointer address)
//! ```
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use runtime_fmt::runtime_format;
//!
//! let s = runtime_format!("Testing, {}!", "123");
//! assert_eq!(s, "Testing, 123!");
//! let s = runtime_format!("Testing, {:+9}!", 123);
//! assert_eq!(s, "Testing, 123++++++!");
//! let s = runtime_format!("Testing, {: =*%D}!", 9, "123");
//! assert_eq!(s, "Testing,    123   !");
//! ```
//!
//! ## Radices
//!
//! ```
//! use runtime_fmt::runtime_format;
//!
//! assert_eq!(runtime_format!("{%b}", 42), "101010");
//! assert_eq!(runtime_format!("{%X}", 42), "2A");
//! assert_eq!(runtime_format!("{%r5}", 789942), "200234232");
//! assert_eq!(runtime_format!("{: -10%x}", -123), "       -7b");
//! ```
//!
//! ## Writing to a sink
//!
//! ```
//! use runtime_fmt::runtime_println;
//!
//! let mut out = Vec::new();
//! runtime_println!(&mut out, "{} warnings", 2_u32).unwrap();
//! assert_eq!(out, b"2 warnings\n");
//! ```
//!
//! # Limitations
//!
//! - No floating-point formatting and no precision specifiers.
//! - String and C-string arguments are borrowed, never copied; their
//!   referents must outlive the format call.
//! - A single format run is strictly single-threaded; the only process-wide
//!   state is the [`set_color_mode`] flag read by the error sinks.

// Documentation settings.
#![doc(html_root_url = "https://docs.rs/runtime-fmt/0.1.0")]
// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

mod argument;
mod buffer;
mod error;
mod format;
mod macros;
mod parser;
mod radix;
mod sink;

pub use crate::{
    argument::{Argument, CustomFmt},
    buffer::{Buf, SmallBuf},
    error::Error,
    format::Formatter,
    sink::{
        color_mode, discard, print, print_error, println, println_error, set_color_mode,
    },
};

/// Formats `fmt` with the given positional arguments into a freshly
/// allocated `String`.
///
/// Formatting is best-effort: engine errors are reported as diagnostics and
/// the partial output is returned. Use [`try_format`] to observe fatal
/// errors. Non-UTF-8 bytes contributed by C-string arguments are replaced
/// with `U+FFFD`.
///
/// # Examples
///
/// ```
/// use runtime_fmt::{format, Argument};
///
/// let s = format("{: =7}|", &[Argument::from("mid")]);
/// assert_eq!(s, "  mid  |");
/// ```
#[track_caller]
pub fn format(fmt: &str, args: &[Argument<'_>]) -> String {
    let mut buf = SmallBuf::<{ sink::STACK_CAPACITY }>::new();
    let _ = Formatter::new(&mut buf).run(fmt, args);
    String::from_utf8_lossy(buf.as_slice()).into_owned()
}

/// Like [`format`], but surfaces fatal engine errors instead of returning
/// partial output.
///
/// # Examples
///
/// ```
/// use runtime_fmt::{try_format, Error};
///
/// let err = try_format("{} and {}", &runtime_fmt::runtime_args!(1)).unwrap_err();
/// assert!(matches!(err, Error::ArgUnderflow { .. }));
/// ```
#[track_caller]
pub fn try_format(fmt: &str, args: &[Argument<'_>]) -> Result<String, Error> {
    let mut buf = SmallBuf::<{ sink::STACK_CAPACITY }>::new();
    Formatter::new(&mut buf).run(fmt, args)?;
    Ok(String::from_utf8_lossy(buf.as_slice()).into_owned())
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
