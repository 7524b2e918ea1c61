/// Packages values into an array of [`Argument`](crate::Argument)s.
///
/// Each value is converted through `Argument`'s `From` conversions; wrap
/// user-defined values with [`Argument::custom`](crate::Argument::custom)
/// explicitly.
///
/// # Examples
///
/// ```
/// use runtime_fmt::{format, runtime_args};
///
/// let args = runtime_args!(42, "text", 'x');
/// assert_eq!(format("{} {} {}", &args), "42 text x");
/// ```
#[macro_export]
macro_rules! runtime_args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::Argument::from($arg)),*]
    };
}

/// Formats the arguments into a freshly allocated `String`.
///
/// # Examples
///
/// ```
/// use runtime_fmt::runtime_format;
///
/// let s = runtime_format!("Testing, {}!", "123");
/// assert_eq!(s, "Testing, 123!");
/// ```
#[macro_export]
macro_rules! runtime_format {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::format($fmt, &$crate::runtime_args!($($arg),*))
    };
}

/// Formats the arguments and flushes them to an `io::Write` sink.
///
/// # Examples
///
/// ```
/// use runtime_fmt::runtime_print;
///
/// let mut out = Vec::new();
/// runtime_print!(&mut out, "{%x}", 255).unwrap();
/// assert_eq!(out, b"ff");
/// ```
#[macro_export]
macro_rules! runtime_print {
    ($sink:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::print($sink, $fmt, &$crate::runtime_args!($($arg),*))
    };
}

/// Like [`runtime_print!`], appending a newline before flushing.
///
/// # Examples
///
/// ```
/// use runtime_fmt::runtime_println;
///
/// let mut out = Vec::new();
/// runtime_println!(&mut out, "{} items", 3_u32).unwrap();
/// assert_eq!(out, b"3 items\n");
/// ```
#[macro_export]
macro_rules! runtime_println {
    ($sink:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::println($sink, $fmt, &$crate::runtime_args!($($arg),*))
    };
}
