//! Error taxonomy for format runs.

use thiserror::Error;

/// Error produced while running the formatter engine.
///
/// Errors are local to the field that triggered them: [`TruncatedField`] and
/// [`ArgUnderflow`] abort the run after partial output has been written, all
/// other kinds are reported as diagnostics and formatting continues.
///
/// [`TruncatedField`]: Error::TruncatedField
/// [`ArgUnderflow`]: Error::ArgUnderflow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A `{` opened a replacement field that is never closed.
    #[error("replacement field opened at byte {pos} is never closed")]
    TruncatedField {
        /// Byte offset of the opening `{` in the format string.
        pos: usize,
    },

    /// A replacement spec that does not follow the field grammar. The field
    /// is dropped from the output and consumes no argument.
    #[error("bad replacement spec {{{spec}}}: {reason}")]
    BadSpec {
        /// The spec bytes between the braces.
        spec: String,
        /// What made the spec unparseable.
        reason: &'static str,
    },

    /// An `r<n>` radix outside the supported range. The field emits padding
    /// only; its argument is consumed and skipped.
    #[error("radix {base} is outside the supported 1..=32 range")]
    BadBase {
        /// The requested radix.
        base: u64,
    },

    /// An argument that does not satisfy the category its field requires.
    /// The writer falls back to the category's sentinel value.
    #[error("expected a {wanted} argument, got {found}")]
    CategoryMismatch {
        /// Category required by the replacement field.
        wanted: &'static str,
        /// [`type_name`](crate::Argument::type_name) of the supplied argument.
        found: &'static str,
    },

    /// A replacement field with no argument left to consume. Aborts the run.
    #[error("format string references argument #{needed} but only {supplied} were supplied")]
    ArgUnderflow {
        /// 1-based index of the missing argument.
        needed: usize,
        /// Number of arguments supplied by the caller.
        supplied: usize,
    },

    /// Arguments remained after the format string was exhausted. Warn only.
    #[error("{unused} trailing arguments were never referenced")]
    ArgOverflow {
        /// Number of unconsumed arguments.
        unused: usize,
    },
}

impl Error {
    /// Whether this error aborts the format run rather than being recovered
    /// from in place.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TruncatedField { .. } | Self::ArgUnderflow { .. }
        )
    }
}
