//! Error taxonomy shared across crates.

use std::fmt;

/// Classification of every failure the engine can report.
///
/// Each crate keeps its own error enum; `kind()` on those enums maps onto
/// this set so callers can decide how to surface a failure without matching
/// on crate-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input from the caller (empty expression, bad filter, missing field).
    InvalidInput,
    /// Expression text that cannot be parsed.
    Syntax,
    /// Unknown variable, order reference or layout item.
    UndefinedReference,
    /// Unknown aggregate function.
    UnsupportedOperation,
    /// Variable resolution cycle.
    CircularDependency,
    /// Inverted subtotal range or duplicate order.
    RangeViolation,
}

impl ErrorKind {
    /// Short machine-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid-input",
            Self::Syntax => "syntax",
            Self::UndefinedReference => "undefined-reference",
            Self::UnsupportedOperation => "unsupported-operation",
            Self::CircularDependency => "circular-dependency",
            Self::RangeViolation => "range-violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
