//! Expression error types.

use crate::lexer::Span;
use finreport_core::ErrorKind;
use thiserror::Error;

/// Kinds of syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// No tokens at all.
    #[error("Empty expression")]
    Empty,
    /// Input the lexer does not recognize.
    #[error("Invalid character '{0}'")]
    InvalidCharacter(String),
    /// A token where an operand was expected, or an operand where an operator was expected.
    #[error("Unexpected token '{0}'")]
    UnexpectedToken(String),
    /// Input ended where an operand was expected.
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    /// An opening parenthesis was never closed.
    #[error("Missing closing parenthesis")]
    MissingClosingParen,
    /// A closing parenthesis without a matching opening one.
    #[error("Unmatched closing parenthesis")]
    UnmatchedClosingParen,
    /// A number literal that does not fit the decimal type.
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    /// Nesting beyond [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("Expression nested too deeply")]
    TooDeep,
}

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {}", .span.start)]
pub struct SyntaxError {
    /// What went wrong.
    pub kind: SyntaxErrorKind,
    /// Where it went wrong.
    pub span: Span,
}

impl SyntaxError {
    /// Create a new syntax error.
    #[must_use]
    pub const fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match &self.kind {
            SyntaxErrorKind::Empty => "empty expression",
            SyntaxErrorKind::InvalidCharacter(_) => "not allowed in expressions",
            SyntaxErrorKind::UnexpectedToken(_) => "expected a number, variable, order reference or '('",
            SyntaxErrorKind::UnexpectedEnd => "expression ends here",
            SyntaxErrorKind::MissingClosingParen => "unclosed parenthesis",
            SyntaxErrorKind::UnmatchedClosingParen => "no matching '('",
            SyntaxErrorKind::InvalidNumber(_) => "number out of range",
            SyntaxErrorKind::TooDeep => "nesting limit reached here",
        }
    }
}

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// The expression text is empty.
    #[error("Invalid expression: expression must be a non-empty string")]
    InvalidExpression,

    /// The expression text cannot be parsed.
    #[error("Syntax error: {0}")]
    Syntax(SyntaxError),

    /// An identifier missing from the context.
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    /// An order reference missing from the context.
    #[error("Undefined order reference: {0}")]
    UndefinedOrderReference(String),

    /// A result outside the decimal range.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Dependency extraction failed.
    #[error("Failed to get dependencies: {0}")]
    Dependencies(Box<ExprError>),
}

impl From<SyntaxError> for ExprError {
    fn from(error: SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

impl ExprError {
    /// Map onto the shared error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidExpression | Self::Overflow => ErrorKind::InvalidInput,
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::UndefinedVariable(_) | Self::UndefinedOrderReference(_) => {
                ErrorKind::UndefinedReference
            }
            Self::Dependencies(inner) => inner.kind(),
        }
    }
}
