//! Resolver and renderer error types.

use finreport_core::{ErrorKind, LayoutType};
use finreport_expr::ExprError;
use finreport_filter::FilterError;
use thiserror::Error;

/// Errors from resolving variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The variable's filter is invalid.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The aggregate name is not one of the supported functions.
    #[error("Unsupported aggregate function: {0}")]
    UnsupportedAggregateFunction(String),

    /// A variable was re-entered while it was being resolved.
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency {
        /// Names from the first occurrence of the repeated name to its re-entry.
        chain: Vec<String>,
    },

    /// An aggregate outside the decimal range.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Resolution of a named variable failed.
    #[error("Failed to resolve variable '{name}': {inner}")]
    Variable {
        /// Variable name.
        name: String,
        /// Underlying failure.
        inner: Box<ResolveError>,
    },
}

impl ResolveError {
    /// Map onto the shared error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Filter(e) => e.kind(),
            Self::UnsupportedAggregateFunction(_) => ErrorKind::UnsupportedOperation,
            Self::CircularDependency { .. } => ErrorKind::CircularDependency,
            Self::Overflow => ErrorKind::InvalidInput,
            Self::Variable { inner, .. } => inner.kind(),
        }
    }
}

/// Errors from rendering a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A required top-level field of the report definition is missing.
    #[error("Report definition must have {0}")]
    MissingReportField(&'static str),

    /// No years to render.
    #[error("Period options must include at least one year")]
    NoYears,

    /// A layout item lacks its type-specific field.
    #[error("{} layout item must have {requirement}", .layout_type.title())]
    MissingField {
        /// Item type.
        layout_type: LayoutType,
        /// What is missing, e.g. `an expression`.
        requirement: &'static str,
    },

    /// Two layout items share an order.
    #[error("Duplicate layout order: {0}")]
    DuplicateOrder(u32),

    /// A variable item names an undeclared variable.
    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    /// Expression evaluation failed.
    #[error("Failed to evaluate expression: {inner}")]
    Expression {
        /// Expression source.
        expression: String,
        /// Underlying failure.
        inner: ExprError,
    },

    /// A subtotal range with `from > to`.
    #[error("Invalid subtotal range: from ({from}) must not exceed to ({to})")]
    InvalidSubtotalRange {
        /// Range start.
        from: u32,
        /// Range end.
        to: u32,
    },

    /// A total outside the decimal range.
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// A category filter is invalid.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Variable resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Rendering one layout item failed.
    #[error("Layout item {order} ({layout_type}): {inner}")]
    Item {
        /// Order of the failing item.
        order: u32,
        /// Type of the failing item.
        layout_type: LayoutType,
        /// Underlying failure.
        inner: Box<RenderError>,
    },
}

impl RenderError {
    /// Map onto the shared error taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingReportField(_)
            | Self::NoYears
            | Self::MissingField { .. }
            | Self::Overflow(_) => ErrorKind::InvalidInput,
            Self::DuplicateOrder(_) | Self::InvalidSubtotalRange { .. } => {
                ErrorKind::RangeViolation
            }
            Self::VariableNotFound(_) => ErrorKind::UndefinedReference,
            Self::Expression { inner, .. } => inner.kind(),
            Self::Filter(e) => e.kind(),
            Self::Resolve(e) => e.kind(),
            Self::Item { inner, .. } => inner.kind(),
        }
    }

    /// The innermost error, skipping layout item wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Item { inner, .. } => inner.root(),
            other => other,
        }
    }
}
