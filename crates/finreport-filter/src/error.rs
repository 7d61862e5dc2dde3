//! Filter error types.

use finreport_core::{Diagnostic, ErrorKind};
use thiserror::Error;

/// Errors from compiling or applying a filter specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The specification failed validation.
    #[error("Invalid filter specification: {}", join(.0))]
    InvalidFilterSpecification(Vec<Diagnostic>),
}

impl FilterError {
    /// Map onto the shared error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFilterSpecification(_) => ErrorKind::InvalidInput,
        }
    }

    /// The individual validation failures.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::InvalidFilterSpecification(errors) => errors,
        }
    }
}

fn join(errors: &[Diagnostic]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
