//! Loader and registry errors.

use finreport_core::{Diagnostic, ErrorKind, StatementType};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading reports or movements.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file or directory.
    #[error("failed to read {path}: {error}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        error: std::io::Error,
    },

    /// The file is not a well-formed report definition.
    #[error("failed to parse report definition {path}: {error}")]
    Json {
        /// The offending file.
        path: PathBuf,
        /// The underlying JSON error.
        error: serde_json::Error,
    },

    /// The report definition failed validation.
    #[error("invalid report definition {path}: {}", join(.diagnostics))]
    Invalid {
        /// The offending file.
        path: PathBuf,
        /// Every validation error.
        diagnostics: Vec<Diagnostic>,
    },

    /// The movements CSV could not be read.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A movements amount cell is not a decimal number.
    #[error("invalid amount '{value}' on line {line}")]
    Amount {
        /// 1-based line number, counting the header.
        line: u64,
        /// The cell text.
        value: String,
    },
}

impl LoadError {
    /// Map onto the shared error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

/// Errors from the report registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No report with this id is registered.
    #[error("Report not registered: {0}")]
    UnknownReport(String),

    /// The report exists but renders a different statement.
    #[error("Report '{report_id}' is a {actual} statement, not {expected}")]
    StatementTypeMismatch {
        /// The report selected.
        report_id: String,
        /// The statement type the selection is for.
        expected: StatementType,
        /// The report's own statement type, if any.
        actual: String,
    },

    /// Reading or writing the selection file failed.
    #[error("failed to access selection file {path}: {error}")]
    Io {
        /// The selection file.
        path: PathBuf,
        /// The underlying IO error.
        error: std::io::Error,
    },

    /// The selection file is not valid JSON.
    #[error("invalid selection file {path}: {error}")]
    Json {
        /// The selection file.
        path: PathBuf,
        /// The underlying JSON error.
        error: serde_json::Error,
    },
}

impl RegistryError {
    /// Map onto the shared error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownReport(_) => ErrorKind::UndefinedReference,
            Self::StatementTypeMismatch { .. } | Self::Io { .. } | Self::Json { .. } => {
                ErrorKind::InvalidInput
            }
        }
    }
}

fn join(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
