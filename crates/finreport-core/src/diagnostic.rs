//! Field-tagged validation diagnostics.

use serde::Serialize;
use std::fmt;

/// A single validation message attached to a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Dotted path of the offending field (e.g. `layout[2].expression`).
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Outcome of a validation pass.
///
/// A result is valid iff it carries no errors; warnings never affect validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Errors, in the order they were found.
    pub errors: Vec<Diagnostic>,
    /// Warnings, in the order they were found.
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Create an empty (valid) result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error.
    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(field, message));
    }

    /// Record a warning.
    pub fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(field, message));
    }

    /// Append every error and warning of `other`.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Append `other`, prefixing each field path with `prefix`.
    ///
    /// Used when a nested specification (a filter inside a variable) is
    /// validated on its own and reported from its parent.
    pub fn merge_nested(&mut self, prefix: &str, other: Self) {
        let nest = |d: Diagnostic| {
            let field = if d.field.is_empty() {
                prefix.to_string()
            } else if d.field.starts_with('[') {
                format!("{prefix}{}", d.field)
            } else {
                format!("{prefix}.{}", d.field)
            };
            Diagnostic::new(field, d.message)
        };
        self.errors.extend(other.errors.into_iter().map(nest));
        self.warnings.extend(other.warnings.into_iter().map(nest));
    }

    /// Error messages without field paths.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

impl FromIterator<Self> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        let mut result = Self::new();
        for part in iter {
            result.merge(part);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut result = ValidationResult::new();
        result.warning("layout[0].label", "missing label");
        assert!(result.is_valid());
        result.error("reportId", "required");
        assert!(!result.is_valid());
    }

    #[test]
    fn test_merge_nested_prefixes_fields() {
        let mut inner = ValidationResult::new();
        inner.error("code1", "bad value");
        inner.error("[0]", "null element");
        inner.error("", "must be an object");

        let mut outer = ValidationResult::new();
        outer.merge_nested("variables.revenue.filter", inner);

        let fields: Vec<_> = outer.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "variables.revenue.filter.code1",
                "variables.revenue.filter[0]",
                "variables.revenue.filter",
            ]
        );
    }

    #[test]
    fn test_collect_concatenates_in_order() {
        let mut a = ValidationResult::new();
        a.error("a", "first");
        let mut b = ValidationResult::new();
        b.error("b", "second");
        let all: ValidationResult = vec![a, b].into_iter().collect();
        assert_eq!(all.error_messages(), vec!["first", "second"]);
    }
}
