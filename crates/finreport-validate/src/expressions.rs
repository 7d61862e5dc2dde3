//! Expression pass: syntax of every calculated item.

use crate::item_field;
use finreport_core::{LayoutKind, ReportDefinition, ValidationResult};
use finreport_expr::parse;

/// Parse every calculated expression and report syntax errors.
///
/// Missing or blank expressions are left to the structural pass.
#[must_use]
pub fn validate_expressions(report: &ReportDefinition) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (index, item) in report.layout.iter().enumerate() {
        let LayoutKind::Calculated {
            expression: Some(expression),
        } = &item.kind
        else {
            continue;
        };
        if expression.trim().is_empty() {
            continue;
        }
        if let Err(e) = parse(expression) {
            result.error(
                item_field(index, "expression"),
                format!("Invalid expression '{expression}': {e}"),
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::{LayoutItem, StatementType};

    fn report(expressions: &[&str]) -> ReportDefinition {
        expressions.iter().enumerate().fold(
            ReportDefinition::new("r", "R", StatementType::Income),
            |report, (i, e)| report.with_item(LayoutItem::calculated((i as u32 + 1) * 10, *e)),
        )
    }

    #[test]
    fn test_valid_expressions() {
        let result = validate_expressions(&report(&["a + b", "-(@10 * 2) / 3", "--1"]));
        assert!(result.is_valid());
    }

    #[test]
    fn test_reports_each_bad_expression() {
        let result = validate_expressions(&report(&["(a + b", "a +", "a $ b", "a * * b", "ok"]));
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "layout[0].expression",
                "layout[1].expression",
                "layout[2].expression",
                "layout[3].expression",
            ]
        );
        assert_eq!(
            result.errors[2].message,
            "Invalid expression 'a $ b': Invalid character '$' at position 2"
        );
    }

    #[test]
    fn test_blank_expression_left_to_structure() {
        assert!(validate_expressions(&report(&[""])).is_valid());
    }
}
