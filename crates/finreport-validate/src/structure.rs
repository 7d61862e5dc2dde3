//! Structural pass: required fields, patterns and value ranges.

use crate::item_field;
use finreport_core::{Formatting, LayoutItem, LayoutKind, ReportDefinition, ValidationResult};
use finreport_filter::validate_filter;
use finreport_render::validate_variable;
use regex::Regex;
use std::sync::LazyLock;

/// Largest allowed layout indent.
pub const MAX_INDENT: u8 = 3;

/// Largest allowed number of decimals in a formatting block.
pub const MAX_DECIMALS: u8 = 4;

static REPORT_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").ok());
static VERSION: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").ok());

fn is_match(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// Check required fields, identifier patterns, layout items, variables and formatting.
///
/// Also warns on non-spacer layout items without a label.
#[must_use]
pub fn validate_structure(report: &ReportDefinition) -> ValidationResult {
    let mut result = ValidationResult::new();

    if report.report_id.is_empty() {
        result.error("reportId", "Report ID is required");
    } else if !is_match(&REPORT_ID, &report.report_id) {
        result.error(
            "reportId",
            format!(
                "Report ID '{}' must contain only lowercase letters, digits, '_' and '-'",
                report.report_id
            ),
        );
    }

    if report.name.trim().is_empty() {
        result.error("name", "Report name is required");
    }

    if report.version.is_empty() {
        result.error("version", "Version is required");
    } else if !is_match(&VERSION, &report.version) {
        result.error(
            "version",
            format!(
                "Version '{}' must be a semantic version (MAJOR.MINOR.PATCH)",
                report.version
            ),
        );
    }

    if report.statement_type.is_none() {
        result.error("statementType", "Statement type is required");
    }

    if report.layout.is_empty() {
        result.error("layout", "Layout must contain at least one item");
    }
    for (index, item) in report.layout.iter().enumerate() {
        validate_item(index, item, &mut result);
    }

    for (name, variable) in &report.variables {
        if name.is_empty() {
            result.error("variables", "Variable name must not be empty");
        }
        result.merge_nested(&format!("variables.{name}"), validate_variable(variable));
    }

    if let Some(formatting) = &report.formatting {
        validate_formatting(formatting, &mut result);
    }

    result
}

fn validate_item(index: usize, item: &LayoutItem, result: &mut ValidationResult) {
    let layout_type = item.layout_type();
    let required = |field: &str, requirement: &str| {
        (
            item_field(index, field),
            format!("{} layout item must have {requirement}", layout_type.title()),
        )
    };

    let missing = match &item.kind {
        LayoutKind::Variable { variable } => variable
            .as_deref()
            .map_or(true, str::is_empty)
            .then(|| required("variable", "a variable name")),
        LayoutKind::Calculated { expression } => expression
            .as_deref()
            .map_or(true, |e| e.trim().is_empty())
            .then(|| required("expression", "an expression")),
        LayoutKind::Category { filter } => match filter {
            None => Some(required("filter", "a filter")),
            Some(filter) => {
                result.merge_nested(&item_field(index, "filter"), validate_filter(filter));
                None
            }
        },
        LayoutKind::Subtotal { from, to } => match (from, to) {
            (None, _) => Some(required("from", "from and to")),
            (_, None) => Some(required("to", "from and to")),
            _ => None,
        },
        LayoutKind::Spacer => None,
    };
    if let Some((field, message)) = missing {
        result.error(field, message);
    }

    if let Some(indent) = item.indent {
        if indent > MAX_INDENT {
            result.error(
                item_field(index, "indent"),
                format!("Indent must be between 0 and {MAX_INDENT}, got {indent}"),
            );
        }
    }

    let unlabeled = item.label.as_deref().map_or(true, |l| l.trim().is_empty());
    if unlabeled && !matches!(item.kind, LayoutKind::Spacer) {
        result.warning(
            item_field(index, "label"),
            format!("Layout item {} has no label", item.order),
        );
    }
}

fn validate_formatting(formatting: &Formatting, result: &mut ValidationResult) {
    let blocks = [
        ("formatting.currency.decimals", formatting.currency.decimals),
        ("formatting.percent.decimals", formatting.percent.decimals),
        ("formatting.decimal.decimals", formatting.decimal.decimals),
    ];
    for (field, decimals) in blocks {
        if decimals > MAX_DECIMALS {
            result.error(
                field,
                format!("Decimals must be between 0 and {MAX_DECIMALS}, got {decimals}"),
            );
        }
    }
}
