//! Static validation of report definitions.
//!
//! A report definition is checked without touching any movements data.
//! Validation runs four independent passes, each returning a
//! [`ValidationResult`]:
//!
//! | Pass | Checks |
//! |------|--------|
//! | [`validate_structure`] | Required fields, identifier patterns, per-item required fields, indent, variable definitions, formatting ranges |
//! | [`validate_business_rules`] | Unique layout orders, subtotal `from <= to` |
//! | [`validate_expressions`] | Syntax of every calculated expression |
//! | [`validate_references`] | Variables and `@order` references resolve |
//!
//! [`validate`] concatenates all four. Validation never fails: every problem
//! is reported as a field-tagged diagnostic so an author sees them all at once.
//!
//! # Example
//!
//! ```
//! use finreport_core::{LayoutItem, ReportDefinition, StatementType};
//! use finreport_validate::validate;
//!
//! let report = ReportDefinition::new("income", "Income", StatementType::Income)
//!     .with_item(LayoutItem::calculated(10, "revenue * 2").with_label("Doubled"));
//!
//! let result = validate(&report);
//! assert!(!result.is_valid());
//! assert_eq!(result.errors[0].field, "layout[0].expression");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod expressions;
mod references;
mod rules;
mod structure;

pub use expressions::validate_expressions;
pub use references::{extract_order_references, extract_variable_references, validate_references};
pub use rules::validate_business_rules;
pub use structure::{validate_structure, MAX_DECIMALS, MAX_INDENT};

use finreport_core::{ReportDefinition, ValidationResult};
use tracing::debug;

/// Run every validation pass and concatenate their diagnostics.
#[must_use]
pub fn validate(report: &ReportDefinition) -> ValidationResult {
    let result: ValidationResult = [
        validate_structure(report),
        validate_business_rules(report),
        validate_expressions(report),
        validate_references(report),
    ]
    .into_iter()
    .collect();

    debug!(
        report_id = %report.report_id,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated report definition"
    );
    result
}

/// Field path of a layout item attribute: `layout[2].expression`.
pub(crate) fn item_field(index: usize, name: &str) -> String {
    format!("layout[{index}].{name}")
}
