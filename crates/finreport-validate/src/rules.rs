//! Business-rule pass: unique orders and well-formed subtotal ranges.

use crate::item_field;
use finreport_core::{LayoutKind, ReportDefinition, ValidationResult};
use std::collections::BTreeMap;

/// Check that layout orders are unique and every subtotal has `from <= to`.
///
/// Every duplicated order is named in a single combined message.
#[must_use]
pub fn validate_business_rules(report: &ReportDefinition) -> ValidationResult {
    let mut result = ValidationResult::new();
    if report.layout.is_empty() {
        return result;
    }

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for item in &report.layout {
        *counts.entry(item.order).or_default() += 1;
    }
    let duplicates: Vec<String> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(order, _)| order.to_string())
        .collect();
    if !duplicates.is_empty() {
        result.error(
            "layout",
            format!("Duplicate order values: {}", duplicates.join(", ")),
        );
    }

    for (index, item) in report.layout.iter().enumerate() {
        if let LayoutKind::Subtotal {
            from: Some(from),
            to: Some(to),
        } = item.kind
        {
            if from > to {
                result.error(
                    item_field(index, "from"),
                    format!("Subtotal range is invalid: from ({from}) must not exceed to ({to})"),
                );
            }
        }
    }

    result
}
