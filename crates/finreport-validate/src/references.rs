//! Reference pass: variables and `@order` references resolve.
//!
//! Expressions are scanned with the evaluator's own tokenizer, so the names
//! reported here are exactly the names the evaluator would look up.

use crate::item_field;
use finreport_core::{LayoutKind, ReportDefinition, ValidationResult};
use finreport_expr::{tokenize, Token};
use std::collections::BTreeSet;

/// Unique `@N` references in `expression`, in first-appearance order.
///
/// Tokens that cannot be lexed are skipped; syntax is the expression pass's concern.
///
/// ```
/// use finreport_validate::extract_order_references;
///
/// assert_eq!(extract_order_references("@10 + @20 - @10"), vec![10, 20]);
/// ```
/// References past `u32::MAX` are left out; [`validate_references`] reports them.
#[must_use]
pub fn extract_order_references(expression: &str) -> Vec<u32> {
    let mut refs = Vec::new();
    for order in order_reference_tokens(expression)
        .into_iter()
        .filter_map(parse_order_reference)
    {
        if !refs.contains(&order) {
            refs.push(order);
        }
    }
    refs
}

/// Unique `@N` tokens in `expression`, as written.
fn order_reference_tokens(expression: &str) -> Vec<&str> {
    let mut refs: Vec<&str> = Vec::new();
    for (token, _) in tokenize(expression) {
        if let Token::OrderRef(text) = token {
            if !refs.contains(&text) {
                refs.push(text);
            }
        }
    }
    refs
}

fn parse_order_reference(text: &str) -> Option<u32> {
    text.strip_prefix('@')?.parse().ok()
}

/// Unique identifiers in `expression`, in first-appearance order.
#[must_use]
pub fn extract_variable_references(expression: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (token, _) in tokenize(expression) {
        if let Token::Ident(name) = token {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Check that every referenced variable and order exists.
///
/// Errors:
/// - a variable item naming an undeclared variable
/// - an identifier in a calculated expression that is not a declared variable
/// - an `@N` reference or subtotal bound naming an order absent from the layout
///
/// Warnings:
/// - an `@N` reference to a row at or after the referencing row
/// - a declared variable nothing references
#[must_use]
pub fn validate_references(report: &ReportDefinition) -> ValidationResult {
    let mut result = ValidationResult::new();
    if report.layout.is_empty() {
        return result;
    }

    let orders: BTreeSet<u32> = report.layout.iter().map(|item| item.order).collect();
    let mut used: BTreeSet<String> = BTreeSet::new();

    for (index, item) in report.layout.iter().enumerate() {
        match &item.kind {
            LayoutKind::Variable {
                variable: Some(name),
            } if !name.is_empty() => {
                if !report.variables.contains_key(name) {
                    result.error(
                        item_field(index, "variable"),
                        format!("Undefined variable: {name}"),
                    );
                }
                used.insert(name.clone());
            }
            LayoutKind::Calculated {
                expression: Some(expression),
            } => {
                let field = item_field(index, "expression");
                for name in extract_variable_references(expression) {
                    if !report.variables.contains_key(&name) {
                        result.error(&field, format!("Undefined variable: {name}"));
                    }
                    used.insert(name);
                }
                let mut seen = BTreeSet::new();
                for text in order_reference_tokens(expression) {
                    match parse_order_reference(text) {
                        None => {
                            result.error(&field, format!("Undefined order reference: {text}"));
                        }
                        Some(order) if !seen.insert(order) => {}
                        Some(order) if !orders.contains(&order) => {
                            result.error(&field, format!("Undefined order reference: @{order}"));
                        }
                        Some(order) if order >= item.order => {
                            result.warning(
                                &field,
                                format!(
                                    "Order reference @{order} is not rendered before row {}",
                                    item.order
                                ),
                            );
                        }
                        Some(_) => {}
                    }
                }
            }
            LayoutKind::Subtotal { from, to } => {
                for (name, bound) in [("from", from), ("to", to)] {
                    if let Some(order) = bound {
                        if !orders.contains(order) {
                            result.error(
                                item_field(index, name),
                                format!("Subtotal {name} references unknown order {order}"),
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for name in report.variables.keys() {
        if !used.contains(name) {
            result.warning(
                format!("variables.{name}"),
                format!("Variable '{name}' is never referenced"),
            );
        }
    }

    result
}
