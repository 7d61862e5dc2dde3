//! Filter engine for finreport.
//!
//! A filter specification maps field names to an exact value, an array of
//! values (OR), or a range object with `gte`/`lte`/`gt`/`lt` bounds (AND).
//! Conditions on different fields are combined with AND.
//!
//! - [`validate_filter`] checks a specification statically.
//! - [`Filter::compile`] turns a valid specification into a row predicate.
//! - [`build_filter_expression`] renders the predicate as readable source.
//! - [`apply_filter`] filters a movements table.
//!
//! # Example
//!
//! ```
//! use finreport_core::{definition::filter_spec, FilterField, Movement, MovementTable};
//! use finreport_filter::apply_filter;
//! use rust_decimal_macros::dec;
//! use serde_json::json;
//!
//! let table: MovementTable = vec![
//!     Movement::new(2024, dec!(100)).with(FilterField::Code1, "700"),
//!     Movement::new(2024, dec!(50)).with(FilterField::Code1, "710"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let revenue = apply_filter(&table, &filter_spec([("code1", json!("700"))])).unwrap();
//! assert_eq!(revenue.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod filter;
mod validate;

pub use error::FilterError;
pub use filter::{Condition, Filter, RangeOp, Scalar};
pub use validate::{validate_filter, RANGE_OPERATORS};

use finreport_core::{FilterSpec, MovementTable};
use tracing::trace;

/// Render a specification as predicate source.
///
/// ```
/// use finreport_core::definition::filter_spec;
/// use finreport_filter::build_filter_expression;
/// use serde_json::json;
///
/// let spec = filter_spec([
///     ("code1", json!("700")),
///     ("name1", json!(["a", "b"])),
/// ]);
/// assert_eq!(
///     build_filter_expression(&spec).unwrap(),
///     "code1 == '700' && (name1 == 'a' || name1 == 'b')"
/// );
/// ```
pub fn build_filter_expression(spec: &FilterSpec) -> Result<String, FilterError> {
    let filter = Filter::compile(spec)?;
    if filter.is_empty() {
        return Ok("true".to_string());
    }

    let parts: Vec<String> = filter
        .clauses()
        .iter()
        .map(|(field, condition)| match condition {
            Condition::Exact(value) => format!("{field} == {value}"),
            Condition::AnyOf(values) => {
                let alternatives: Vec<String> =
                    values.iter().map(|v| format!("{field} == {v}")).collect();
                format!("({})", alternatives.join(" || "))
            }
            Condition::Range(bounds) => {
                let checks: Vec<String> = bounds
                    .iter()
                    .map(|(op, bound)| format!("{field} {} {bound}", op.symbol()))
                    .collect();
                format!("({})", checks.join(" && "))
            }
        })
        .collect();

    Ok(parts.join(" && "))
}

/// Rows of `table` matching `spec`, in table order.
///
/// An empty specification returns every row. The input table is never modified.
pub fn apply_filter(table: &MovementTable, spec: &FilterSpec) -> Result<MovementTable, FilterError> {
    if spec.is_empty() {
        return Ok(table.clone());
    }

    let filter = Filter::compile(spec)?;
    let filtered = table.filter(|m| filter.matches(m));
    trace!(rows_in = table.len(), rows_out = filtered.len(), "applied filter");
    Ok(filtered)
}
