//! Statement rendering for finreport.
//!
//! - [`VariableResolver`] turns variable definitions into per-year values.
//! - [`ReportRenderer`] produces an ordered list of rows from a report
//!   definition, a movements table and period options.
//! - [`apply_formatting`] turns a cell value into display text.
//!
//! # Example
//!
//! ```
//! use finreport_core::definition::filter_spec;
//! use finreport_core::{
//!     FilterField, LayoutItem, Movement, MovementTable, PeriodOptions, ReportDefinition,
//!     StatementType, VariableDefinition,
//! };
//! use finreport_render::ReportRenderer;
//! use rust_decimal_macros::dec;
//! use serde_json::json;
//!
//! let report = ReportDefinition::new("income", "Income", StatementType::Income)
//!     .with_variable("revenue", VariableDefinition::sum(filter_spec([("code1", json!("700"))])))
//!     .with_item(LayoutItem::variable(10, "revenue").with_label("Revenue"))
//!     .with_item(LayoutItem::calculated(20, "@10 * 2").with_label("Doubled"));
//!
//! let table: MovementTable = vec![Movement::new(2024, dec!(150)).with(FilterField::Code1, "700")]
//!     .into_iter()
//!     .collect();
//!
//! let statement = ReportRenderer::new()
//!     .render_statement(&report, &table, &PeriodOptions::new([2024]))
//!     .unwrap();
//! assert_eq!(statement.row(20).unwrap().amount(2024), Some(dec!(300)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod format;
pub mod renderer;
pub mod resolver;

pub use error::{RenderError, ResolveError};
pub use format::{apply_formatting, format_cell, format_number};
pub use renderer::{
    calculate_subtotal, calculate_variances, subtotal_members, RenderContext, ReportRenderer,
};
pub use resolver::{validate_variable, ResolutionGuard, VariableResolver};
