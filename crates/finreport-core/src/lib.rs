//! Core types for finreport
//!
//! This crate provides the fundamental types shared by every finreport crate:
//!
//! - [`ReportDefinition`] - A versioned, declarative financial statement definition
//! - [`VariableDefinition`] - A named filter + aggregate over the movements table
//! - [`LayoutItem`] / [`LayoutKind`] - One row specification, keyed by a unique order
//! - [`Movement`] / [`MovementTable`] - The ledger rows statements are rendered from
//! - [`PeriodOptions`] - Which fiscal years (and periods) to render
//! - [`RenderedRow`] / [`RenderedStatement`] - Renderer output
//! - [`ValidationResult`] - Field-tagged errors and warnings
//! - [`ErrorKind`] - The error taxonomy every crate maps its errors onto
//!
//! # Example
//!
//! ```
//! use finreport_core::{FilterField, Movement, MovementTable};
//! use rust_decimal_macros::dec;
//!
//! let table: MovementTable = vec![
//!     Movement::new(2024, dec!(100)).with(FilterField::Code1, "700"),
//!     Movement::new(2024, dec!(50)).with(FilterField::Code1, "710"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let revenue = table.filter(|m| m.field(FilterField::Code1) == Some("700"));
//! assert_eq!(revenue.len(), 1);
//! assert_eq!(table.years().into_iter().collect::<Vec<_>>(), vec![2024]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod definition;
pub mod diagnostic;
pub mod error;
pub mod movement;
pub mod period;
pub mod row;

pub use definition::{
    AggregateFunction, CurrencyFormat, DecimalFormat, FilterSpec, Formatting, IntegerFormat,
    LayoutItem, LayoutKind, LayoutType, NumberFormat, PercentFormat, ReportDefinition, RowStyle,
    StatementType, VariableDefinition,
};
pub use diagnostic::{Diagnostic, ValidationResult};
pub use error::ErrorKind;
pub use movement::{FilterField, Movement, MovementTable};
pub use period::PeriodOptions;
pub use row::{RenderedRow, RenderedStatement, RowMetadata, YearValues};

// Re-export commonly used external types
pub use rust_decimal::Decimal;
