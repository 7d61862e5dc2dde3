//! Renderer output: rows and statements.

use crate::definition::{FilterSpec, LayoutType, NumberFormat, RowStyle, StatementType};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Resolved amounts keyed by fiscal year.
pub type YearValues = BTreeMap<i32, Decimal>;

/// Provenance of a rendered row, kept for debugging and re-validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RowMetadata {
    /// Value of a named variable.
    Variable {
        /// Variable name.
        variable: String,
    },
    /// Result of an expression.
    Calculated {
        /// Expression source.
        expression: String,
        /// Variables and order references the expression reads.
        dependencies: Vec<String>,
    },
    /// Sum of an inline filter.
    Category {
        /// The filter applied.
        filter: FilterSpec,
    },
    /// Sum over an order range.
    Subtotal {
        /// First order (inclusive).
        from: u32,
        /// Last order (inclusive).
        to: u32,
        /// Orders that contributed to the sum.
        included: Vec<u32>,
    },
    /// Visual break.
    Spacer,
}

/// One rendered line of a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    /// Order of the layout item this row came from.
    pub order: u32,
    /// Layout item type.
    pub row_type: LayoutType,
    /// Label (empty for spacers).
    pub label: String,
    /// Amount per rendered year; `None` is a blank cell.
    pub amounts: BTreeMap<i32, Option<Decimal>>,
    /// Indentation level.
    pub indent: u8,
    /// Visual style.
    pub style: RowStyle,
    /// Display format, if the layout item set one.
    pub format: Option<NumberFormat>,
    /// Later minus earlier amount, when two years are rendered.
    pub variance_amount: Option<Decimal>,
    /// Relative change in percent, when two years are rendered.
    pub variance_percent: Option<Decimal>,
    /// Provenance.
    pub metadata: RowMetadata,
}

impl RenderedRow {
    /// Amount for `year`, `None` if blank or not rendered.
    #[must_use]
    pub fn amount(&self, year: i32) -> Option<Decimal> {
        self.amounts.get(&year).copied().flatten()
    }

    /// Amount for `year`, with blanks read as zero.
    #[must_use]
    pub fn amount_or_zero(&self, year: i32) -> Decimal {
        self.amount(year).unwrap_or(Decimal::ZERO)
    }

    /// Whether this row is a visual break.
    #[must_use]
    pub const fn is_spacer(&self) -> bool {
        matches!(self.row_type, LayoutType::Spacer)
    }
}

/// Amounts are written as JSON numbers.
fn json_number(amount: Option<Decimal>) -> Option<f64> {
    amount.and_then(|a| a.to_f64())
}

impl Serialize for RenderedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("order", &self.order)?;
        map.serialize_entry("type", &self.row_type)?;
        map.serialize_entry("label", &self.label)?;
        for (year, amount) in &self.amounts {
            map.serialize_entry(&format!("amount_{year}"), &json_number(*amount))?;
        }
        map.serialize_entry("indent", &self.indent)?;
        map.serialize_entry("style", &self.style)?;
        if let Some(format) = &self.format {
            map.serialize_entry("format", format)?;
        }
        if let Some(amount) = json_number(self.variance_amount) {
            map.serialize_entry("variance_amount", &amount)?;
        }
        if let Some(percent) = json_number(self.variance_percent) {
            map.serialize_entry("variance_percent", &percent)?;
        }
        map.serialize_entry("_metadata", &self.metadata)?;
        map.end()
    }
}

/// A fully rendered statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedStatement {
    /// Identifier of the report definition.
    pub report_id: String,
    /// Display name of the report definition.
    pub name: String,
    /// Statement kind.
    pub statement_type: StatementType,
    /// Rendered years, ascending.
    pub years: Vec<i32>,
    /// Rows, ascending by order.
    pub rows: Vec<RenderedRow>,
}

impl RenderedStatement {
    /// Row rendered for the layout item with `order`.
    #[must_use]
    pub fn row(&self, order: u32) -> Option<&RenderedRow> {
        self.rows.iter().find(|r| r.order == order)
    }
}
