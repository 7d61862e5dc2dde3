//! Report definition types.
//!
//! A [`ReportDefinition`] is the declarative description of a financial
//! statement: named variables (a filter plus an aggregate over the movements
//! table), an ordered layout of rows, and optional formatting defaults.
//!
//! Definitions are read from JSON (camelCase keys). Closed enumerations
//! (`statementType`, layout `type`, `format`, `style`) are enforced when
//! deserializing; everything else (patterns, ranges, required type-specific
//! fields, cross-references) is checked by the validator so that authors get
//! every problem reported at once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A filter specification: field name to exact value, array of values, or
/// range object.
///
/// Values are kept as raw JSON so that invalid specifications (nulls, empty
/// arrays, unknown range operators) can be reported instead of rejected by the
/// deserializer.
pub type FilterSpec = BTreeMap<String, serde_json::Value>;

/// The kind of financial statement a report renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    /// Balance sheet.
    Balance,
    /// Income statement.
    Income,
    /// Cash flow statement.
    Cashflow,
}

impl StatementType {
    /// All statement types.
    pub const ALL: [Self; 3] = [Self::Balance, Self::Income, Self::Cashflow];

    /// The lowercase name used in report definitions.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Income => "income",
            Self::Cashflow => "cashflow",
        }
    }
}

impl FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balance" => Ok(Self::Balance),
            "income" => Ok(Self::Income),
            "cashflow" => Ok(Self::Cashflow),
            _ => Err(format!("unknown statement type: {s}")),
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate applied to the rows a variable's filter selects, per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    /// Sum of amounts.
    Sum,
    /// Arithmetic mean of amounts.
    Average,
    /// Number of rows.
    Count,
    /// Smallest amount.
    Min,
    /// Largest amount.
    Max,
    /// Amount of the first row in table order.
    First,
    /// Amount of the last row in table order.
    Last,
}

impl AggregateFunction {
    /// All supported aggregates.
    pub const ALL: [Self; 7] = [
        Self::Sum,
        Self::Average,
        Self::Count,
        Self::Min,
        Self::Max,
        Self::First,
        Self::Last,
    ];

    /// The lowercase name used in report definitions.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "average" => Ok(Self::Average),
            "count" => Ok(Self::Count),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            _ => Err(format!("unsupported aggregate function: {s}")),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named variable: rows selected by `filter`, reduced by `aggregate`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Row selection.
    #[serde(default)]
    pub filter: FilterSpec,
    /// Aggregate name (case-insensitive, see [`AggregateFunction`]).
    #[serde(default)]
    pub aggregate: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableDefinition {
    /// Create a new variable definition.
    #[must_use]
    pub fn new(filter: FilterSpec, aggregate: impl Into<String>) -> Self {
        Self {
            filter,
            aggregate: aggregate.into(),
            description: None,
        }
    }

    /// Create a summing variable.
    #[must_use]
    pub fn sum(filter: FilterSpec) -> Self {
        Self::new(filter, "sum")
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse the aggregate name.
    pub fn aggregate_function(&self) -> Result<AggregateFunction, String> {
        self.aggregate.parse()
    }
}

/// Display format of a row's amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Optional symbol, optional thousands grouping, fixed decimals.
    Currency,
    /// Fixed decimals with a `%` suffix.
    Percent,
    /// Rounded to a whole number.
    Integer,
    /// Fixed decimals.
    Decimal,
}

/// Visual style of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStyle {
    /// Regular line.
    #[default]
    Normal,
    /// Ratio or KPI line.
    Metric,
    /// Intermediate total.
    Subtotal,
    /// Grand total.
    Total,
    /// Visual break.
    Spacer,
}

/// Discriminant of a [`LayoutKind`], used on rendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// Value of a named variable.
    Variable,
    /// Arithmetic expression over variables and earlier rows.
    Calculated,
    /// Sum of an inline filter.
    Category,
    /// Sum of earlier rows in an order range.
    Subtotal,
    /// Empty visual break.
    Spacer,
}

impl LayoutType {
    /// The lowercase name used in report definitions.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Calculated => "calculated",
            Self::Category => "category",
            Self::Subtotal => "subtotal",
            Self::Spacer => "spacer",
        }
    }

    /// Capitalized name for messages ("Calculated layout item must have ...").
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Variable => "Variable",
            Self::Calculated => "Calculated",
            Self::Category => "Category",
            Self::Subtotal => "Subtotal",
            Self::Spacer => "Spacer",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific part of a layout item, tagged by `type` in JSON.
///
/// Required fields are optional here so a missing field surfaces as a
/// renderer or validator message rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutKind {
    /// Value of a named variable.
    Variable {
        /// Variable name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable: Option<String>,
    },
    /// Arithmetic expression.
    Calculated {
        /// Expression source.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<String>,
    },
    /// Sum of movements matching an inline filter.
    Category {
        /// Row selection.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<FilterSpec>,
    },
    /// Sum of earlier rows whose order lies in `[from, to]`.
    Subtotal {
        /// First order of the range (inclusive).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<u32>,
        /// Last order of the range (inclusive).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<u32>,
    },
    /// Empty row.
    Spacer,
}

impl LayoutKind {
    /// The discriminant.
    #[must_use]
    pub const fn layout_type(&self) -> LayoutType {
        match self {
            Self::Variable { .. } => LayoutType::Variable,
            Self::Calculated { .. } => LayoutType::Calculated,
            Self::Category { .. } => LayoutType::Category,
            Self::Subtotal { .. } => LayoutType::Subtotal,
            Self::Spacer => LayoutType::Spacer,
        }
    }
}

/// One row specification in a report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    /// Position in the rendered statement; unique within a layout.
    pub order: u32,
    /// Type and type-specific fields.
    #[serde(flatten)]
    pub kind: LayoutKind,
    /// Row label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Display format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<NumberFormat>,
    /// Visual style (defaults to normal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<RowStyle>,
    /// Indentation level 0-3 (defaults to 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<u8>,
}

impl LayoutItem {
    /// Create a layout item with no display attributes.
    #[must_use]
    pub const fn new(order: u32, kind: LayoutKind) -> Self {
        Self {
            order,
            kind,
            label: None,
            format: None,
            style: None,
            indent: None,
        }
    }

    /// A row showing a named variable.
    #[must_use]
    pub fn variable(order: u32, variable: impl Into<String>) -> Self {
        Self::new(
            order,
            LayoutKind::Variable {
                variable: Some(variable.into()),
            },
        )
    }

    /// A row computed from an expression.
    #[must_use]
    pub fn calculated(order: u32, expression: impl Into<String>) -> Self {
        Self::new(
            order,
            LayoutKind::Calculated {
                expression: Some(expression.into()),
            },
        )
    }

    /// A row summing an inline filter.
    #[must_use]
    pub const fn category(order: u32, filter: FilterSpec) -> Self {
        Self::new(
            order,
            LayoutKind::Category {
                filter: Some(filter),
            },
        )
    }

    /// A subtotal over `[from, to]`.
    #[must_use]
    pub const fn subtotal(order: u32, from: u32, to: u32) -> Self {
        Self::new(
            order,
            LayoutKind::Subtotal {
                from: Some(from),
                to: Some(to),
            },
        )
    }

    /// An empty row.
    #[must_use]
    pub const fn spacer(order: u32) -> Self {
        Self::new(order, LayoutKind::Spacer)
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the display format.
    #[must_use]
    pub const fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the style.
    #[must_use]
    pub const fn with_style(mut self, style: RowStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Set the indentation level.
    #[must_use]
    pub const fn with_indent(mut self, indent: u8) -> Self {
        self.indent = Some(indent);
        self
    }

    /// The discriminant of this item.
    #[must_use]
    pub const fn layout_type(&self) -> LayoutType {
        self.kind.layout_type()
    }
}

/// Currency formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// Decimal places (0-4).
    pub decimals: u8,
    /// Group thousands with `,`.
    pub thousands: bool,
    /// Prefix symbol, separated from the number by a space.
    pub symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            decimals: 0,
            thousands: true,
            symbol: String::new(),
        }
    }
}

/// Percent formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentFormat {
    /// Decimal places (0-4).
    pub decimals: u8,
}

impl Default for PercentFormat {
    fn default() -> Self {
        Self { decimals: 1 }
    }
}

/// Integer formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegerFormat {
    /// Group thousands with `,`.
    pub thousands: bool,
}

impl Default for IntegerFormat {
    fn default() -> Self {
        Self { thousands: true }
    }
}

/// Decimal formatting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimalFormat {
    /// Decimal places (0-4).
    pub decimals: u8,
    /// Group thousands with `,`.
    pub thousands: bool,
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            thousands: true,
        }
    }
}

/// Report-level formatting defaults, one block per [`NumberFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Formatting {
    /// Currency defaults.
    pub currency: CurrencyFormat,
    /// Percent defaults.
    pub percent: PercentFormat,
    /// Integer defaults.
    pub integer: IntegerFormat,
    /// Decimal defaults.
    pub decimal: DecimalFormat,
}

/// A complete, versioned report definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    /// Unique identifier matching `^[a-z0-9_-]+$`.
    #[serde(default)]
    pub report_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Semantic version `MAJOR.MINOR.PATCH`.
    #[serde(default)]
    pub version: String,
    /// Statement kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_type: Option<StatementType>,
    /// Named variables.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDefinition>,
    /// Row specifications.
    #[serde(default)]
    pub layout: Vec<LayoutItem>,
    /// Formatting defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Formatting>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ReportDefinition {
    /// Create a definition with the required identity fields and version `1.0.0`.
    #[must_use]
    pub fn new(
        report_id: impl Into<String>,
        name: impl Into<String>,
        statement_type: StatementType,
    ) -> Self {
        Self {
            report_id: report_id.into(),
            name: name.into(),
            version: "1.0.0".to_string(),
            statement_type: Some(statement_type),
            ..Self::default()
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, variable: VariableDefinition) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }

    /// Append a layout item.
    #[must_use]
    pub fn with_item(mut self, item: LayoutItem) -> Self {
        self.layout.push(item);
        self
    }

    /// Set the formatting defaults.
    #[must_use]
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = Some(formatting);
        self
    }

    /// The formatting defaults, or the built-in defaults when absent.
    #[must_use]
    pub fn formatting_or_default(&self) -> Formatting {
        self.formatting.clone().unwrap_or_default()
    }

    /// Parse a definition from JSON text.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

/// Build a [`FilterSpec`] from `(field, value)` pairs.
///
/// ```
/// use finreport_core::definition::filter_spec;
/// use serde_json::json;
///
/// let spec = filter_spec([("code1", json!("700")), ("code2", json!(["10", "20"]))]);
/// assert_eq!(spec.len(), 2);
/// ```
pub fn filter_spec<K, I>(entries: I) -> FilterSpec
where
    K: Into<String>,
    I: IntoIterator<Item = (K, serde_json::Value)>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aggregate_parse_is_case_insensitive() {
        assert_eq!("SUM".parse::<AggregateFunction>(), Ok(AggregateFunction::Sum));
        assert_eq!(
            "Average".parse::<AggregateFunction>(),
            Ok(AggregateFunction::Average)
        );
        assert!("median".parse::<AggregateFunction>().is_err());
    }

    #[test]
    fn test_layout_item_deserializes_tagged_kind() {
        let item: LayoutItem = serde_json::from_value(json!({
            "order": 30,
            "type": "calculated",
            "expression": "@10 - @20",
            "label": "Gross profit",
            "style": "subtotal",
            "indent": 1
        }))
        .unwrap();

        assert_eq!(item.order, 30);
        assert_eq!(
            item.kind,
            LayoutKind::Calculated {
                expression: Some("@10 - @20".to_string())
            }
        );
        assert_eq!(item.label.as_deref(), Some("Gross profit"));
        assert_eq!(item.style, Some(RowStyle::Subtotal));
        assert_eq!(item.indent, Some(1));
    }

    #[test]
    fn test_missing_type_specific_field_still_deserializes() {
        let item: LayoutItem =
            serde_json::from_value(json!({"order": 10, "type": "variable"})).unwrap();
        assert_eq!(item.kind, LayoutKind::Variable { variable: None });
    }

    #[test]
    fn test_unknown_layout_type_is_rejected() {
        let result = serde_json::from_value::<LayoutItem>(json!({"order": 10, "type": "chart"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_spacer_roundtrips_through_json() {
        let item = LayoutItem::spacer(40);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, json!({"order": 40, "type": "spacer"}));
        let back: LayoutItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_report_definition_from_json() {
        let def = ReportDefinition::from_json(
            r#"{
                "reportId": "income_simple",
                "name": "Income",
                "version": "1.2.0",
                "statementType": "income",
                "variables": {
                    "revenue": {"filter": {"code1": "700"}, "aggregate": "sum"}
                },
                "layout": [
                    {"order": 10, "type": "variable", "variable": "revenue", "label": "Revenue"}
                ],
                "formatting": {"currency": {"symbol": "€"}}
            }"#,
        )
        .unwrap();

        assert_eq!(def.report_id, "income_simple");
        assert_eq!(def.statement_type, Some(StatementType::Income));
        assert_eq!(def.variables["revenue"].filter["code1"], json!("700"));
        let formatting = def.formatting_or_default();
        assert_eq!(formatting.currency.symbol, "€");
        assert_eq!(formatting.currency.decimals, 0);
        assert_eq!(formatting.percent.decimals, 1);
    }

    #[test]
    fn test_missing_identity_fields_default_to_empty() {
        let def = ReportDefinition::from_json(r#"{"layout": []}"#).unwrap();
        assert!(def.report_id.is_empty());
        assert!(def.statement_type.is_none());
        assert!(def.variables.is_empty());
    }
}
