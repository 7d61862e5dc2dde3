//! Ledger movements: the rows statements are rendered from.
//!
//! A [`MovementTable`] is a read-only, ordered collection of [`Movement`]s.
//! Nothing in the engine mutates a table; filtering produces a new table that
//! preserves the original row order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A column that filter specifications may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    /// Level-1 account code.
    Code1,
    /// Level-2 account code.
    Code2,
    /// Level-3 account code.
    Code3,
    /// Level-1 account name.
    Name1,
    /// Level-2 account name.
    Name2,
    /// Level-3 account name.
    Name3,
    /// Statement the movement belongs to.
    StatementType,
    /// Full account code.
    AccountCode,
}

impl FilterField {
    /// Every filterable field.
    pub const ALL: [Self; 8] = [
        Self::Code1,
        Self::Code2,
        Self::Code3,
        Self::Name1,
        Self::Name2,
        Self::Name3,
        Self::StatementType,
        Self::AccountCode,
    ];

    /// Column name as written in filter specifications.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code1 => "code1",
            Self::Code2 => "code2",
            Self::Code3 => "code3",
            Self::Name1 => "name1",
            Self::Name2 => "name2",
            Self::Name3 => "name3",
            Self::StatementType => "statement_type",
            Self::AccountCode => "account_code",
        }
    }

    /// Look up a field by its exact column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Movement {
    /// Level-1 account code.
    #[serde(default)]
    pub code1: Option<String>,
    /// Level-2 account code.
    #[serde(default)]
    pub code2: Option<String>,
    /// Level-3 account code.
    #[serde(default)]
    pub code3: Option<String>,
    /// Level-1 account name.
    #[serde(default)]
    pub name1: Option<String>,
    /// Level-2 account name.
    #[serde(default)]
    pub name2: Option<String>,
    /// Level-3 account name.
    #[serde(default)]
    pub name3: Option<String>,
    /// Statement the movement belongs to.
    #[serde(default)]
    pub statement_type: Option<String>,
    /// Full account code.
    #[serde(default)]
    pub account_code: Option<String>,
    /// Fiscal year.
    pub year: i32,
    /// Period within the fiscal year (e.g. month 1-12).
    #[serde(default)]
    pub period: Option<u32>,
    /// Amount; missing amounts aggregate as zero.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl Movement {
    /// Create a movement for `year` with the given amount and no codes.
    #[must_use]
    pub fn new(year: i32, amount: Decimal) -> Self {
        Self {
            year,
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Set a text column.
    #[must_use]
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        *self.field_mut(field) = Some(value.into());
        self
    }

    /// Set the period.
    #[must_use]
    pub const fn with_period(mut self, period: u32) -> Self {
        self.period = Some(period);
        self
    }

    /// Clear the amount.
    #[must_use]
    pub const fn without_amount(mut self) -> Self {
        self.amount = None;
        self
    }

    /// Value of a text column.
    #[must_use]
    pub fn field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Code1 => self.code1.as_deref(),
            FilterField::Code2 => self.code2.as_deref(),
            FilterField::Code3 => self.code3.as_deref(),
            FilterField::Name1 => self.name1.as_deref(),
            FilterField::Name2 => self.name2.as_deref(),
            FilterField::Name3 => self.name3.as_deref(),
            FilterField::StatementType => self.statement_type.as_deref(),
            FilterField::AccountCode => self.account_code.as_deref(),
        }
    }

    fn field_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Code1 => &mut self.code1,
            FilterField::Code2 => &mut self.code2,
            FilterField::Code3 => &mut self.code3,
            FilterField::Name1 => &mut self.name1,
            FilterField::Name2 => &mut self.name2,
            FilterField::Name3 => &mut self.name3,
            FilterField::StatementType => &mut self.statement_type,
            FilterField::AccountCode => &mut self.account_code,
        }
    }

    /// The amount, with a missing amount read as zero.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// An ordered, read-only collection of movements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementTable {
    rows: Vec<Movement>,
}

impl MovementTable {
    /// Create a table from rows, keeping their order.
    #[must_use]
    pub const fn new(rows: Vec<Movement>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in table order.
    #[must_use]
    pub fn rows(&self) -> &[Movement] {
        &self.rows
    }

    /// Iterate over rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Movement> {
        self.rows.iter()
    }

    /// Rows satisfying `predicate`, in table order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Movement) -> bool,
    {
        self.rows.iter().filter(|m| predicate(m)).cloned().collect()
    }

    /// Distinct fiscal years present in the table, ascending.
    #[must_use]
    pub fn years(&self) -> BTreeSet<i32> {
        self.rows.iter().map(|m| m.year).collect()
    }

    /// Extract one text column.
    #[must_use]
    pub fn column(&self, field: FilterField) -> Vec<Option<&str>> {
        self.rows.iter().map(|m| m.field(field)).collect()
    }

    /// Extract the amount column.
    #[must_use]
    pub fn amounts(&self) -> Vec<Option<Decimal>> {
        self.rows.iter().map(|m| m.amount).collect()
    }

    /// Materialize rows as plain JSON objects.
    #[must_use]
    pub fn to_records(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|m| serde_json::to_value(m).unwrap_or(serde_json::Value::Null))
            .collect()
    }

    /// Consume the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Movement> {
        self.rows
    }
}

impl FromIterator<Movement> for MovementTable {
    fn from_iter<I: IntoIterator<Item = Movement>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Movement>> for MovementTable {
    fn from(rows: Vec<Movement>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a MovementTable {
    type Item = &'a Movement;
    type IntoIter = std::slice::Iter<'a, Movement>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
