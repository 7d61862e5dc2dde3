//! Compiled filters and row matching.

use crate::error::FilterError;
use crate::validate::validate_filter;
use finreport_core::{FilterField, FilterSpec, Movement};
use rust_decimal::Decimal;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A scalar filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Compared by string equality.
    Text(String),
    /// Compared numerically against fields that parse as decimals.
    Number(Decimal),
    /// Compared against `"true"` / `"false"`.
    Bool(bool),
}

impl Scalar {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
                    .map(Self::Number)
            }
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether `field` equals this value.
    #[must_use]
    pub fn matches(&self, field: &str) -> bool {
        match self {
            Self::Text(s) => field == s,
            Self::Number(n) => Decimal::from_str(field.trim()).is_ok_and(|f| f == *n),
            Self::Bool(b) => field == if *b { "true" } else { "false" },
        }
    }

    /// Order `field` relative to this value, `None` when incomparable.
    #[must_use]
    pub fn compare(&self, field: &str) -> Option<Ordering> {
        match self {
            Self::Number(n) => Decimal::from_str(field.trim()).ok().map(|f| f.cmp(n)),
            Self::Text(s) => match (Decimal::from_str(field.trim()), Decimal::from_str(s.trim())) {
                (Ok(f), Ok(b)) => Some(f.cmp(&b)),
                _ => Some(field.cmp(s.as_str())),
            },
            Self::Bool(b) => Some(field.cmp(if *b { "true" } else { "false" })),
        }
    }
}

impl fmt::Display for Scalar {
    /// Render as a predicate literal; strings are single-quoted and escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("'")
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Range comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `<`
    Lt,
}

impl RangeOp {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }

    /// Predicate operator symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    const fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Gte => !matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Lt => matches!(ordering, Ordering::Less),
        }
    }
}

/// The condition placed on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Field equals the value.
    Exact(Scalar),
    /// Field equals any of the values.
    AnyOf(Vec<Scalar>),
    /// Field satisfies every bound.
    Range(Vec<(RangeOp, Scalar)>),
}

impl Condition {
    /// Whether `field` satisfies the condition. An absent field never does.
    #[must_use]
    pub fn matches(&self, field: Option<&str>) -> bool {
        let Some(field) = field else {
            return false;
        };
        match self {
            Self::Exact(value) => value.matches(field),
            Self::AnyOf(values) => values.iter().any(|v| v.matches(field)),
            Self::Range(bounds) => bounds.iter().all(|(op, bound)| {
                bound
                    .compare(field)
                    .is_some_and(|ordering| op.accepts(ordering))
            }),
        }
    }
}

/// A validated, compiled filter specification.
///
/// A row matches when every field condition holds (AND across fields).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    clauses: Vec<(FilterField, Condition)>,
}

impl Filter {
    /// Validate and compile a specification.
    pub fn compile(spec: &FilterSpec) -> Result<Self, FilterError> {
        let validation = validate_filter(spec);
        if !validation.is_valid() {
            return Err(FilterError::InvalidFilterSpecification(validation.errors));
        }

        let mut clauses = Vec::with_capacity(spec.len());
        for (name, value) in spec {
            let field = FilterField::from_name(name).ok_or_else(|| invalid(name, "Unknown filter field"))?;
            clauses.push((field, compile_condition(name, value)?));
        }
        Ok(Self { clauses })
    }

    /// Whether the filter has no conditions (matches every row).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The compiled field conditions, in specification order.
    #[must_use]
    pub fn clauses(&self) -> &[(FilterField, Condition)] {
        &self.clauses
    }

    /// Whether a movement satisfies every condition.
    #[must_use]
    pub fn matches(&self, movement: &Movement) -> bool {
        self.clauses
            .iter()
            .all(|(field, condition)| condition.matches(movement.field(*field)))
    }
}

fn compile_condition(field: &str, value: &Value) -> Result<Condition, FilterError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::AnyOf),
        Value::Object(range) => range
            .iter()
            .map(|(key, bound)| {
                let op = RangeOp::from_key(key)
                    .ok_or_else(|| invalid(&format!("{field}.{key}"), "Unknown range operator"))?;
                Ok((op, scalar(field, bound)?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Condition::Range),
        other => scalar(field, other).map(Condition::Exact),
    }
}

fn scalar(field: &str, value: &Value) -> Result<Scalar, FilterError> {
    Scalar::from_json(value).ok_or_else(|| invalid(field, "Numeric filter value out of range"))
}

fn invalid(field: &str, message: &str) -> FilterError {
    FilterError::InvalidFilterSpecification(vec![finreport_core::Diagnostic::new(field, message)])
}
