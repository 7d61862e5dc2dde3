//! Variable resolution.
//!
//! A variable is a filter over the movements table plus an aggregate applied
//! per fiscal year. Resolved values are cached by variable name for the
//! lifetime of the resolver (or until [`VariableResolver::clear_cache`]).
//!
//! Resolution of a named variable runs inside a [`ResolutionGuard`]: the name
//! is pushed on a resolution stack and popped when the guard drops, on success
//! and failure alike. Re-entering a name that is already on the stack fails
//! with [`ResolveError::CircularDependency`]. Variables cannot reference other
//! variables yet, so the guard only fires once such references exist.

use crate::error::ResolveError;
use finreport_core::{
    AggregateFunction, Decimal, MovementTable, PeriodOptions, ValidationResult,
    VariableDefinition, YearValues,
};
use finreport_filter::{apply_filter, validate_filter};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Resolves variable definitions to per-year values.
#[derive(Debug, Default)]
pub struct VariableResolver {
    cache: HashMap<String, YearValues>,
    stack: RefCell<Vec<String>>,
}

impl VariableResolver {
    /// Create a resolver with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one definition against `table`, without caching.
    ///
    /// An empty table yields no years. Otherwise every year present in the
    /// (period-restricted) table gets a value, `0` when nothing matched.
    pub fn resolve_variable(
        &self,
        variable: &VariableDefinition,
        table: &MovementTable,
        period: &PeriodOptions,
    ) -> Result<YearValues, ResolveError> {
        let scoped = table.filter(|m| period.includes(m));
        let matched = apply_filter(&scoped, &variable.filter)?;
        let aggregate = variable
            .aggregate_function()
            .map_err(|_| ResolveError::UnsupportedAggregateFunction(variable.aggregate.clone()))?;

        let mut groups: BTreeMap<i32, Vec<Decimal>> =
            scoped.years().into_iter().map(|y| (y, Vec::new())).collect();
        for movement in &matched {
            groups
                .entry(movement.year)
                .or_default()
                .push(movement.amount_or_zero());
        }

        groups
            .into_iter()
            .map(|(year, amounts)| aggregate_amounts(aggregate, &amounts).map(|v| (year, v)))
            .collect()
    }

    /// Check a definition statically.
    pub fn validate_variable(&self, variable: &VariableDefinition) -> ValidationResult {
        validate_variable(variable)
    }

    /// Resolve every variable, reusing cached values by name.
    ///
    /// The first failure aborts the batch, wrapped with the variable's name.
    pub fn resolve_variables(
        &mut self,
        variables: &BTreeMap<String, VariableDefinition>,
        table: &MovementTable,
        period: &PeriodOptions,
    ) -> Result<BTreeMap<String, YearValues>, ResolveError> {
        variables
            .iter()
            .map(|(name, definition)| {
                self.resolve_named(name, definition, table, period)
                    .map(|values| (name.clone(), values))
            })
            .collect()
    }

    /// Resolve a named variable under the circular-dependency guard.
    pub fn resolve_named(
        &mut self,
        name: &str,
        variable: &VariableDefinition,
        table: &MovementTable,
        period: &PeriodOptions,
    ) -> Result<YearValues, ResolveError> {
        if let Some(values) = self.cache.get(name) {
            trace!(variable = name, "variable cache hit");
            return Ok(values.clone());
        }

        let values = ResolutionGuard::enter(&self.stack, name)
            .and_then(|_guard| self.resolve_variable(variable, table, period))
            .map_err(|e| ResolveError::Variable {
                name: name.to_string(),
                inner: Box::new(e),
            })?;

        debug!(
            variable = name,
            aggregate = %variable.aggregate,
            years = values.len(),
            "resolved variable"
        );
        self.cache.insert(name.to_string(), values.clone());
        Ok(values)
    }

    /// Number of cached variables.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached value.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Names currently being resolved. Empty between calls.
    #[must_use]
    pub fn resolution_stack(&self) -> Vec<String> {
        self.stack.borrow().clone()
    }
}

/// Check a variable definition: a non-empty valid filter and a supported aggregate.
pub fn validate_variable(variable: &VariableDefinition) -> ValidationResult {
    let mut result = ValidationResult::new();

    if variable.filter.is_empty() {
        result.error("filter", "Variable filter must not be empty");
    } else {
        result.merge_nested("filter", validate_filter(&variable.filter));
    }

    if variable.aggregate.is_empty() {
        result.error("aggregate", "Variable aggregate is required");
    } else if variable.aggregate_function().is_err() {
        let allowed: Vec<_> = AggregateFunction::ALL.iter().map(AggregateFunction::as_str).collect();
        result.error(
            "aggregate",
            format!(
                "Unsupported aggregate function: {}. Allowed: {}",
                variable.aggregate,
                allowed.join(", ")
            ),
        );
    }

    result
}

/// Sum with overflow detection; `None` when the total leaves the decimal range.
pub(crate) fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

fn aggregate_amounts(
    aggregate: AggregateFunction,
    amounts: &[Decimal],
) -> Result<Decimal, ResolveError> {
    let value = match aggregate {
        AggregateFunction::Sum => checked_sum(amounts.iter().copied()),
        AggregateFunction::Average => {
            if amounts.is_empty() {
                Some(Decimal::ZERO)
            } else {
                checked_sum(amounts.iter().copied())
                    .and_then(|total| total.checked_div(Decimal::from(amounts.len())))
            }
        }
        AggregateFunction::Count => Some(Decimal::from(amounts.len())),
        AggregateFunction::Min => Some(amounts.iter().min().copied().unwrap_or(Decimal::ZERO)),
        AggregateFunction::Max => Some(amounts.iter().max().copied().unwrap_or(Decimal::ZERO)),
        AggregateFunction::First => Some(amounts.first().copied().unwrap_or(Decimal::ZERO)),
        AggregateFunction::Last => Some(amounts.last().copied().unwrap_or(Decimal::ZERO)),
    };
    value.ok_or(ResolveError::Overflow)
}

/// Scope guard for one entry on the resolution stack.
///
/// Pops the name when dropped.
pub struct ResolutionGuard<'a> {
    stack: &'a RefCell<Vec<String>>,
}

impl<'a> ResolutionGuard<'a> {
    /// Push `name`, failing if it is already being resolved.
    pub fn enter(stack: &'a RefCell<Vec<String>>, name: &str) -> Result<Self, ResolveError> {
        let mut names = stack.borrow_mut();
        if let Some(start) = names.iter().position(|n| n == name) {
            let mut chain = names[start..].to_vec();
            chain.push(name.to_string());
            return Err(ResolveError::CircularDependency { chain });
        }
        names.push(name.to_string());
        Ok(Self { stack })
    }
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}
