//! Statement rendering.
//!
//! [`ReportRenderer::render_statement`] resolves every declared variable once,
//! walks the layout in ascending order producing one [`RenderedRow`] per item,
//! and finally adds variance columns when exactly two years are rendered.
//!
//! Rows rendered so far are threaded through the walk so calculated items can
//! read them as `@order` and subtotals can sum them.

use crate::error::RenderError;
use crate::resolver::{checked_sum, VariableResolver};
use finreport_core::{
    Decimal, FilterSpec, LayoutItem, LayoutKind, LayoutType, MovementTable, PeriodOptions,
    ReportDefinition, RenderedRow, RenderedStatement, RowMetadata, YearValues,
};
use finreport_expr::{EvalContext, Evaluator};
use finreport_filter::apply_filter;
use rust_decimal::RoundingStrategy;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Everything a layout item may read while rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Resolved variables.
    pub variables: &'a BTreeMap<String, YearValues>,
    /// The movements table.
    pub table: &'a MovementTable,
    /// Years (and period cut-off) to render.
    pub period: &'a PeriodOptions,
}

/// Renders report definitions against a movements table.
///
/// Owns a [`VariableResolver`] and an expression [`Evaluator`]. The
/// evaluator's AST cache is kept across renders; the resolver's value cache is
/// reset for every statement because values depend on the table.
#[derive(Debug, Default)]
pub struct ReportRenderer {
    resolver: VariableResolver,
    evaluator: Evaluator,
}

impl ReportRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The variable resolver.
    #[must_use]
    pub const fn resolver(&self) -> &VariableResolver {
        &self.resolver
    }

    /// The expression evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Render a complete statement.
    pub fn render_statement(
        &mut self,
        report: &ReportDefinition,
        table: &MovementTable,
        period: &PeriodOptions,
    ) -> Result<RenderedStatement, RenderError> {
        if report.report_id.is_empty() {
            return Err(RenderError::MissingReportField("a reportId"));
        }
        let Some(statement_type) = report.statement_type else {
            return Err(RenderError::MissingReportField("a statementType"));
        };
        if period.years().is_empty() {
            return Err(RenderError::NoYears);
        }

        self.resolver.clear_cache();
        let variables = self
            .resolver
            .resolve_variables(&report.variables, table, period)?;

        let context = RenderContext {
            variables: &variables,
            table,
            period,
        };
        let mut rows = self.process_layout_items(&report.layout, &context)?;
        calculate_variances(&mut rows, period)?;

        info!(
            report_id = %report.report_id,
            rows = rows.len(),
            years = ?period.years(),
            "rendered statement"
        );

        Ok(RenderedStatement {
            report_id: report.report_id.clone(),
            name: report.name.clone(),
            statement_type,
            years: period.years().to_vec(),
            rows,
        })
    }

    /// Render layout items in ascending order.
    ///
    /// Output contains exactly one row per item, sorted by order, regardless
    /// of the order items appear in `layout`.
    pub fn process_layout_items(
        &mut self,
        layout: &[LayoutItem],
        context: &RenderContext<'_>,
    ) -> Result<Vec<RenderedRow>, RenderError> {
        let mut items: Vec<&LayoutItem> = layout.iter().collect();
        items.sort_by_key(|item| item.order);

        let mut rows: BTreeMap<u32, RenderedRow> = BTreeMap::new();
        for item in items {
            if rows.contains_key(&item.order) {
                return Err(RenderError::DuplicateOrder(item.order));
            }

            let row = self
                .process_layout_item(item, context, &rows)
                .map_err(|e| RenderError::Item {
                    order: item.order,
                    layout_type: item.layout_type(),
                    inner: Box::new(e),
                })?;

            debug!(order = item.order, kind = %item.layout_type(), "rendered layout item");
            rows.insert(item.order, row);
        }

        Ok(rows.into_values().collect())
    }

    /// Render a single layout item given the rows rendered before it.
    pub fn process_layout_item(
        &mut self,
        item: &LayoutItem,
        context: &RenderContext<'_>,
        rows: &BTreeMap<u32, RenderedRow>,
    ) -> Result<RenderedRow, RenderError> {
        let years = context.period.years();

        let (amounts, metadata) = match &item.kind {
            LayoutKind::Variable { variable } => {
                let name = variable
                    .as_deref()
                    .ok_or_else(|| missing(LayoutType::Variable, "a variable name"))?;
                let values = context
                    .variables
                    .get(name)
                    .ok_or_else(|| RenderError::VariableNotFound(name.to_string()))?;
                let amounts = years
                    .iter()
                    .map(|&y| (y, Some(values.get(&y).copied().unwrap_or(Decimal::ZERO))))
                    .collect();
                (
                    amounts,
                    RowMetadata::Variable {
                        variable: name.to_string(),
                    },
                )
            }
            LayoutKind::Calculated { expression } => {
                let expression = expression
                    .as_deref()
                    .ok_or_else(|| missing(LayoutType::Calculated, "an expression"))?;
                self.calculate(expression, context, rows)?
            }
            LayoutKind::Category { filter } => {
                let filter = filter
                    .as_ref()
                    .ok_or_else(|| missing(LayoutType::Category, "a filter"))?;
                (
                    category_amounts(filter, context)?,
                    RowMetadata::Category {
                        filter: filter.clone(),
                    },
                )
            }
            LayoutKind::Subtotal { from, to } => {
                let (Some(from), Some(to)) = (*from, *to) else {
                    return Err(missing(LayoutType::Subtotal, "from and to"));
                };
                let totals = calculate_subtotal(from, to, rows, years)?;
                let amounts = totals.into_iter().map(|(y, v)| (y, Some(v))).collect();
                (
                    amounts,
                    RowMetadata::Subtotal {
                        from,
                        to,
                        included: subtotal_members(from, to, rows),
                    },
                )
            }
            LayoutKind::Spacer => (
                years.iter().map(|&y| (y, None)).collect(),
                RowMetadata::Spacer,
            ),
        };

        let label = match item.kind {
            LayoutKind::Spacer => String::new(),
            _ => item.label.clone().unwrap_or_default(),
        };

        Ok(RenderedRow {
            order: item.order,
            row_type: item.layout_type(),
            label,
            amounts,
            indent: item.indent.unwrap_or(0),
            style: item.style.unwrap_or_default(),
            format: item.format,
            variance_amount: None,
            variance_percent: None,
            metadata,
        })
    }

    fn calculate(
        &mut self,
        expression: &str,
        context: &RenderContext<'_>,
        rows: &BTreeMap<u32, RenderedRow>,
    ) -> Result<(BTreeMap<i32, Option<Decimal>>, RowMetadata), RenderError> {
        let wrap = |inner| RenderError::Expression {
            expression: expression.to_string(),
            inner,
        };

        let dependencies = self.evaluator.dependencies(expression).map_err(wrap)?;

        let mut amounts = BTreeMap::new();
        for &year in context.period.years() {
            let scope = evaluation_context(year, context.variables, rows);
            let value = self.evaluator.evaluate(expression, &scope).map_err(wrap)?;
            amounts.insert(year, value);
        }

        Ok((
            amounts,
            RowMetadata::Calculated {
                expression: expression.to_string(),
                dependencies,
            },
        ))
    }
}

fn missing(layout_type: LayoutType, requirement: &'static str) -> RenderError {
    RenderError::MissingField {
        layout_type,
        requirement,
    }
}

/// Bindings for one year: every variable by name, every rendered row by `@order`.
///
/// Years missing from a variable and blank row amounts bind as zero.
fn evaluation_context(
    year: i32,
    variables: &BTreeMap<String, YearValues>,
    rows: &BTreeMap<u32, RenderedRow>,
) -> EvalContext {
    let mut scope = EvalContext::with_capacity(variables.len() + rows.len());
    for (name, values) in variables {
        scope.insert(name.clone(), values.get(&year).copied().unwrap_or(Decimal::ZERO));
    }
    for (order, row) in rows {
        scope.insert(format!("@{order}"), row.amount_or_zero(year));
    }
    scope
}

/// Sum of the movements matching `filter`, per requested year.
///
/// Always a plain sum, whatever aggregate named variables use.
fn category_amounts(
    filter: &FilterSpec,
    context: &RenderContext<'_>,
) -> Result<BTreeMap<i32, Option<Decimal>>, RenderError> {
    let scoped = context.table.filter(|m| context.period.includes(m));
    let matched = apply_filter(&scoped, filter)?;

    let mut sums: BTreeMap<i32, Decimal> = context
        .period
        .years()
        .iter()
        .map(|&y| (y, Decimal::ZERO))
        .collect();
    for movement in &matched {
        if let Some(sum) = sums.get_mut(&movement.year) {
            *sum = sum
                .checked_add(movement.amount_or_zero())
                .ok_or(RenderError::Overflow("category sum"))?;
        }
    }

    Ok(sums.into_iter().map(|(y, v)| (y, Some(v))).collect())
}

/// Orders of the rows a subtotal over `[from, to]` adds up.
///
/// Spacer and subtotal rows are skipped; gaps in the range contribute nothing.
#[must_use]
pub fn subtotal_members(from: u32, to: u32, rows: &BTreeMap<u32, RenderedRow>) -> Vec<u32> {
    if from > to {
        return Vec::new();
    }
    rows.range(from..=to)
        .filter(|(_, row)| !matches!(row.row_type, LayoutType::Spacer | LayoutType::Subtotal))
        .map(|(order, _)| *order)
        .collect()
}

/// Sum rendered rows with `from <= order <= to` for each year.
///
/// Blank amounts count as zero. An empty range sums to zero.
pub fn calculate_subtotal(
    from: u32,
    to: u32,
    rows: &BTreeMap<u32, RenderedRow>,
    years: &[i32],
) -> Result<YearValues, RenderError> {
    if from > to {
        return Err(RenderError::InvalidSubtotalRange { from, to });
    }

    let members = subtotal_members(from, to, rows);
    years
        .iter()
        .map(|&year| {
            checked_sum(
                members
                    .iter()
                    .filter_map(|order| rows.get(order))
                    .map(|row| row.amount_or_zero(year)),
            )
            .map(|total| (year, total))
            .ok_or(RenderError::Overflow("subtotal"))
        })
        .collect()
}

/// Add variance columns when exactly two years are rendered.
///
/// `variance_amount = later - earlier`; `variance_percent` is the amount
/// relative to `|earlier|` in percent, `0` when the earlier amount is zero.
/// Spacer rows are left without variance.
///
/// # Errors
///
/// Fails when a change amount leaves the decimal range.
pub fn calculate_variances(
    rows: &mut [RenderedRow],
    period: &PeriodOptions,
) -> Result<(), RenderError> {
    let Some((earlier, later)) = period.variance_pair() else {
        return Ok(());
    };

    for row in rows.iter_mut().filter(|r| !r.is_spacer()) {
        let before = row.amount_or_zero(earlier);
        let after = row.amount_or_zero(later);
        let amount = after
            .checked_sub(before)
            .ok_or(RenderError::Overflow("variance"))?;

        let percent = if before.is_zero() {
            Some(Decimal::ZERO)
        } else {
            amount
                .checked_div(before.abs())
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(|p| p.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
        };

        row.variance_amount = Some(amount);
        row.variance_percent = percent;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::definition::filter_spec;
    use finreport_core::{ErrorKind, FilterField, Movement, RowStyle, StatementType, VariableDefinition};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(order: u32, row_type: LayoutType, amount: Option<Decimal>) -> RenderedRow {
        RenderedRow {
            order,
            row_type,
            label: String::new(),
            amounts: BTreeMap::from([(2024, amount)]),
            indent: 0,
            style: RowStyle::Normal,
            format: None,
            variance_amount: None,
            variance_percent: None,
            metadata: RowMetadata::Spacer,
        }
    }

    fn table() -> MovementTable {
        vec![
            Movement::new(2023, dec!(800)).with(FilterField::Code1, "700"),
            Movement::new(2024, dec!(1000)).with(FilterField::Code1, "700"),
            Movement::new(2023, dec!(300)).with(FilterField::Code1, "600"),
            Movement::new(2024, dec!(400)).with(FilterField::Code1, "600"),
        ]
        .into_iter()
        .collect()
    }

    fn income_report() -> ReportDefinition {
        ReportDefinition::new("income_simple", "Income", StatementType::Income)
            .with_variable("revenue", VariableDefinition::sum(filter_spec([("code1", json!("700"))])))
            .with_variable("cogs", VariableDefinition::sum(filter_spec([("code1", json!("600"))])))
            .with_item(LayoutItem::variable(10, "revenue").with_label("Revenue"))
            .with_item(LayoutItem::variable(20, "cogs").with_label("Cost of sales").with_indent(1))
            .with_item(LayoutItem::spacer(25))
            .with_item(LayoutItem::calculated(30, "@10 - @20").with_label("Gross profit"))
            .with_item(LayoutItem::subtotal(40, 10, 30).with_label("Total"))
    }

    #[test]
    fn test_subtotal_skips_spacers_and_subtotals() {
        let rows = BTreeMap::from([
            (10, row(10, LayoutType::Variable, Some(dec!(100)))),
            (20, row(20, LayoutType::Spacer, Some(dec!(999999)))),
            (30, row(30, LayoutType::Variable, Some(dec!(300)))),
        ]);
        let totals = calculate_subtotal(10, 30, &rows, &[2024]).unwrap();
        assert_eq!(totals, YearValues::from([(2024, dec!(400))]));
        assert_eq!(subtotal_members(10, 30, &rows), vec![10, 30]);

        let mut nested = rows.clone();
        nested.insert(35, row(35, LayoutType::Subtotal, Some(dec!(400))));
        assert_eq!(
            calculate_subtotal(10, 40, &nested, &[2024]).unwrap()[&2024],
            dec!(400)
        );
    }

    #[test]
    fn test_subtotal_blank_counts_as_zero_and_empty_range_is_zero() {
        let rows = BTreeMap::from([
            (10, row(10, LayoutType::Calculated, None)),
            (20, row(20, LayoutType::Variable, Some(dec!(5)))),
        ]);
        assert_eq!(calculate_subtotal(10, 20, &rows, &[2024]).unwrap()[&2024], dec!(5));
        assert_eq!(calculate_subtotal(50, 60, &rows, &[2024]).unwrap()[&2024], dec!(0));
    }

    #[test]
    fn test_inverted_subtotal_range() {
        let err = calculate_subtotal(30, 10, &BTreeMap::new(), &[2024]).unwrap_err();
        assert!(err.to_string().starts_with("Invalid subtotal range"));
        assert_eq!(err.kind(), ErrorKind::RangeViolation);
    }

    #[test]
    fn test_render_income_statement() {
        let mut renderer = ReportRenderer::new();
        let statement = renderer
            .render_statement(&income_report(), &table(), &PeriodOptions::new([2023, 2024]))
            .unwrap();

        let orders: Vec<_> = statement.rows.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![10, 20, 25, 30, 40]);

        let gross = statement.row(30).unwrap();
        assert_eq!(gross.amount(2023), Some(dec!(500)));
        assert_eq!(gross.amount(2024), Some(dec!(600)));
        assert_eq!(gross.variance_amount, Some(dec!(100)));
        assert_eq!(gross.variance_percent, Some(dec!(20)));

        let total = statement.row(40).unwrap();
        assert_eq!(total.amount(2024), Some(dec!(2000)));

        let spacer = statement.row(25).unwrap();
        assert_eq!(spacer.amount(2024), None);
        assert_eq!(spacer.variance_amount, None);
        assert!(spacer.label.is_empty());

        assert_eq!(statement.row(20).unwrap().indent, 1);
    }

    #[test]
    fn test_items_processed_in_order_regardless_of_layout_order() {
        let mut report = income_report();
        report.layout.reverse();
        let statement = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024]))
            .unwrap();
        assert_eq!(statement.row(30).unwrap().amount(2024), Some(dec!(600)));
    }

    #[test]
    fn test_variable_not_found() {
        let report = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::variable(10, "ghost"));
        let err = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024]))
            .unwrap_err();
        assert_eq!(err.root(), &RenderError::VariableNotFound("ghost".into()));
        assert_eq!(err.to_string(), "Layout item 10 (variable): Variable not found: ghost");
    }

    #[test]
    fn test_missing_type_field() {
        let report = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::new(10, LayoutKind::Calculated { expression: None }));
        let err = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024]))
            .unwrap_err();
        assert_eq!(err.root().to_string(), "Calculated layout item must have an expression");
    }

    #[test]
    fn test_expression_error_is_wrapped() {
        let report = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::calculated(10, "@5 + 1"));
        let err = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024]))
            .unwrap_err();
        assert_eq!(
            err.root().to_string(),
            "Failed to evaluate expression: Undefined order reference: @5"
        );
        assert_eq!(err.kind(), ErrorKind::UndefinedReference);
    }

    #[test]
    fn test_category_sums_and_zero_fills() {
        let report = ReportDefinition::new("r", "R", StatementType::Income).with_item(
            LayoutItem::category(10, filter_spec([("code1", json!("700"))])),
        );
        let statement = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024, 2030]))
            .unwrap();
        let row = statement.row(10).unwrap();
        assert_eq!(row.amount(2024), Some(dec!(1000)));
        assert_eq!(row.amount(2030), Some(dec!(0)));
    }

    #[test]
    fn test_totals_beyond_decimal_range_are_errors() {
        let huge: MovementTable = vec![
            Movement::new(2024, Decimal::MAX).with(FilterField::Code1, "700"),
            Movement::new(2024, Decimal::MAX).with(FilterField::Code1, "700"),
        ]
        .into_iter()
        .collect();
        let period = PeriodOptions::new([2024]);
        let code1 = || filter_spec([("code1", json!("700"))]);

        let category = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::category(10, code1()));
        let err = ReportRenderer::new()
            .render_statement(&category, &huge, &period)
            .unwrap_err();
        assert_eq!(err.root(), &RenderError::Overflow("category sum"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let variable = ReportDefinition::new("r", "R", StatementType::Income)
            .with_variable("revenue", VariableDefinition::sum(code1()))
            .with_item(LayoutItem::variable(10, "revenue"));
        let err = ReportRenderer::new()
            .render_statement(&variable, &huge, &period)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to resolve variable 'revenue': Arithmetic overflow"
        );
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_subtotal_beyond_decimal_range_is_an_error() {
        let rows = BTreeMap::from([
            (10, row(10, LayoutType::Variable, Some(Decimal::MAX))),
            (20, row(20, LayoutType::Category, Some(Decimal::MAX))),
        ]);
        assert_eq!(
            calculate_subtotal(10, 20, &rows, &[2024]).unwrap_err(),
            RenderError::Overflow("subtotal")
        );
    }

    #[test]
    fn test_variance_beyond_decimal_range_is_an_error() {
        let mut rows = vec![row(10, LayoutType::Variable, Some(Decimal::MAX))];
        rows[0].amounts.insert(2023, Some(Decimal::MIN));
        let err = calculate_variances(&mut rows, &PeriodOptions::new([2023, 2024])).unwrap_err();
        assert_eq!(err, RenderError::Overflow("variance"));
        assert_eq!(err.to_string(), "Arithmetic overflow in variance");
    }

    #[test]
    fn test_division_by_zero_renders_blank() {
        let report = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::calculated(10, "100 / 0"));
        let statement = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024]))
            .unwrap();
        assert_eq!(statement.row(10).unwrap().amount(2024), None);
    }

    #[test]
    fn test_variance_with_zero_earlier_amount() {
        let mut rows = vec![row(10, LayoutType::Variable, Some(dec!(50)))];
        rows[0].amounts.insert(2023, Some(Decimal::ZERO));
        calculate_variances(&mut rows, &PeriodOptions::new([2023, 2024])).unwrap();
        assert_eq!(rows[0].variance_amount, Some(dec!(50)));
        assert_eq!(rows[0].variance_percent, Some(dec!(0)));
    }

    #[test]
    fn test_variance_uses_absolute_earlier_amount() {
        let mut rows = vec![row(10, LayoutType::Variable, Some(dec!(-50)))];
        rows[0].amounts.insert(2023, Some(dec!(-200)));
        calculate_variances(&mut rows, &PeriodOptions::new([2023, 2024])).unwrap();
        assert_eq!(rows[0].variance_amount, Some(dec!(150)));
        assert_eq!(rows[0].variance_percent, Some(dec!(75)));
    }

    #[test]
    fn test_no_variance_for_single_year() {
        let mut rows = vec![row(10, LayoutType::Variable, Some(dec!(1)))];
        calculate_variances(&mut rows, &PeriodOptions::new([2024])).unwrap();
        assert_eq!(rows[0].variance_amount, None);
    }

    #[test]
    fn test_rejects_missing_years_and_statement_type() {
        let mut renderer = ReportRenderer::new();
        assert_eq!(
            renderer
                .render_statement(&income_report(), &table(), &PeriodOptions::new(Vec::new()))
                .unwrap_err(),
            RenderError::NoYears
        );

        let mut report = income_report();
        report.statement_type = None;
        assert!(matches!(
            renderer.render_statement(&report, &table(), &PeriodOptions::new([2024])),
            Err(RenderError::MissingReportField(_))
        ));
    }

    #[test]
    fn test_duplicate_order_is_rejected() {
        let report = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::spacer(10))
            .with_item(LayoutItem::spacer(10));
        let err = ReportRenderer::new()
            .render_statement(&report, &table(), &PeriodOptions::new([2024]))
            .unwrap_err();
        assert_eq!(err, RenderError::DuplicateOrder(10));
    }
}
