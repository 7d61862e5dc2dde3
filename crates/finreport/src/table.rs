//! Plain-text table output for rendered statements.

use finreport_core::{Formatting, NumberFormat, RenderedRow, RenderedStatement, RowStyle};
use finreport_render::{apply_formatting, format_cell};
use std::io::{self, Write};

const MIN_LABEL_WIDTH: usize = 20;
const MIN_CELL_WIDTH: usize = 12;

/// Cells of one row: a year column per rendered year, then variance columns.
fn row_cells(row: &RenderedRow, statement: &RenderedStatement, formatting: &Formatting) -> Vec<String> {
    let mut cells: Vec<String> = statement
        .years
        .iter()
        .map(|&year| format_cell(row, year, formatting))
        .collect();
    if has_variance(statement) {
        let format = row.format.unwrap_or(NumberFormat::Currency);
        cells.push(apply_formatting(row.variance_amount, format, formatting));
        cells.push(apply_formatting(
            row.variance_percent,
            NumberFormat::Percent,
            formatting,
        ));
    }
    cells
}

fn has_variance(statement: &RenderedStatement) -> bool {
    statement.years.len() == 2
}

fn indented_label(row: &RenderedRow) -> String {
    format!("{}{}", "  ".repeat(usize::from(row.indent)), row.label)
}

/// Write `statement` as an aligned table.
///
/// Labels are indented two spaces per level, amounts are right-aligned, and
/// subtotal and total rows are preceded by a rule.
pub fn write_statement<W: Write>(
    statement: &RenderedStatement,
    formatting: &Formatting,
    out: &mut W,
) -> io::Result<()> {
    let mut header: Vec<String> = statement.years.iter().map(ToString::to_string).collect();
    if has_variance(statement) {
        header.push("Change".to_string());
        header.push("Change %".to_string());
    }

    let body: Vec<(String, Vec<String>)> = statement
        .rows
        .iter()
        .map(|row| (indented_label(row), row_cells(row, statement, formatting)))
        .collect();

    let label_width = body
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH);
    let cell_width = body
        .iter()
        .flat_map(|(_, cells)| cells.iter())
        .chain(header.iter())
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_CELL_WIDTH);
    let total_width = label_width + header.len() * (cell_width + 2);

    writeln!(out, "{} ({})", statement.name, statement.statement_type)?;
    writeln!(out)?;
    write_line(out, "", &header, label_width, cell_width)?;
    writeln!(out, "{}", "=".repeat(total_width))?;

    for (row, (label, cells)) in statement.rows.iter().zip(&body) {
        match row.style {
            RowStyle::Spacer => writeln!(out)?,
            RowStyle::Subtotal | RowStyle::Total => {
                writeln!(out, "{}", "-".repeat(total_width))?;
                write_line(out, label, cells, label_width, cell_width)?;
            }
            RowStyle::Normal | RowStyle::Metric => {
                write_line(out, label, cells, label_width, cell_width)?;
            }
        }
    }
    Ok(())
}

fn write_line<W: Write>(
    out: &mut W,
    label: &str,
    cells: &[String],
    label_width: usize,
    cell_width: usize,
) -> io::Result<()> {
    let mut line = format!("{label:<label_width$}");
    for cell in cells {
        line.push_str(&format!("  {cell:>cell_width$}"));
    }
    writeln!(out, "{}", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::{Decimal, LayoutType, RowMetadata, StatementType};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn row(order: u32, label: &str, style: RowStyle, amounts: &[(i32, Option<Decimal>)]) -> RenderedRow {
        RenderedRow {
            order,
            row_type: LayoutType::Variable,
            label: label.to_string(),
            amounts: amounts.iter().copied().collect::<BTreeMap<_, _>>(),
            indent: 0,
            style,
            format: None,
            variance_amount: None,
            variance_percent: None,
            metadata: RowMetadata::Spacer,
        }
    }

    fn render(statement: &RenderedStatement) -> String {
        let mut out = Vec::new();
        write_statement(statement, &Formatting::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_year_table() {
        let mut revenue = row(10, "Revenue", RowStyle::Normal, &[(2024, Some(dec!(1234.4)))]);
        revenue.indent = 1;
        let statement = RenderedStatement {
            report_id: "income".to_string(),
            name: "Income".to_string(),
            statement_type: StatementType::Income,
            years: vec![2024],
            rows: vec![
                revenue,
                row(20, "", RowStyle::Spacer, &[(2024, None)]),
                row(30, "Total", RowStyle::Total, &[(2024, Some(dec!(1234.4)))]),
            ],
        };

        let text = render(&statement);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Income (income)");
        assert!(lines[2].ends_with("2024"));
        assert!(lines[4].starts_with("  Revenue"));
        assert!(lines[4].ends_with("1,234"));
        assert_eq!(lines[5], "");
        assert!(lines[6].starts_with('-'));
        assert!(lines[7].starts_with("Total"));
        assert!(!text.contains("Change"));
    }

    #[test]
    fn test_variance_columns() {
        let mut revenue = row(
            10,
            "Revenue",
            RowStyle::Normal,
            &[(2023, Some(dec!(100))), (2024, Some(dec!(150)))],
        );
        revenue.variance_amount = Some(dec!(50));
        revenue.variance_percent = Some(dec!(50));
        let statement = RenderedStatement {
            report_id: "income".to_string(),
            name: "Income".to_string(),
            statement_type: StatementType::Income,
            years: vec![2023, 2024],
            rows: vec![revenue],
        };

        let text = render(&statement);
        let header = text.lines().nth(2).unwrap();
        assert!(header.contains("2023") && header.contains("2024"));
        assert!(header.ends_with("Change %"));
        let line = text.lines().nth(4).unwrap();
        assert!(line.ends_with("50.0%"));
        assert!(line.contains("150"));
    }
}
