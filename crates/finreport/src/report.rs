//! Diagnostic output for report checks.
//!
//! Expression syntax errors are rendered with ariadne, pointing at the
//! offending token inside the expression text.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use finreport_core::{Diagnostic, ValidationResult};
use finreport_expr::SyntaxError;
use std::io::Write;

/// Render one expression syntax error with source context.
///
/// `source_id` names the expression in the output, e.g. `income.json:layout[2]`.
pub fn report_syntax_error<W: Write>(
    source_id: &str,
    expression: &str,
    error: &SyntaxError,
    color: bool,
    writer: &mut W,
) -> std::io::Result<()> {
    let span = error.span.start..error.span.end;

    Report::build(ReportKind::Error, (source_id, span.clone()))
        .with_config(
            Config::default()
                .with_color(color)
                .with_index_type(IndexType::Byte),
        )
        .with_code("syntax")
        .with_message(error.to_string())
        .with_label(
            Label::new((source_id, span))
                .with_message(error.label())
                .with_color(Color::Red),
        )
        .finish()
        .write((source_id, Source::from(expression)), &mut *writer)
}

/// Write diagnostics as `severity: file: field: message` lines.
///
/// `skip` filters out errors that were already rendered elsewhere.
pub fn report_diagnostics<W: Write>(
    file: &str,
    result: &ValidationResult,
    skip: impl Fn(&Diagnostic) -> bool,
    writer: &mut W,
) -> std::io::Result<()> {
    for error in result.errors.iter().filter(|e| !skip(e)) {
        writeln!(writer, "error: {file}: {error}")?;
    }
    for warning in &result.warnings {
        writeln!(writer, "warning: {file}: {warning}")?;
    }
    Ok(())
}

/// Print a summary of errors and warnings.
pub fn print_summary<W: Write>(
    errors: usize,
    warnings: usize,
    writer: &mut W,
) -> std::io::Result<()> {
    if errors == 0 && warnings == 0 {
        writeln!(writer, "\u{2713} No errors found")?;
        return Ok(());
    }

    let error_text = if errors == 1 { "error" } else { "errors" };
    let warning_text = if warnings == 1 { "warning" } else { "warnings" };
    if errors > 0 && warnings > 0 {
        writeln!(writer, "\u{2717} {errors} {error_text}, {warnings} {warning_text}")
    } else if errors > 0 {
        writeln!(writer, "\u{2717} {errors} {error_text}")
    } else {
        writeln!(writer, "\u{26A0} {warnings} {warning_text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_expr::parse;

    #[test]
    fn test_syntax_error_points_at_token() {
        let expression = "revenue $ costs";
        let error = parse(expression).unwrap_err();

        let mut out = Vec::new();
        report_syntax_error("income.json:layout[0]", expression, &error, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Invalid character '$' at position 8"));
        assert!(text.contains("income.json:layout[0]"));
        assert!(text.contains("not allowed in expressions"));
    }

    #[test]
    fn test_summary() {
        let mut out = Vec::new();
        print_summary(2, 1, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\u{2717} 2 errors, 1 warning\n");
    }
}
