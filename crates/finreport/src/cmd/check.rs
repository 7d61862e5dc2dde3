//! Implementation of the freport-check command.

use crate::cmd::{init_logging, OutputFormat};
use crate::report;
use anyhow::{Context, Result};
use clap::Parser;
use finreport_core::{LayoutKind, ReportDefinition, ValidationResult};
use finreport_expr::{parse, SyntaxError};
use finreport_validate::validate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Validate report definitions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Report definition files to check
    #[arg(value_name = "REPORT", required = true)]
    pub files: Vec<PathBuf>,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    pub no_color: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check result for one file in JSON output.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Report definition path.
    pub file: String,
    /// Identifier of the report definition.
    pub report_id: String,
    /// Whether the definition has no errors.
    pub valid: bool,
    /// Errors and warnings.
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Syntax errors of calculated expressions, keyed by validator field path.
fn syntax_errors(report: &ReportDefinition) -> BTreeMap<String, (&str, SyntaxError)> {
    report
        .layout
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match &item.kind {
            LayoutKind::Calculated {
                expression: Some(expression),
            } if !expression.trim().is_empty() => parse(expression).err().map(|error| {
                (
                    format!("layout[{index}].expression"),
                    (expression.as_str(), error),
                )
            }),
            _ => None,
        })
        .collect()
}

/// Check every file in `args`, writing results to `out`.
///
/// Returns exit code 1 when any definition has errors.
///
/// # Errors
///
/// Fails when a file cannot be read or is not a report definition.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<ExitCode> {
    let color = !args.no_color && io::stdout().is_terminal();
    let json_mode = args.format == OutputFormat::Json;
    let mut reports = Vec::new();
    let mut error_count = 0;
    let mut warning_count = 0;

    for path in &args.files {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let definition = ReportDefinition::from_json(&source)
            .with_context(|| format!("failed to parse report definition {}", path.display()))?;
        let result = validate(&definition);
        let file = path.display().to_string();

        error_count += result.errors.len();
        warning_count += result.warnings.len();

        if json_mode {
            reports.push(FileReport {
                file,
                report_id: definition.report_id.clone(),
                valid: result.is_valid(),
                result,
            });
            continue;
        }
        if args.quiet {
            continue;
        }

        let syntax = syntax_errors(&definition);
        let is_syntax = |d: &finreport_core::Diagnostic| {
            d.message.starts_with("Invalid expression") && syntax.contains_key(&d.field)
        };
        for (field, (expression, error)) in &syntax {
            let source_id = format!("{file}:{}", field.trim_end_matches(".expression"));
            report::report_syntax_error(&source_id, expression, error, color, out)?;
        }
        report::report_diagnostics(&file, &result, is_syntax, out)?;
    }

    if json_mode {
        writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
    } else if !args.quiet {
        report::print_summary(error_count, warning_count, out)?;
    }

    Ok(if error_count > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Main entry point for freport-check.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::{LayoutItem, StatementType};

    #[test]
    fn test_syntax_errors_keyed_by_field() {
        let report = ReportDefinition::new("r", "R", StatementType::Income)
            .with_item(LayoutItem::calculated(10, "1 +"))
            .with_item(LayoutItem::calculated(20, "1 + 1"))
            .with_item(LayoutItem::calculated(30, "(2"));

        let keys: Vec<_> = syntax_errors(&report).into_keys().collect();
        assert_eq!(keys, vec!["layout[0].expression", "layout[2].expression"]);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["freport-check", "a.json", "b.json", "-f", "json", "-q"])
            .unwrap();
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.quiet);
        assert!(Args::try_parse_from(["freport-check"]).is_err());
    }
}
