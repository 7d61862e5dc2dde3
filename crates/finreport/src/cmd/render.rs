//! Implementation of the freport-render command.

use crate::cmd::{init_logging, OutputFormat};
use crate::report;
use crate::table::write_statement;
use anyhow::{Context, Result};
use clap::Parser;
use finreport_core::{PeriodOptions, ValidationResult};
use finreport_loader::{load_movements_csv, LoadError, ReportLoader};
use finreport_render::ReportRenderer;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Render a financial statement from a report definition and movements.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Report definition (JSON)
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    /// Movements table (CSV)
    #[arg(value_name = "MOVEMENTS")]
    pub movements: PathBuf,

    /// Fiscal year to render (repeatable)
    #[arg(long = "year", short = 'y', value_name = "YEAR", required = true)]
    pub years: Vec<i32>,

    /// Only aggregate movements with period <= N
    #[arg(long, value_name = "N")]
    pub max_period: Option<u32>,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Skip validating the report definition before rendering
    #[arg(long)]
    pub no_validate: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Render the statement described by `args`, writing it to `out`.
///
/// Invalid definitions and render failures are reported on `err` with exit
/// code 1.
///
/// # Errors
///
/// Fails when an input file cannot be read or parsed.
pub fn run<W: Write, E: Write>(args: &Args, out: &mut W, err: &mut E) -> Result<ExitCode> {
    let mut loader = ReportLoader::new().with_validation(!args.no_validate);
    let report = match loader.load(&args.report) {
        Ok(report) => report,
        Err(LoadError::Invalid { path, diagnostics }) => {
            let result = ValidationResult {
                errors: diagnostics,
                warnings: Vec::new(),
            };
            let file = path.display().to_string();
            report::report_diagnostics(&file, &result, |_| false, err)?;
            report::print_summary(result.errors.len(), 0, err)?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e.into()),
    };

    let table = load_movements_csv(&args.movements)
        .with_context(|| format!("failed to load movements {}", args.movements.display()))?;
    debug!(rows = table.len(), "loaded movements");

    let mut period = PeriodOptions::new(args.years.iter().copied());
    if let Some(max_period) = args.max_period {
        period = period.with_max_period(max_period);
    }

    let statement = match ReportRenderer::new().render_statement(&report, &table, &period) {
        Ok(statement) => statement,
        Err(e) => {
            writeln!(err, "error: {}: {e}", args.report.display())?;
            return Ok(ExitCode::from(1));
        }
    };

    match args.format {
        OutputFormat::Text => write_statement(&statement, &report.formatting_or_default(), out)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&statement)?)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for freport-render.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    match run(&args, &mut stdout, &mut stderr) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
