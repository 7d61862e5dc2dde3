//! Financial statement CLI tools.
//!
//! This crate provides command-line tools for report definitions:
//!
//! - `freport-render`: Render a statement from a report definition and a movements CSV
//! - `freport-check`: Validate report definitions
//!
//! # Example Usage
//!
//! ```bash
//! freport-check reports/*.json
//! freport-render reports/income.json movements.csv --year 2023 --year 2024
//! freport-render reports/income.json movements.csv --year 2024 --max-period 6 --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
pub mod table;
