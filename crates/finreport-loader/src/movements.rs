//! Movements ingestion from CSV.
//!
//! Columns are addressed by header name: `code1`, `code2`, `code3`, `name1`,
//! `name2`, `name3`, `statement_type`, `account_code`, `year`, `period`,
//! `amount`. Only `year` is required; every other column may be missing or
//! empty.

use crate::error::LoadError;
use finreport_core::{Movement, MovementTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct MovementRecord {
    #[serde(default)]
    code1: Option<String>,
    #[serde(default)]
    code2: Option<String>,
    #[serde(default)]
    code3: Option<String>,
    #[serde(default)]
    name1: Option<String>,
    #[serde(default)]
    name2: Option<String>,
    #[serde(default)]
    name3: Option<String>,
    #[serde(default)]
    statement_type: Option<String>,
    #[serde(default)]
    account_code: Option<String>,
    year: i32,
    #[serde(default)]
    period: Option<u32>,
    // Kept as text so amounts never pass through a binary float.
    #[serde(default)]
    amount: Option<String>,
}

/// Read a movements CSV file.
pub fn load_movements_csv(path: &Path) -> Result<MovementTable, LoadError> {
    let file = File::open(path).map_err(|error| LoadError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let table = read_movements_csv(file)?;
    debug!(path = %path.display(), rows = table.len(), "loaded movements");
    Ok(table)
}

/// Read movements CSV from any reader.
///
/// ```
/// use finreport_loader::read_movements_csv;
///
/// let csv = "code1,year,amount\n700,2024,100.50\n710,2024,\n";
/// let table = read_movements_csv(csv.as_bytes()).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.rows()[1].amount, None);
/// ```
pub fn read_movements_csv<R: Read>(reader: R) -> Result<MovementTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize::<MovementRecord>() {
        let record = result?;
        let amount = match record.amount.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(Decimal::from_str(text).map_err(|_| LoadError::Amount {
                line: rows.len() as u64 + 2,
                value: text.to_string(),
            })?),
        };

        rows.push(Movement {
            code1: non_empty(record.code1),
            code2: non_empty(record.code2),
            code3: non_empty(record.code3),
            name1: non_empty(record.name1),
            name2: non_empty(record.name2),
            name3: non_empty(record.name3),
            statement_type: non_empty(record.statement_type),
            account_code: non_empty(record.account_code),
            year: record.year,
            period: record.period,
            amount,
        });
    }

    Ok(MovementTable::new(rows))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
