//! CSV loading into a [`Table`]
//!
//! Archive exports start with `#` comment lines, which are skipped. Columns
//! listed in [`schema::EXPECTED_COLUMNS`] get their declared type; any
//! other column is numeric when every non-empty cell parses as a number and
//! text otherwise. Empty cells load as missing values.

use crate::schema;
use crate::table::{Column, ColumnType, Table};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load a CSV file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;
    let table = read_csv(file).with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::info!(
        "loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Read CSV data with a header row from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (index, record) in reader.records().enumerate() {
        // Header is line 1
        let record = record.with_context(|| format!("Malformed CSV record {}", index + 2))?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push(value.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, values))
        .collect::<Result<Vec<_>>>()?;

    Ok(Table::new(columns)?)
}

fn build_column(name: String, values: Vec<String>) -> Result<Column> {
    let column_type = schema::declared_type(&name).unwrap_or_else(|| infer_type(&values));

    match column_type {
        ColumnType::Text => Ok(Column::text(
            name,
            values
                .into_iter()
                .map(|v| (!v.is_empty()).then_some(v))
                .collect(),
        )),
        ColumnType::Numeric => {
            let parsed = values
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    parse_number(v)
                        .with_context(|| format!("column '{name}', data row {}", row + 1))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Column::numeric(name, parsed))
        }
    }
}

fn infer_type(values: &[String]) -> ColumnType {
    let numeric = values
        .iter()
        .filter(|v| !v.is_empty())
        .all(|v| v.parse::<f64>().is_ok());
    if numeric {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

fn parse_number(value: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    let number = value
        .parse::<f64>()
        .with_context(|| format!("'{value}' is not a number"))?;
    Ok(Some(number))
}
