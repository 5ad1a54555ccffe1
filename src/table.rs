//! Immutable column-oriented snapshot of the dataset
//!
//! A [`Table`] is built once (usually by `loader`) and never mutated. Every
//! transformation, including the filter engine, produces a new table through
//! [`Table::select`].

use crate::error::{InferenceError, Result};
use crate::stats::Sample;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
}

/// Cell storage for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Numeric(_) => ColumnType::Numeric,
            ColumnData::Text(_) => ColumnType::Text,
        }
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(indices.iter().map(|&i| values[i]).collect())
            }
            ColumnData::Text(values) => {
                ColumnData::Text(indices.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
}

/// Borrowed view of a single present cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Number(f64),
    Text(&'a str),
}

/// Immutable tabular snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    /// Column name → position in `columns`
    index: HashMap<String, usize>,
    rows: usize,
}

impl Table {
    /// Build a table from columns of equal length with unique names
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut index = HashMap::with_capacity(columns.len());

        for (position, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(InferenceError::SchemaError(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    rows
                )));
            }
            if index.insert(column.name.clone(), position).is_some() {
                return Err(InferenceError::SchemaError(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.index
            .get(name)
            .map(|&position| &self.columns[position])
            .ok_or_else(|| InferenceError::SchemaError(format!("column '{name}' not found")))
    }

    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.column(name)?.column_type())
    }

    /// Numeric cells of a column; fails if the column is absent or textual
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(_) => Err(InferenceError::SchemaError(format!(
                "column '{name}' is text, expected numeric"
            ))),
        }
    }

    /// Text cells of a column; fails if the column is absent or numeric
    pub fn text(&self, name: &str) -> Result<&[Option<String>]> {
        match &self.column(name)?.data {
            ColumnData::Text(values) => Ok(values),
            ColumnData::Numeric(_) => Err(InferenceError::SchemaError(format!(
                "column '{name}' is numeric, expected text"
            ))),
        }
    }

    /// Single cell, `None` when the cell is missing
    pub fn value(&self, row: usize, name: &str) -> Result<Option<Scalar<'_>>> {
        if row >= self.rows {
            return Err(InferenceError::InvalidParameter(format!(
                "row {row} out of range for table with {} rows",
                self.rows
            )));
        }
        Ok(match &self.column(name)?.data {
            ColumnData::Numeric(values) => values[row].map(Scalar::Number),
            ColumnData::Text(values) => values[row].as_deref().map(Scalar::Text),
        })
    }

    /// Present (non-null, non-NaN) values of a numeric column, in row order
    pub fn sample(&self, name: &str) -> Result<Sample> {
        let values = self
            .numeric(name)?
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan());
        Ok(Sample::from_finite(values))
    }

    /// Whole numeric column with missing cells represented as NaN
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self
            .numeric(name)?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// New table holding the given rows, in the given order
    ///
    /// Indices must be in range; the filter engine only passes indices it
    /// enumerated from this table.
    pub fn select(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                data: column.data.take(indices),
            })
            .collect();

        Table {
            columns,
            index: self.index.clone(),
            rows: indices.len(),
        }
    }
}
