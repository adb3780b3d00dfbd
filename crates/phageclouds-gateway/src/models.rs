//! Result models for gateway queries
//!
//! `QueryResult` is what a client returns (row-major, as it comes off the
//! wire). `Table` is the column-major view the pipeline reads from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of executing a read statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Tabular result rows
    pub records: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Create a result with the given columns and no rows
    pub fn with_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            records: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.records.push(row);
    }

    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows as column-name keyed maps
    pub fn rows(&self) -> impl Iterator<Item = IndexMap<&str, &Value>> + '_ {
        self.records.iter().map(move |row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }

    /// Convert into a column-major table
    pub fn into_table(self) -> Table {
        let rows = self.records.len();
        let mut columns: IndexMap<String, Vec<Value>> = self
            .columns
            .into_iter()
            .map(|c| (c, Vec::with_capacity(rows)))
            .collect();

        for row in self.records {
            let mut cells = row.into_iter();
            for column in columns.values_mut() {
                column.push(cells.next().unwrap_or(Value::Null));
            }
        }

        Table { columns, rows }
    }
}

/// Column-major tabular result. Missing fields are JSON null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Vec<Value>>,
    rows: usize,
}

impl Table {
    /// Table with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in result order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Raw column values, `None` if the column is absent
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Cell at (row, column); null when the column is absent
    pub fn cell(&self, row: usize, name: &str) -> &Value {
        self.columns
            .get(name)
            .and_then(|values| values.get(row))
            .unwrap_or(&Value::Null)
    }

    /// String cell, `None` for null or non-string values
    pub fn str_cell(&self, row: usize, name: &str) -> Option<&str> {
        self.cell(row, name).as_str()
    }

    /// Float cell, accepting any JSON number
    pub fn f64_cell(&self, row: usize, name: &str) -> Option<f64> {
        self.cell(row, name).as_f64()
    }

    /// Unsigned integer cell. Whole-valued floats are accepted since some
    /// stores hand integers back as doubles.
    pub fn u64_cell(&self, row: usize, name: &str) -> Option<u64> {
        let value = self.cell(row, name);
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
    }

    /// All non-null string values of a column
    pub fn str_column(&self, name: &str) -> Vec<&str> {
        self.column(name)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<QueryResult> for Table {
    fn from(result: QueryResult) -> Self {
        result.into_table()
    }
}
