use std::sync::Arc;

use crate::dialect::Dialect;
use crate::error::{RdsRsError, Result};
use crate::types::wire::ExecuteStatementResponse;
use crate::types::{Field, SqlValue};

/// A single row result from a query.
/// Values are converted to native values and accessed by column name or index.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Gets a value by column name. The first matching column wins.
    pub fn get(&self, column: &str) -> Result<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
            .ok_or_else(|| RdsRsError::ColumnNotFound(column.to_string()))
    }

    /// Gets a value by zero-based column position.
    pub fn get_index(&self, index: usize) -> Result<&SqlValue> {
        self.values
            .get(index)
            .ok_or_else(|| RdsRsError::ColumnNotFound(format!("#{index}")))
    }

    /// Returns all column names in this row, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Converts a raw response using the dialect's field converters.
    ///
    /// Each field is converted according to the type label of its column.
    pub fn from_response(response: ExecuteStatementResponse, dialect: &dyn Dialect) -> Result<Self> {
        let columns: Arc<[String]> = response
            .column_metadata
            .iter()
            .map(|c| c.name.clone())
            .collect();

        let rows = response
            .records
            .into_iter()
            .map(|record| {
                if record.len() != response.column_metadata.len() {
                    return Err(RdsRsError::ColumnCountMismatch {
                        columns: response.column_metadata.len(),
                        values: record.len(),
                    });
                }
                let values = record
                    .iter()
                    .zip(&response.column_metadata)
                    .map(|(field, meta)| dialect.field_to_native(&meta.type_name, field))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row::new(Arc::clone(&columns), values))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, rows })
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        let actual = self.rows.len();
        let mut rows = self.rows.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            _ => Err(RdsRsError::UnexpectedRowCount {
                expected: 1,
                actual,
            }),
        }
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// First generated key reported by the backend, if any.
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    pub fn from_response(response: &ExecuteStatementResponse) -> Self {
        Self {
            rows_affected: response.number_of_records_updated,
            last_insert_id: response.generated_fields.first().and_then(Field::long_value),
        }
    }
}
