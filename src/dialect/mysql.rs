use chrono::{Datelike, NaiveDate};

use crate::dialect::{translate, Dialect, FieldConverter, IsolationLevel, TranslatedQuery};
use crate::error::{RdsRsError, Result};
use crate::types::{Argument, Field, SqlValue};

/// Dialect for MySQL 5.7 compatible clusters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

const SUPPORTED_ISOLATION_LEVELS: &[IsolationLevel] = &[
    IsolationLevel::Default,
    IsolationLevel::RepeatableRead,
    IsolationLevel::ReadCommitted,
    IsolationLevel::ReadUncommitted,
    IsolationLevel::Serializable,
];

const FIELD_CONVERTERS: &[(&str, FieldConverter)] = &[
    ("TINYINT UNSIGNED", unsigned),
    ("SMALLINT UNSIGNED", unsigned),
    ("MEDIUMINT UNSIGNED", unsigned),
    ("INT UNSIGNED", unsigned),
    ("BIGINT UNSIGNED", unsigned),
    ("TINYINT", signed),
    ("SMALLINT", signed),
    ("MEDIUMINT", signed),
    ("INT", signed),
    ("BIGINT", signed),
    ("DECIMAL", decimal),
    ("FLOAT", double),
    ("DOUBLE", double),
    ("BIT", bit),
    ("TINYTEXT", text),
    ("TEXT", text),
    ("MEDIUMTEXT", text),
    ("LONGTEXT", text),
    ("CHAR", text),
    ("VARCHAR", text),
    ("DATE", text),
    ("TIME", text),
    ("DATETIME", text),
    ("TIMESTAMP", text),
    ("BINARY", blob),
    ("VARBINARY", blob),
    ("TINYBLOB", blob),
    ("BLOB", blob),
    ("MEDIUMBLOB", blob),
    ("LONGBLOB", blob),
    ("YEAR", year),
];

impl MySqlDialect {
    /// MySQL and Aurora MySQL report versions like `5.7.12` or
    /// `8.0.23-mysql_aurora.3.02.0`.
    pub fn matches_version(version: &str) -> bool {
        version.starts_with(|c: char| c.is_ascii_digit())
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn migrate_query(&self, query: &str, args: &[Argument]) -> Result<TranslatedQuery> {
        translate(query, args, ':')
    }

    fn field_converter(&self, column_type: &str) -> Option<FieldConverter> {
        FIELD_CONVERTERS
            .iter()
            .find(|(label, _)| *label == column_type)
            .map(|(_, convert)| *convert)
    }

    fn is_isolation_level_supported(&self, level: IsolationLevel) -> bool {
        SUPPORTED_ISOLATION_LEVELS.contains(&level)
    }
}

/// Read one slot of `field`. NULL reads as `None`; any other slot is a mismatch.
fn slot<'a, T>(
    column_type: &str,
    field: &'a Field,
    expected: &'static str,
    read: impl FnOnce(&'a Field) -> Option<T>,
) -> Result<Option<T>> {
    if field.is_null() {
        return Ok(None);
    }
    read(field)
        .map(Some)
        .ok_or_else(|| RdsRsError::FieldMismatch {
            column_type: column_type.to_string(),
            expected,
        })
}

fn unsigned(column_type: &str, field: &Field) -> Result<SqlValue> {
    let value = slot(column_type, field, "long", Field::long_value)?;
    Ok(value.map_or(SqlValue::Null, |v| SqlValue::UInt64(v as u64)))
}

fn signed(column_type: &str, field: &Field) -> Result<SqlValue> {
    let value = slot(column_type, field, "long", Field::long_value)?;
    Ok(value.map_or(SqlValue::Null, SqlValue::Int64))
}

fn decimal(column_type: &str, field: &Field) -> Result<SqlValue> {
    let Some(text) = slot(column_type, field, "string", Field::string_value)? else {
        return Ok(SqlValue::Null);
    };
    text.parse::<f64>()
        .map(SqlValue::Float64)
        .map_err(|source| RdsRsError::NumericParse {
            column_type: column_type.to_string(),
            source,
        })
}

fn double(column_type: &str, field: &Field) -> Result<SqlValue> {
    let value = slot(column_type, field, "double", Field::double_value)?;
    Ok(value.map_or(SqlValue::Null, SqlValue::Float64))
}

fn bit(column_type: &str, _field: &Field) -> Result<SqlValue> {
    Err(RdsRsError::UnsupportedType {
        column_type: column_type.to_string(),
        reason: "BIT(M) and BOOLEAN are not correctly representable from this backend",
    })
}

fn text(column_type: &str, field: &Field) -> Result<SqlValue> {
    let value = slot(column_type, field, "string", Field::string_value)?;
    Ok(value.map_or(SqlValue::Null, |s| SqlValue::Text(s.to_string())))
}

fn blob(column_type: &str, field: &Field) -> Result<SqlValue> {
    let value = slot(column_type, field, "blob", Field::blob_value)?;
    Ok(value.map_or(SqlValue::Null, |b| SqlValue::Bytes(b.to_vec())))
}

/// The backend sends YEAR columns as a zero-padded `YYYY-MM-DD` date; only
/// the year is kept.
fn year(column_type: &str, field: &Field) -> Result<SqlValue> {
    let Some(text) = slot(column_type, field, "string", Field::string_value)? else {
        return Ok(SqlValue::Null);
    };
    let date_error = |source| RdsRsError::DateParse {
        value: text.to_string(),
        source,
    };
    // chrono alone would also take `+2023-06-15` or `2023-6-5`.
    if !is_padded_date(text) {
        return Err(date_error(None));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| date_error(Some(e)))?;
    Ok(SqlValue::Text(date.year().to_string()))
}

fn is_padded_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
