use crate::types::SqlValue;

/// A single value as it travels over the wire.
///
/// Each variant is one slot of the service's field union. Result fields carry
/// exactly one populated slot; the column metadata says how to read it.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Long(i64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Field {
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn long_value(&self) -> Option<i64> {
        match self {
            Field::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn double_value(&self) -> Option<f64> {
        match self {
            Field::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn string_value(&self) -> Option<&str> {
        match self {
            Field::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn blob_value(&self) -> Option<&[u8]> {
        match self {
            Field::Blob(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&SqlValue> for Field {
    /// Unsigned values that do not fit the signed long slot are sent as their
    /// decimal text.
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null => Field::Null,
            SqlValue::Text(s) => Field::String(s.clone()),
            SqlValue::Int64(i) => Field::Long(*i),
            SqlValue::UInt64(u) => match i64::try_from(*u) {
                Ok(i) => Field::Long(i),
                Err(_) => Field::String(u.to_string()),
            },
            SqlValue::Float64(f) => Field::Double(*f),
            SqlValue::Bool(b) => Field::Boolean(*b),
            SqlValue::Bytes(b) => Field::Blob(b.clone()),
        }
    }
}

/// Result-set metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column label as reported by the backend.
    pub name: String,
    /// Declared type label, e.g. `BIGINT UNSIGNED` or `VARCHAR`.
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}
