use std::fmt;
use std::num::ParseFloatError;

use thiserror::Error;

use crate::config::ConfigError;
use crate::dialect::IsolationLevel;
use crate::transaction::TransactionState;

/// Error returned by a [`DataService`](crate::traits::DataService) when the
/// remote call itself failed (network, auth, or backend-side error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub code: Option<String>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Error type for rdsrs operations
#[derive(Debug, Error)]
pub enum RdsRsError {
    #[error("Named and ordinal parameters cannot be mixed in one statement")]
    MixedParameterStyle,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),

    #[error("Unknown column type {0}")]
    UnknownColumnType(String),

    #[error("Unsupported column type {column_type}: {reason}")]
    UnsupportedType {
        column_type: String,
        reason: &'static str,
    },

    #[error("Failed to parse {column_type} value as a number")]
    NumericParse {
        column_type: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("Failed to parse date {value:?}")]
    DateParse {
        value: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("Column type {column_type} expects a {expected} field")]
    FieldMismatch {
        column_type: String,
        expected: &'static str,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Transaction {id} is {state}")]
    TransactionState { id: String, state: TransactionState },

    #[error("Isolation level {0} is not supported by this dialect")]
    UnsupportedIsolationLevel(IsolationLevel),

    #[error("No dialect for server version {0:?}")]
    UnsupportedDialect(String),

    #[error("Server did not report a version")]
    NoVersion,

    #[error("Context canceled")]
    Canceled,

    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Row has {values} value(s) for {columns} column(s)")]
    ColumnCountMismatch { columns: usize, values: usize },
}

/// Result type alias for rdsrs operations
pub type Result<T> = std::result::Result<T, RdsRsError>;
