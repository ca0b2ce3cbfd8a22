//! Database-flavor specific behavior: placeholder syntax, result field
//! conversion, and supported transaction isolation levels.

mod isolation;
mod mysql;
mod translator;

use std::fmt;
use std::sync::Arc;

use crate::error::{RdsRsError, Result};
use crate::types::{Argument, Field, SqlValue};

pub use isolation::IsolationLevel;
pub use mysql::MySqlDialect;
pub use translator::{translate, TranslatedQuery};

/// Converts one wire field of the given column type into a native value.
pub type FieldConverter = fn(column_type: &str, field: &Field) -> Result<SqlValue>;

/// A capability bundle for one backend flavor.
///
/// Dialects are stateless and selected once per connection.
pub trait Dialect: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrite a caller query and its arguments into wire form.
    fn migrate_query(&self, query: &str, args: &[Argument]) -> Result<TranslatedQuery>;

    /// Look up the converter registered for a column type label.
    /// Labels are matched exactly.
    fn field_converter(&self, column_type: &str) -> Option<FieldConverter>;

    fn is_isolation_level_supported(&self, level: IsolationLevel) -> bool;

    /// Convert a result field using its column's declared type.
    ///
    /// Unregistered type labels always fail, even for NULL fields.
    fn field_to_native(&self, column_type: &str, field: &Field) -> Result<SqlValue> {
        let convert = self
            .field_converter(column_type)
            .ok_or_else(|| RdsRsError::UnknownColumnType(column_type.to_string()))?;
        convert(column_type, field)
    }
}

/// Pick a dialect from the version string reported by the wakeup probe.
pub fn select_dialect(version: &str) -> Result<Arc<dyn Dialect>> {
    if MySqlDialect::matches_version(version) {
        return Ok(Arc::new(MySqlDialect));
    }
    Err(RdsRsError::UnsupportedDialect(version.to_string()))
}
