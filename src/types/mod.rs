mod argument;
mod field;
mod row;
mod sql_value;
pub mod wire;

pub use argument::{Argument, Parameter};
pub use field::{ColumnMetadata, Field};
pub use row::{ExecResult, QueryResult, Row};
pub use sql_value::SqlValue;
