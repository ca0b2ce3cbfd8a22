//! rdsrs - A SQL driver for connectionless, statement-at-a-time database services
//!
//! Each statement is a single remote call. Placeholders are translated to the
//! service's named form, result fields are converted with the dialect's type
//! table, and transactions are emulated with opaque transaction ids.
//!
//! # Example
//! ```ignore
//! use rdsrs::{Argument, Config, Connector, Context, IsolationLevel, TxOptions};
//!
//! let conf = Config::new(resource_arn, secret_arn, "mydb", "us-east-1");
//! let connector = Connector::new(conf, service);
//! let ctx = Context::background();
//! let conn = connector.connect(&ctx).await?;
//!
//! let row = conn
//!     .query(&ctx, "SELECT name FROM users WHERE id = ?", &Argument::positional([42]))
//!     .await?
//!     .single_row()?;
//! let name = row.get("name")?;
//!
//! let tx = conn
//!     .begin_tx(&ctx, TxOptions::new(IsolationLevel::Serializable, false))
//!     .await?;
//! tx.execute(&ctx, "UPDATE users SET name = :name WHERE id = :id", &[
//!     Argument::named("name", "Jane"),
//!     Argument::named("id", 42),
//! ])
//! .await?;
//! tx.commit(&ctx).await?;
//! ```

pub mod config;
pub mod context;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod traits;
pub mod types;
pub mod wakeup;

mod connection;
mod connector;
mod executor;
mod statement;
mod transaction;

// Re-export main types for convenient access
pub use config::{Config, ConfigBuilder, ConfigError};
pub use connection::Connection;
pub use connector::Connector;
pub use context::Context;
pub use dialect::{Dialect, IsolationLevel, MySqlDialect};
pub use error::{RdsRsError, Result, TransportError};
pub use statement::Statement;
pub use traits::DataService;
pub use transaction::{AccessModePolicy, Transaction, TransactionHandle, TransactionState, TxOptions};
pub use types::{Argument, ExecResult, Field, Parameter, QueryResult, Row, SqlValue};
pub use wakeup::{wakeup, WakeupRetry, WAKEUP_SQL};
