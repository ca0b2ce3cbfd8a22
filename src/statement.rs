use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::executor::Executor;
use crate::transaction::TransactionShared;
use crate::types::{Argument, ExecResult, QueryResult};

/// A statement prepared on a connection or inside a transaction.
///
/// Nothing is sent to the service until it is executed; each execution is
/// an independent remote call.
pub struct Statement {
    executor: Executor,
    query: String,
    transaction: Option<Arc<TransactionShared>>,
}

impl Statement {
    pub(crate) fn new(
        executor: Executor,
        query: String,
        transaction: Option<Arc<TransactionShared>>,
    ) -> Self {
        Self {
            executor,
            query,
            transaction,
        }
    }

    /// The query text as prepared, before placeholder translation.
    pub fn sql(&self) -> &str {
        &self.query
    }

    /// Id of the transaction this statement runs in, if any.
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_deref().map(TransactionShared::id)
    }

    /// Execute the statement and return the affected row count.
    pub async fn execute(&self, ctx: &Context, args: &[Argument]) -> Result<ExecResult> {
        let transaction_id = self.open_transaction_id()?;
        self.executor
            .exec(ctx, &self.query, args, transaction_id)
            .await
    }

    /// Execute the statement and return its rows.
    pub async fn query(&self, ctx: &Context, args: &[Argument]) -> Result<QueryResult> {
        let transaction_id = self.open_transaction_id()?;
        self.executor
            .query(ctx, &self.query, args, transaction_id)
            .await
    }

    fn open_transaction_id(&self) -> Result<Option<&str>> {
        match &self.transaction {
            Some(tx) => {
                tx.ensure_open()?;
                Ok(Some(tx.id()))
            }
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.query)
            .field("transaction_id", &self.transaction_id())
            .finish()
    }
}
