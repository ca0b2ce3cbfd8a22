use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::context::Context;
use crate::dialect::IsolationLevel;
use crate::error::{RdsRsError, Result};
use crate::executor::Executor;
use crate::statement::Statement;
use crate::types::wire::{BeginTransactionRequest, EndTransactionRequest};
use crate::types::{Argument, ExecResult, QueryResult};

const SET_ISOLATION_SQL: &str = "SET TRANSACTION ISOLATION LEVEL :isolation, :readonly";

/// Lifecycle of a transaction. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Committed,
    RolledBack,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionState::Open => "open",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
        })
    }
}

/// Which access mode is sent along with a non-default isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessModePolicy {
    /// `READ ONLY` for read-only transactions, `READ WRITE` otherwise.
    #[default]
    FromRequest,
    /// Always `READ WRITE`, ignoring the read-only flag.
    AlwaysReadWrite,
}

impl AccessModePolicy {
    pub fn access_mode(&self, read_only: bool) -> &'static str {
        match (self, read_only) {
            (AccessModePolicy::FromRequest, true) => "READ ONLY",
            _ => "READ WRITE",
        }
    }
}

/// Options for starting a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl TxOptions {
    pub fn new(isolation: IsolationLevel, read_only: bool) -> Self {
        Self {
            isolation,
            read_only,
        }
    }
}

/// The opaque identifier of an open remote transaction plus its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHandle {
    pub id: String,
    pub database: String,
    pub resource_arn: String,
    pub secret_arn: String,
}

#[derive(Debug)]
pub(crate) struct TransactionShared {
    handle: TransactionHandle,
    state: Mutex<TransactionState>,
}

impl TransactionShared {
    fn state(&self) -> TransactionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn id(&self) -> &str {
        &self.handle.id
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        match self.state() {
            TransactionState::Open => Ok(()),
            state => Err(self.state_error(state)),
        }
    }

    /// Move from `Open` to `next`, failing if the transaction already ended.
    fn finish(&self, next: TransactionState) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != TransactionState::Open {
            return Err(self.state_error(*state));
        }
        *state = next;
        Ok(())
    }

    fn state_error(&self, state: TransactionState) -> RdsRsError {
        RdsRsError::TransactionState {
            id: self.handle.id.clone(),
            state,
        }
    }
}

/// A logical transaction emulated on top of the connectionless service.
///
/// Every statement issued through a `Transaction` (or a [`Statement`] it
/// prepared) carries its id. Statements sharing one transaction must be
/// serialized by the caller.
pub struct Transaction {
    executor: Executor,
    shared: Arc<TransactionShared>,
}

impl Transaction {
    /// Begin a remote transaction and apply the requested isolation level.
    ///
    /// With a non-default isolation level a `SET TRANSACTION` statement runs
    /// inside the new transaction before this returns. If either call fails
    /// no handle is returned.
    pub(crate) async fn begin(
        ctx: &Context,
        executor: Executor,
        options: TxOptions,
        access_mode: AccessModePolicy,
    ) -> Result<Self> {
        if !executor
            .dialect()
            .is_isolation_level_supported(options.isolation)
        {
            return Err(RdsRsError::UnsupportedIsolationLevel(options.isolation));
        }

        let target = executor.target();
        let request = BeginTransactionRequest {
            target: target.clone(),
        };
        let response = ctx
            .run(async {
                executor
                    .service()
                    .begin_transaction(request)
                    .await
                    .map_err(RdsRsError::from)
            })
            .await?;
        debug!(
            database = %target.database,
            transaction_id = %response.transaction_id,
            isolation = %options.isolation,
            read_only = options.read_only,
            "transaction opened"
        );

        let handle = TransactionHandle {
            id: response.transaction_id,
            database: target.database,
            resource_arn: target.resource_arn,
            secret_arn: target.secret_arn,
        };
        let tx = Self {
            executor,
            shared: Arc::new(TransactionShared {
                handle,
                state: Mutex::new(TransactionState::Open),
            }),
        };

        if options.isolation != IsolationLevel::Default {
            let args = [
                Argument::named("isolation", options.isolation.as_sql()),
                Argument::named("readonly", access_mode.access_mode(options.read_only)),
            ];
            tx.executor
                .exec(ctx, SET_ISOLATION_SQL, &args, Some(tx.id()))
                .await?;
        }

        Ok(tx)
    }

    pub fn id(&self) -> &str {
        self.shared.id()
    }

    pub fn handle(&self) -> &TransactionHandle {
        &self.shared.handle
    }

    pub fn state(&self) -> TransactionState {
        self.shared.state()
    }

    /// Execute a statement that does not return rows inside this transaction.
    pub async fn execute(&self, ctx: &Context, query: &str, args: &[Argument]) -> Result<ExecResult> {
        self.shared.ensure_open()?;
        self.executor.exec(ctx, query, args, Some(self.id())).await
    }

    /// Run a query inside this transaction.
    pub async fn query(&self, ctx: &Context, query: &str, args: &[Argument]) -> Result<QueryResult> {
        self.shared.ensure_open()?;
        self.executor.query(ctx, query, args, Some(self.id())).await
    }

    /// Prepare a statement bound to this transaction.
    pub fn prepare(&self, query: impl Into<String>) -> Statement {
        Statement::new(
            self.executor.clone(),
            query.into(),
            Some(Arc::clone(&self.shared)),
        )
    }

    /// Commit the transaction.
    ///
    /// The transaction is ended even if the commit call fails.
    pub async fn commit(&self, ctx: &Context) -> Result<()> {
        self.end(ctx, TransactionState::Committed).await
    }

    /// Roll the transaction back.
    ///
    /// The transaction is ended even if the rollback call fails.
    pub async fn rollback(&self, ctx: &Context) -> Result<()> {
        self.end(ctx, TransactionState::RolledBack).await
    }

    async fn end(&self, ctx: &Context, next: TransactionState) -> Result<()> {
        self.shared.ensure_open()?;
        ctx.check()?;
        self.shared.finish(next)?;

        let handle = &self.shared.handle;
        let request = EndTransactionRequest {
            resource_arn: handle.resource_arn.clone(),
            secret_arn: handle.secret_arn.clone(),
            transaction_id: handle.id.clone(),
        };
        let service = self.executor.service();
        // The state is already terminal, so the call must go out.
        let result = ctx
            .run_dispatched(async {
                let response = match next {
                    TransactionState::Committed => service.commit_transaction(request).await,
                    _ => service.rollback_transaction(request).await,
                };
                response.map_err(RdsRsError::from)
            })
            .await;

        match &result {
            Ok(response) => debug!(
                transaction_id = %handle.id,
                status = %response.transaction_status,
                "transaction {}", next
            ),
            Err(err) => warn!(
                transaction_id = %handle.id,
                error = %err,
                "failed to end transaction; it is no longer usable"
            ),
        }
        result.map(|_| ())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}
