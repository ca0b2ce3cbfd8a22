use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::context::Context;
use crate::dialect::{select_dialect, Dialect};
use crate::error::Result;
use crate::executor::Executor;
use crate::statement::Statement;
use crate::traits::DataService;
use crate::transaction::{AccessModePolicy, Transaction, TxOptions};
use crate::types::wire::Target;
use crate::types::{Argument, ExecResult, QueryResult};
use crate::wakeup::{wakeup, WakeupRetry};

/// A logical connection to the remote statement service.
///
/// No socket is held. Opening a connection wakes the cluster and selects a
/// dialect from the reported version; afterwards every operation is one
/// independent remote call.
pub struct Connection {
    executor: Executor,
    server_version: String,
    access_mode: AccessModePolicy,
}

impl Connection {
    /// Wake the cluster once and open a connection with default settings.
    pub async fn open(
        ctx: &Context,
        service: Arc<dyn DataService>,
        config: Arc<Config>,
    ) -> Result<Self> {
        Self::open_with(
            ctx,
            service,
            config,
            WakeupRetry::once(),
            AccessModePolicy::default(),
        )
        .await
    }

    pub(crate) async fn open_with(
        ctx: &Context,
        service: Arc<dyn DataService>,
        config: Arc<Config>,
        retry: WakeupRetry,
        access_mode: AccessModePolicy,
    ) -> Result<Self> {
        config.validate()?;
        let target = Target::from(config.as_ref());
        let server_version = retry.run(ctx, service.as_ref(), &target).await?;
        let dialect = select_dialect(&server_version)?;
        debug!(
            database = %config.database,
            version = %server_version,
            dialect = dialect.name(),
            "connection opened"
        );
        Ok(Self {
            executor: Executor::new(service, config, dialect),
            server_version,
            access_mode,
        })
    }

    /// Version reported by the wakeup probe when the connection was opened.
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    pub fn config(&self) -> &Config {
        self.executor.config()
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.executor.dialect()
    }

    /// Re-issue the wakeup probe.
    pub async fn ping(&self, ctx: &Context) -> Result<()> {
        let conf = self.executor.config();
        wakeup(
            ctx,
            self.executor.service(),
            &conf.resource_arn,
            &conf.secret_arn,
            &conf.database,
        )
        .await
        .map(|_| ())
    }

    /// Execute a statement that does not return rows.
    pub async fn execute(&self, ctx: &Context, query: &str, args: &[Argument]) -> Result<ExecResult> {
        self.executor.exec(ctx, query, args, None).await
    }

    /// Run a query and convert its rows with the connection's dialect.
    pub async fn query(&self, ctx: &Context, query: &str, args: &[Argument]) -> Result<QueryResult> {
        self.executor.query(ctx, query, args, None).await
    }

    pub fn prepare(&self, query: impl Into<String>) -> Statement {
        Statement::new(self.executor.clone(), query.into(), None)
    }

    /// Begin a transaction with the server's default isolation level.
    pub async fn begin(&self, ctx: &Context) -> Result<Transaction> {
        self.begin_tx(ctx, TxOptions::default()).await
    }

    pub async fn begin_tx(&self, ctx: &Context, options: TxOptions) -> Result<Transaction> {
        Transaction::begin(ctx, self.executor.clone(), options, self.access_mode).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("database", &self.config().database)
            .field("server_version", &self.server_version)
            .field("dialect", &self.dialect().name())
            .field("access_mode", &self.access_mode)
            .finish()
    }
}
