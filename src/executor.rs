use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::Config;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{RdsRsError, Result};
use crate::traits::DataService;
use crate::types::wire::{ExecuteStatementRequest, ExecuteStatementResponse, Target};
use crate::types::{Argument, ExecResult, QueryResult};

/// The shared pieces every statement needs: where to send it, how to
/// translate it, and how to read the answer.
#[derive(Clone)]
pub(crate) struct Executor {
    service: Arc<dyn DataService>,
    config: Arc<Config>,
    dialect: Arc<dyn Dialect>,
}

impl Executor {
    pub(crate) fn new(
        service: Arc<dyn DataService>,
        config: Arc<Config>,
        dialect: Arc<dyn Dialect>,
    ) -> Self {
        Self {
            service,
            config,
            dialect,
        }
    }

    pub(crate) fn service(&self) -> &dyn DataService {
        self.service.as_ref()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub(crate) fn target(&self) -> Target {
        Target::from(self.config.as_ref())
    }

    /// Translate and send one statement. Exactly one remote call.
    pub(crate) async fn execute_statement(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Argument],
        transaction_id: Option<&str>,
        with_metadata: bool,
    ) -> Result<ExecuteStatementResponse> {
        let translated = self.dialect.migrate_query(query, args)?;
        let mut request =
            ExecuteStatementRequest::new(self.target(), translated.sql, translated.parameters)
                .in_transaction(transaction_id);
        if with_metadata {
            request = request.with_result_metadata();
        }

        debug!(
            database = %self.config.database,
            transaction_id = ?transaction_id,
            param_count = request.parameters.len(),
            "executing statement"
        );
        trace!(sql = %request.sql, "statement text");

        ctx.run(async {
            self.service
                .execute_statement(request)
                .await
                .map_err(RdsRsError::from)
        })
        .await
    }

    pub(crate) async fn exec(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Argument],
        transaction_id: Option<&str>,
    ) -> Result<ExecResult> {
        let response = self
            .execute_statement(ctx, query, args, transaction_id, false)
            .await?;
        Ok(ExecResult::from_response(&response))
    }

    pub(crate) async fn query(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Argument],
        transaction_id: Option<&str>,
    ) -> Result<QueryResult> {
        let response = self
            .execute_statement(ctx, query, args, transaction_id, true)
            .await?;
        QueryResult::from_response(response, self.dialect.as_ref())
    }
}
