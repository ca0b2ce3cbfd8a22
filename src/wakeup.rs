use std::time::Duration;

use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{RdsRsError, Result};
use crate::traits::DataService;
use crate::types::wire::{ExecuteStatementRequest, Target};

/// Statement used to force a paused cluster to resume.
pub const WAKEUP_SQL: &str = "/* wakeup */ SELECT VERSION()";

/// Issue the wakeup probe once and return the reported server version.
///
/// Runs outside any transaction and without parameters. Transport errors are
/// returned unchanged.
pub async fn wakeup(
    ctx: &Context,
    service: &dyn DataService,
    resource_arn: &str,
    secret_arn: &str,
    database: &str,
) -> Result<String> {
    let request = ExecuteStatementRequest::new(
        Target::new(resource_arn, secret_arn, database),
        WAKEUP_SQL,
        Vec::new(),
    );
    debug!(database, "waking up cluster");

    let response = ctx
        .run(async {
            service
                .execute_statement(request)
                .await
                .map_err(RdsRsError::from)
        })
        .await?;

    response
        .records
        .first()
        .and_then(|record| record.first())
        .and_then(|field| field.string_value())
        .map(str::to_string)
        .ok_or(RdsRsError::NoVersion)
}

/// How many times a caller is willing to probe a sleeping cluster.
///
/// Only transport failures are retried; every other error ends the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupRetry {
    attempts: u32,
    delay: Duration,
}

impl WakeupRetry {
    /// Probe once and give up on failure.
    pub const fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Probe up to `attempts` times, sleeping `delay` between attempts.
    /// Zero attempts is treated as one.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub(crate) async fn run(
        &self,
        ctx: &Context,
        service: &dyn DataService,
        target: &Target,
    ) -> Result<String> {
        let mut attempt = 1;
        loop {
            let result = wakeup(
                ctx,
                service,
                &target.resource_arn,
                &target.secret_arn,
                &target.database,
            )
            .await;
            match result {
                Err(RdsRsError::Transport(err)) if attempt < self.attempts => {
                    warn!(attempt, error = %err, "wakeup failed, retrying");
                    attempt += 1;
                    let delay = self.delay;
                    ctx.run(async move {
                        tokio::time::sleep(delay).await;
                        Ok::<_, RdsRsError>(())
                    })
                    .await?;
                }
                other => return other,
            }
        }
    }
}

impl Default for WakeupRetry {
    fn default() -> Self {
        Self::once()
    }
}
