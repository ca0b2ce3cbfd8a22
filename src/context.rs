use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{RdsRsError, Result};

/// Cancellation and deadline carried into every driver call.
///
/// The remote protocol has no mid-flight cancel, so a context that fires while
/// a call is outstanding only stops the caller from waiting for it. The
/// statement may still complete server-side.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set a deadline. An earlier deadline already on the context wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is already done.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(RdsRsError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(RdsRsError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Check the context, then wait for `fut` unless the context fires first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => out,
        }
    }

    /// Wait for a call the caller has already committed to sending.
    ///
    /// `fut` is polled before the context is consulted, so the call is
    /// always dispatched even if the context fired after the last check.
    pub async fn run_dispatched<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            out = fut => out,
            err = self.done() => Err(err),
        }
    }

    async fn done(&self) -> RdsRsError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => RdsRsError::Canceled,
            _ = deadline => RdsRsError::DeadlineExceeded,
        }
    }
}
