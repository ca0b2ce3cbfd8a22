use std::sync::Arc;

use crate::config::Config;
use crate::connection::Connection;
use crate::context::Context;
use crate::error::Result;
use crate::traits::DataService;
use crate::transaction::AccessModePolicy;
use crate::wakeup::WakeupRetry;

/// Main entry point for rdsrs.
/// Holds the configuration and service handle and opens connections from them.
#[derive(Clone)]
pub struct Connector {
    service: Arc<dyn DataService>,
    config: Arc<Config>,
    retry: WakeupRetry,
    access_mode: AccessModePolicy,
}

impl Connector {
    /// Create a connector for the given configuration and service.
    ///
    /// # Example
    /// ```ignore
    /// let conf = Config::from_dsn(&dsn)?;
    /// let connector = Connector::new(conf, Arc::new(service));
    /// let conn = connector.connect(&Context::background()).await?;
    /// ```
    pub fn new(config: Config, service: Arc<dyn DataService>) -> Self {
        Self {
            service,
            config: Arc::new(config),
            retry: WakeupRetry::once(),
            access_mode: AccessModePolicy::default(),
        }
    }

    /// Retry the wakeup probe while the cluster resumes.
    pub fn with_wakeup_retry(mut self, retry: WakeupRetry) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_access_mode(mut self, access_mode: AccessModePolicy) -> Self {
        self.access_mode = access_mode;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a new connection, waking the cluster first.
    pub async fn connect(&self, ctx: &Context) -> Result<Connection> {
        Connection::open_with(
            ctx,
            Arc::clone(&self.service),
            Arc::clone(&self.config),
            self.retry,
            self.access_mode,
        )
        .await
    }
}
