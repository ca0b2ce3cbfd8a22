//! Request and response shapes for the remote statement service.

use crate::config::Config;
use crate::types::{ColumnMetadata, Field, Parameter};

/// Identifies the target cluster, credentials, and database for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
}

impl Target {
    pub fn new(
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
        }
    }
}

impl From<&Config> for Target {
    fn from(conf: &Config) -> Self {
        Self::new(&conf.resource_arn, &conf.secret_arn, &conf.database)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteStatementRequest {
    pub target: Target,
    pub sql: String,
    pub parameters: Vec<Parameter>,
    pub transaction_id: Option<String>,
    pub include_result_metadata: bool,
}

impl ExecuteStatementRequest {
    pub fn new(target: Target, sql: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            target,
            sql: sql.into(),
            parameters,
            transaction_id: None,
            include_result_metadata: false,
        }
    }

    pub fn in_transaction(mut self, transaction_id: Option<&str>) -> Self {
        self.transaction_id = transaction_id.map(str::to_string);
        self
    }

    pub fn with_result_metadata(mut self) -> Self {
        self.include_result_metadata = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteStatementResponse {
    pub records: Vec<Vec<Field>>,
    pub column_metadata: Vec<ColumnMetadata>,
    pub number_of_records_updated: u64,
    pub generated_fields: Vec<Field>,
}

impl ExecuteStatementResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginTransactionRequest {
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginTransactionResponse {
    pub transaction_id: String,
}

/// Commit and rollback both name the transaction and its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTransactionRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTransactionResponse {
    pub transaction_status: String,
}
