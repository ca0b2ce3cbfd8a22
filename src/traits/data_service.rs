use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::wire::{
    BeginTransactionRequest, BeginTransactionResponse, EndTransactionRequest,
    EndTransactionResponse, ExecuteStatementRequest, ExecuteStatementResponse,
};

/// Trait for the remote statement service.
/// Implementations are responsible for:
/// - Authenticating and addressing the configured cluster
/// - Encoding requests and decoding responses for the wire
/// - Reporting any failure of the call itself as a [`TransportError`]
///
/// Each method is exactly one remote call. The driver never retries.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Execute one SQL statement, optionally inside a transaction.
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, TransportError>;

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, TransportError>;

    async fn commit_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, TransportError>;

    async fn rollback_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, TransportError>;
}
