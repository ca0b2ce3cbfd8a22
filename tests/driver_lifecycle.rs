use std::sync::Arc;
use std::time::Duration;

use rdsrs::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedCall};
use rdsrs::error::{RdsRsError, TransportError};
use rdsrs::traits::DataService;
use rdsrs::types::wire::{ExecuteStatementResponse, Target};
use rdsrs::types::{Argument, Field, Parameter, SqlValue};
use rdsrs::{
    AccessModePolicy, Config, Connection, Connector, Context, IsolationLevel, TransactionState,
    TxOptions, WakeupRetry, WAKEUP_SQL,
};
use tokio_util::sync::CancellationToken;

fn config() -> Config {
    Config::new("arn:resource", "arn:secret", "app", "us-east-1")
}

fn version(v: &str) -> ExecuteStatementResponse {
    InMemoryTestResponseBuilder::new()
        .row(vec![Field::String(v.into())])
        .build()
}

/// Opens a connection against `driver`, whose first queued response must be
/// the wakeup answer. Recorded calls are cleared afterwards.
async fn open(driver: &Arc<InMemoryTestDriver>) -> Connection {
    let service: Arc<dyn DataService> = Arc::clone(driver) as Arc<dyn DataService>;
    let conn = Connection::open(&Context::background(), service, Arc::new(config()))
        .await
        .unwrap();
    driver.clear_recorded_calls();
    conn
}

fn driver_with(responses: Vec<ExecuteStatementResponse>) -> Arc<InMemoryTestDriver> {
    Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_responses(responses),
    )
}

#[tokio::test]
async fn test_open_wakes_cluster_and_selects_dialect() {
    let driver = driver_with(vec![]);
    let service: Arc<dyn DataService> = Arc::clone(&driver) as Arc<dyn DataService>;
    let conn = Connection::open(&Context::background(), service, Arc::new(config()))
        .await
        .unwrap();

    assert_eq!(conn.server_version(), "5.7.12");
    assert_eq!(conn.dialect().name(), "mysql");
    driver.assert_last_statement(WAKEUP_SQL, &[]);
    driver.assert_call_count(1);
}

#[tokio::test]
async fn test_open_rejects_unknown_backend() {
    let driver = Arc::new(InMemoryTestDriver::new().with_response(version("PostgreSQL 13.7")));
    let err = Connection::open(&Context::background(), driver, Arc::new(config()))
        .await
        .unwrap_err();
    assert!(matches!(err, RdsRsError::UnsupportedDialect(_)));
}

#[tokio::test]
async fn test_open_rejects_incomplete_config_before_any_call() {
    let driver = driver_with(vec![]);
    let service: Arc<dyn DataService> = Arc::clone(&driver) as Arc<dyn DataService>;
    let conf = Config::new("arn:resource", "", "app", "us-east-1");
    let err = Connection::open(&Context::background(), service, Arc::new(conf))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RdsRsError::Config(rdsrs::ConfigError::Missing("secret_arn"))
    ));
    driver.assert_call_count(0);
}

#[tokio::test]
async fn test_connector_retries_wakeup_when_asked() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_statement_error(TransportError::new("Communications link failure"))
            .with_response(version("8.0.23")),
    );
    let service: Arc<dyn DataService> = Arc::clone(&driver) as Arc<dyn DataService>;

    let err = Connector::new(config(), Arc::clone(&service))
        .connect(&Context::background())
        .await
        .unwrap_err();
    assert!(matches!(err, RdsRsError::Transport(_)));

    let conn = Connector::new(config(), service)
        .with_wakeup_retry(WakeupRetry::new(2, Duration::from_millis(1)))
        .connect(&Context::background())
        .await
        .unwrap();
    assert_eq!(conn.server_version(), "8.0.23");
}

#[tokio::test]
async fn test_ordinal_query_is_rewritten() {
    let driver = driver_with(vec![InMemoryTestResponseBuilder::new()
        .columns(&[("name", "VARCHAR")])
        .text_row(&["Alice"])
        .build()]);
    let conn = open(&driver).await;

    let result = conn
        .query(
            &Context::background(),
            "SELECT ? FROM ? WHERE id = ?",
            &Argument::positional(["name", "my_table", "unique_id"]),
        )
        .await
        .unwrap();

    driver.assert_last_statement(
        "SELECT :1 FROM :2 WHERE id = :3",
        &[
            Parameter::new("1", "name"),
            Parameter::new("2", "my_table"),
            Parameter::new("3", "unique_id"),
        ],
    );
    let request = driver.last_statement().unwrap();
    assert!(request.include_result_metadata);
    assert_eq!(request.transaction_id, None);
    assert_eq!(request.target, Target::new("arn:resource", "arn:secret", "app"));

    let row = result.single_row().unwrap();
    assert_eq!(row.get("name").unwrap(), &SqlValue::Text("Alice".into()));
}

#[tokio::test]
async fn test_named_query_passes_through() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;
    let query = "SELECT :field FROM :table WHERE id = :id";

    conn.query(
        &Context::background(),
        query,
        &[
            Argument::named("field", "name"),
            Argument::named("table", "my_table"),
            Argument::named("id", "unique_id"),
        ],
    )
    .await
    .unwrap();

    driver.assert_last_statement(
        query,
        &[
            Parameter::new("field", "name"),
            Parameter::new("table", "my_table"),
            Parameter::new("id", "unique_id"),
        ],
    );
}

#[tokio::test]
async fn test_mixed_arguments_never_reach_the_service() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;

    let err = conn
        .execute(
            &Context::background(),
            "SELECT ? FROM :table",
            &[Argument::ordinal(1, "name"), Argument::named("table", "t")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RdsRsError::MixedParameterStyle));
    driver.assert_call_count(0);
}

#[tokio::test]
async fn test_query_converts_typed_fields() {
    let driver = driver_with(vec![InMemoryTestResponseBuilder::new()
        .columns(&[
            ("id", "BIGINT UNSIGNED"),
            ("balance", "DECIMAL"),
            ("born", "YEAR"),
            ("avatar", "BLOB"),
            ("nickname", "VARCHAR"),
        ])
        .row(vec![
            Field::Long(7),
            Field::String("10.25".into()),
            Field::String("1990-01-01".into()),
            Field::Blob(vec![1, 2, 3]),
            Field::Null,
        ])
        .build()]);
    let conn = open(&driver).await;

    let row = conn
        .query(&Context::background(), "SELECT * FROM users", &[])
        .await
        .unwrap()
        .single_row()
        .unwrap();

    assert_eq!(row.get("id").unwrap(), &SqlValue::UInt64(7));
    assert_eq!(row.get("balance").unwrap(), &SqlValue::Float64(10.25));
    assert_eq!(row.get("born").unwrap(), &SqlValue::Text("1990".into()));
    assert_eq!(row.get("avatar").unwrap(), &SqlValue::Bytes(vec![1, 2, 3]));
    assert!(row.get("nickname").unwrap().is_null());
}

#[tokio::test]
async fn test_query_with_bit_column_fails() {
    let driver = driver_with(vec![InMemoryTestResponseBuilder::new()
        .columns(&[("flag", "BIT")])
        .row(vec![Field::Boolean(true)])
        .build()]);
    let conn = open(&driver).await;

    let err = conn
        .query(&Context::background(), "SELECT flag FROM t", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, RdsRsError::UnsupportedType { .. }));
}

#[tokio::test]
async fn test_execute_reports_affected_rows() {
    let driver = driver_with(vec![InMemoryTestResponseBuilder::new()
        .records_updated(1)
        .generated_key(1001)
        .build()]);
    let conn = open(&driver).await;

    let result = conn
        .execute(
            &Context::background(),
            "INSERT INTO users (name) VALUES (?)",
            &Argument::positional(["Bob"]),
        )
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_insert_id, Some(1001));
    assert!(!driver.last_statement().unwrap().include_result_metadata);
}

#[tokio::test]
async fn test_transaction_commit_lifecycle() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;
    let ctx = Context::background();

    let tx = conn.begin(&ctx).await.unwrap();
    assert_eq!(tx.state(), TransactionState::Open);
    assert_eq!(tx.id(), "tx-1");
    assert_eq!(tx.handle().database, "app");

    tx.execute(&ctx, "DELETE FROM t WHERE id = ?", &Argument::positional([1]))
        .await
        .unwrap();
    assert_eq!(
        driver.last_statement().unwrap().transaction_id.as_deref(),
        Some("tx-1")
    );

    tx.commit(&ctx).await.unwrap();
    assert_eq!(tx.state(), TransactionState::Committed);

    let calls = driver.recorded_calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(&calls[0], RecordedCall::Begin(req) if req.target.database == "app"));
    assert!(matches!(&calls[2], RecordedCall::Commit(req) if req.transaction_id == "tx-1"));

    // Nothing may run against an ended transaction.
    let err = tx.execute(&ctx, "SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(
        err,
        RdsRsError::TransactionState {
            state: TransactionState::Committed,
            ..
        }
    ));
    assert!(tx.commit(&ctx).await.is_err());
    assert!(tx.rollback(&ctx).await.is_err());
    driver.assert_call_count(3);
}

#[tokio::test]
async fn test_query_inside_transaction_requests_metadata() {
    let driver = driver_with(vec![InMemoryTestResponseBuilder::new()
        .columns(&[("name", "VARCHAR")])
        .text_row(&["Alice"])
        .build()]);
    let conn = open(&driver).await;
    let ctx = Context::background();

    let tx = conn.begin(&ctx).await.unwrap();
    let rows = tx
        .query(&ctx, "SELECT name FROM users WHERE id = ?", &Argument::positional([1]))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows.single_row().unwrap().get("name").unwrap(),
        &SqlValue::Text("Alice".into())
    );

    let request = driver.last_statement().unwrap();
    assert_eq!(request.sql, "SELECT name FROM users WHERE id = :1");
    assert_eq!(request.transaction_id.as_deref(), Some("tx-1"));
    assert!(request.include_result_metadata);
    let wire: Vec<Field> = request.parameters.iter().map(Parameter::field).collect();
    assert_eq!(wire, vec![Field::Long(1)]);
}

#[tokio::test]
async fn test_prepared_statement_on_connection_runs_outside_transaction() {
    let driver = driver_with(vec![InMemoryTestResponseBuilder::new()
        .columns(&[("id", "BIGINT")])
        .row(vec![Field::Long(9)])
        .build()]);
    let conn = open(&driver).await;
    let ctx = Context::background();

    let stmt = conn.prepare("SELECT id FROM users WHERE name = :name");
    assert_eq!(stmt.sql(), "SELECT id FROM users WHERE name = :name");
    assert_eq!(stmt.transaction_id(), None);

    let rows = stmt
        .query(&ctx, &[Argument::named("name", "Bob")])
        .await
        .unwrap();
    assert_eq!(
        rows.single_row().unwrap().get("id").unwrap(),
        &SqlValue::Int64(9)
    );

    let request = driver.last_statement().unwrap();
    assert_eq!(request.transaction_id, None);
    assert!(request.include_result_metadata);
    driver.assert_last_statement(
        "SELECT id FROM users WHERE name = :name",
        &[Parameter::new("name", "Bob")],
    );

    // Each run is an independent call.
    stmt.execute(&ctx, &[Argument::named("name", "Eve")])
        .await
        .unwrap();
    driver.assert_call_count(2);
}

#[tokio::test]
async fn test_rollback_ends_prepared_statements_too() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_transaction_id("AQC5SRDIm"),
    );
    let conn = open(&driver).await;
    let ctx = Context::background();

    let tx = conn.begin(&ctx).await.unwrap();
    let stmt = tx.prepare("UPDATE t SET n = n + 1");
    assert_eq!(stmt.transaction_id(), Some("AQC5SRDIm"));
    stmt.execute(&ctx, &[]).await.unwrap();

    tx.rollback(&ctx).await.unwrap();
    assert_eq!(tx.state(), TransactionState::RolledBack);

    let err = stmt.execute(&ctx, &[]).await.unwrap_err();
    assert!(matches!(err, RdsRsError::TransactionState { .. }));
    assert!(matches!(
        driver.recorded_calls().last(),
        Some(RecordedCall::Rollback(req)) if req.transaction_id == "AQC5SRDIm"
    ));
}

#[tokio::test]
async fn test_failed_commit_still_ends_transaction() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_end_error(TransportError::with_code("NotFoundException", "Transaction is not found")),
    );
    let conn = open(&driver).await;
    let ctx = Context::background();

    let tx = conn.begin(&ctx).await.unwrap();
    let err = tx.commit(&ctx).await.unwrap_err();
    assert!(matches!(err, RdsRsError::Transport(e) if e.code.as_deref() == Some("NotFoundException")));
    assert_eq!(tx.state(), TransactionState::Committed);
    assert!(matches!(
        tx.rollback(&ctx).await,
        Err(RdsRsError::TransactionState { .. })
    ));
}

#[tokio::test]
async fn test_isolation_level_statement_runs_first() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;
    let ctx = Context::background();

    let tx = conn
        .begin_tx(&ctx, TxOptions::new(IsolationLevel::RepeatableRead, false))
        .await
        .unwrap();

    driver.assert_call_count(2);
    driver.assert_last_statement(
        "SET TRANSACTION ISOLATION LEVEL :isolation, :readonly",
        &[
            Parameter::new("isolation", "REPEATABLE READ"),
            Parameter::new("readonly", "READ WRITE"),
        ],
    );
    assert_eq!(
        driver.last_statement().unwrap().transaction_id.as_deref(),
        Some(tx.id())
    );
}

#[tokio::test]
async fn test_read_only_access_mode_policies() {
    let ctx = Context::background();
    let options = TxOptions::new(IsolationLevel::Serializable, true);

    let driver = driver_with(vec![]);
    let conn = open(&driver).await;
    conn.begin_tx(&ctx, options).await.unwrap();
    let request = driver.last_statement().unwrap();
    assert_eq!(request.parameters[1], Parameter::new("readonly", "READ ONLY"));

    let driver = Arc::new(InMemoryTestDriver::new().with_response(version("5.7.12")));
    let service: Arc<dyn DataService> = Arc::clone(&driver) as Arc<dyn DataService>;
    let conn = Connector::new(config(), service)
        .with_access_mode(AccessModePolicy::AlwaysReadWrite)
        .connect(&ctx)
        .await
        .unwrap();
    conn.begin_tx(&ctx, options).await.unwrap();
    let request = driver.last_statement().unwrap();
    assert_eq!(request.parameters[1], Parameter::new("readonly", "READ WRITE"));
}

#[tokio::test]
async fn test_default_isolation_issues_no_statement() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;

    conn.begin_tx(&Context::background(), TxOptions::new(IsolationLevel::Default, true))
        .await
        .unwrap();
    driver.assert_call_count(1);
}

#[tokio::test]
async fn test_unsupported_isolation_is_rejected_before_any_call() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;

    let err = conn
        .begin_tx(&Context::background(), TxOptions::new(IsolationLevel::Snapshot, false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RdsRsError::UnsupportedIsolationLevel(IsolationLevel::Snapshot)
    ));
    driver.assert_call_count(0);
}

#[tokio::test]
async fn test_begin_failures_surface() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_begin_error(TransportError::new("throttled")),
    );
    let conn = open(&driver).await;
    let err = conn.begin(&Context::background()).await.unwrap_err();
    assert!(matches!(err, RdsRsError::Transport(e) if e.message == "throttled"));

    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_statement_error(TransportError::new("bad isolation")),
    );
    let conn = open(&driver).await;
    let err = conn
        .begin_tx(
            &Context::background(),
            TxOptions::new(IsolationLevel::ReadCommitted, false),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RdsRsError::Transport(e) if e.message == "bad isolation"));
}

#[tokio::test]
async fn test_canceled_context_issues_no_call() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;
    let token = CancellationToken::new();
    token.cancel();
    let ctx = Context::with_cancel(token);

    let err = conn.execute(&ctx, "SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, RdsRsError::Canceled));
    assert!(matches!(conn.begin(&ctx).await, Err(RdsRsError::Canceled)));
    driver.assert_call_count(0);
}

#[tokio::test]
async fn test_canceled_commit_keeps_transaction_open() {
    let driver = driver_with(vec![]);
    let conn = open(&driver).await;
    let tx = conn.begin(&Context::background()).await.unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let err = tx.commit(&Context::with_cancel(token)).await.unwrap_err();
    assert!(matches!(err, RdsRsError::Canceled));
    assert_eq!(tx.state(), TransactionState::Open);

    tx.rollback(&Context::background()).await.unwrap();
    assert_eq!(tx.state(), TransactionState::RolledBack);
}

#[tokio::test]
async fn test_deadline_stops_waiting_for_slow_call() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_latency(Duration::from_millis(200)),
    );
    let conn = open(&driver).await;

    let ctx = Context::background().with_timeout(Duration::from_millis(20));
    let err = conn.execute(&ctx, "SELECT SLEEP(1)", &[]).await.unwrap_err();
    assert!(matches!(err, RdsRsError::DeadlineExceeded));
    // The call was dispatched; only the wait was abandoned.
    driver.assert_call_count(1);
}

#[tokio::test]
async fn test_commit_is_sent_even_when_deadline_passes_mid_call() {
    let driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(version("5.7.12"))
            .with_latency(Duration::from_millis(200)),
    );
    let conn = open(&driver).await;
    let tx = conn.begin(&Context::background()).await.unwrap();
    driver.clear_recorded_calls();

    let ctx = Context::background().with_timeout(Duration::from_millis(20));
    let err = tx.commit(&ctx).await.unwrap_err();
    assert!(matches!(err, RdsRsError::DeadlineExceeded));
    assert_eq!(tx.state(), TransactionState::Committed);
    assert!(matches!(
        driver.recorded_calls().as_slice(),
        [RecordedCall::Commit(req)] if req.transaction_id == "tx-1"
    ));
}

#[tokio::test]
async fn test_ping_reissues_wakeup() {
    let driver = driver_with(vec![version("5.7.12")]);
    let conn = open(&driver).await;

    conn.ping(&Context::background()).await.unwrap();
    driver.assert_last_statement(WAKEUP_SQL, &[]);
    assert_eq!(driver.last_statement().unwrap().transaction_id, None);
}
