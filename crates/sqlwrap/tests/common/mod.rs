//! In-memory fake driver shared by the integration tests.
//!
//! The fake records every call it receives in a shared [`CallLog`] and can be
//! configured with [`Caps`] to implement any subset of the optional
//! capabilities.
//!
//! Query behavior:
//!
//! | Query text contains | Result |
//! |---------------------|--------|
//! | `select now()`      | one row, one `now` column holding [`fixed_now`] |
//! | `fail`              | backend error [`FakeError`] with code 42 |
//! | `empty`             | `users` columns, no rows |
//! | `bad conn`          | [`DriverError::BadConn`] |
//! | `skip`              | [`DriverError::Skip`] on the fast path |
//! | `broken_stmt`       | backend error from the prepared statement's query |
//! | anything else       | two result sets: `users` then `answer` |

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sqlwrap::driver::{
    Conn, ConnBeginTx, Connector, Driver, ExecResult, Execer, ExecerContext, NamedValue, Pinger,
    Queryer, QueryerContext, Rows, RowsColumnTypeDatabaseTypeName, RowsColumnTypeLength,
    RowsColumnTypePrecisionScale, RowsColumnTypeScanType, RowsNextResultSet, Stmt, Tx, TxOptions,
    Value, ValueKind,
};
use sqlwrap::{Context, DriverError, DriverResult};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Error type produced by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeError {
    pub code: u32,
}

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fake backend error {}", self.code)
    }
}

impl std::error::Error for FakeError {}

/// The `FakeError` inside a `DriverError::Backend`, if that is what `err` is.
pub fn fake_error(err: &DriverError) -> Option<&FakeError> {
    match err {
        DriverError::Backend(inner) => inner.downcast_ref::<FakeError>(),
        _ => None,
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap()
}

/// Shared log of calls received by the fake.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Optional capabilities the fake implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub begin_tx: bool,
    pub pinger: bool,
    pub execer: bool,
    pub execer_context: bool,
    pub queryer: bool,
    pub queryer_context: bool,
    pub column_metadata: bool,
    pub next_result_set: bool,
}

impl Caps {
    pub fn all() -> Self {
        Self {
            begin_tx: true,
            pinger: true,
            execer: true,
            execer_context: true,
            queryer: true,
            queryer_context: true,
            column_metadata: true,
            next_result_set: true,
        }
    }

    pub fn none() -> Self {
        Self {
            begin_tx: false,
            pinger: false,
            execer: false,
            execer_context: false,
            queryer: false,
            queryer_context: false,
            column_metadata: false,
            next_result_set: false,
        }
    }
}

// ── Driver / Connector ──

pub struct FakeDriver {
    pub caps: Caps,
    pub log: CallLog,
}

impl Driver for FakeDriver {
    fn name(&self) -> &str {
        "fake"
    }

    fn open(&self, dsn: &str) -> DriverResult<Box<dyn Conn>> {
        self.log.push(format!("open:{dsn}"));
        Ok(Box::new(FakeConn::new(self.caps, self.log.clone(), Duration::ZERO)))
    }
}

pub struct FakeConnector {
    pub driver: FakeDriver,
    pub caps: Caps,
    pub log: CallLog,
    /// Return this backend error code from `connect`.
    pub fail_connect: Option<u32>,
    /// Sleep this long inside `connect` and `query_context`.
    pub delay: Duration,
}

impl FakeConnector {
    pub fn new(caps: Caps) -> Self {
        let log = CallLog::default();
        Self {
            driver: FakeDriver {
                caps,
                log: log.clone(),
            },
            caps,
            log,
            fail_connect: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(mut self, code: u32) -> Self {
        self.fail_connect = Some(code);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, _ctx: &Context) -> DriverResult<Box<dyn Conn>> {
        self.log.push("connect");
        std::thread::sleep(self.delay);
        if let Some(code) = self.fail_connect {
            return Err(DriverError::backend(FakeError { code }));
        }
        Ok(Box::new(FakeConn::new(self.caps, self.log.clone(), self.delay)))
    }

    fn driver(&self) -> &dyn Driver {
        &self.driver
    }
}

// ── Connection ──

pub struct FakeConn {
    caps: Caps,
    log: CallLog,
    delay: Duration,
}

impl FakeConn {
    pub fn new(caps: Caps, log: CallLog, delay: Duration) -> Self {
        Self { caps, log, delay }
    }

    fn run_query(&self, query: &str, fast_path: bool) -> DriverResult<Box<dyn Rows>> {
        if query.contains("fail") {
            return Err(DriverError::backend(FakeError { code: 42 }));
        }
        if query.contains("bad conn") {
            return Err(DriverError::BadConn);
        }
        if fast_path && query.contains("skip") {
            return Err(DriverError::Skip);
        }
        Ok(Box::new(FakeRows::for_query(query, self.caps, self.log.clone())))
    }

    fn run_exec(&self, query: &str) -> DriverResult<Box<dyn ExecResult>> {
        if query.contains("fail") {
            return Err(DriverError::backend(FakeError { code: 42 }));
        }
        Ok(Box::new(FakeResult {
            last_insert_id: (!query.contains("no_id")).then_some(7),
            rows_affected: 3,
        }))
    }
}

impl Conn for FakeConn {
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>> {
        self.log.push(format!("prepare:{query}"));
        if query.contains("fail") {
            return Err(DriverError::backend(FakeError { code: 42 }));
        }
        Ok(Box::new(FakeStmt {
            query: query.to_string(),
            caps: self.caps,
            log: self.log.clone(),
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.log.push("close");
        Ok(())
    }

    fn begin(&mut self) -> DriverResult<Box<dyn Tx>> {
        self.log.push("begin");
        Ok(Box::new(FakeTx::new(self.log.clone())))
    }

    fn as_begin_tx(&mut self) -> Option<&mut dyn ConnBeginTx> {
        if self.caps.begin_tx { Some(self) } else { None }
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        if self.caps.pinger { Some(self) } else { None }
    }

    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        if self.caps.execer { Some(self) } else { None }
    }

    fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
        if self.caps.execer_context { Some(self) } else { None }
    }

    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        if self.caps.queryer { Some(self) } else { None }
    }

    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        if self.caps.queryer_context { Some(self) } else { None }
    }
}

impl ConnBeginTx for FakeConn {
    fn begin_tx(&mut self, _ctx: &Context, opts: TxOptions) -> DriverResult<Box<dyn Tx>> {
        self.log.push(format!(
            "begin_tx:{:?}:{}",
            opts.isolation, opts.read_only
        ));
        Ok(Box::new(FakeTx::new(self.log.clone())))
    }
}

impl Pinger for FakeConn {
    fn ping(&mut self, ctx: &Context) -> DriverResult<()> {
        self.log.push("ping");
        match ctx.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Execer for FakeConn {
    fn exec(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        self.log.push(format!("exec:{query}:{}", args.len()));
        self.run_exec(query)
    }
}

impl ExecerContext for FakeConn {
    fn exec_context(
        &mut self,
        _ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>> {
        self.log.push(format!("exec_context:{query}:{}", args.len()));
        if query.contains("skip") {
            return Err(DriverError::Skip);
        }
        self.run_exec(query)
    }
}

impl Queryer for FakeConn {
    fn query(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        self.log.push(format!("query:{query}:{}", args.len()));
        self.run_query(query, false)
    }
}

impl QueryerContext for FakeConn {
    fn query_context(
        &mut self,
        _ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>> {
        self.log.push(format!("query_context:{query}:{}", args.len()));
        std::thread::sleep(self.delay);
        self.run_query(query, true)
    }
}

// ── Transaction ──

pub struct FakeTx {
    log: CallLog,
    done: bool,
}

impl FakeTx {
    fn new(log: CallLog) -> Self {
        Self { log, done: false }
    }

    fn finish(&mut self, op: &str) -> DriverResult<()> {
        self.log.push(op.to_string());
        if self.done {
            return Err(DriverError::other("sql: transaction has already been committed or rolled back"));
        }
        self.done = true;
        Ok(())
    }
}

impl Tx for FakeTx {
    fn commit(&mut self) -> DriverResult<()> {
        self.finish("commit")
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.finish("rollback")
    }
}

// ── Statement ──

pub struct FakeStmt {
    query: String,
    caps: Caps,
    log: CallLog,
}

impl Stmt for FakeStmt {
    fn close(&mut self) -> DriverResult<()> {
        self.log.push(format!("stmt.close:{}", self.query));
        Ok(())
    }

    fn num_input(&self) -> Option<usize> {
        if self.query.contains("unknown_inputs") {
            return None;
        }
        Some(self.query.matches('?').count())
    }

    fn exec(&mut self, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        self.log.push(format!("stmt.exec:{}:{}", self.query, args.len()));
        if self.query.contains("fail") {
            return Err(DriverError::backend(FakeError { code: 42 }));
        }
        Ok(Box::new(FakeResult {
            last_insert_id: (!self.query.contains("no_id")).then_some(7),
            rows_affected: 3,
        }))
    }

    fn query(&mut self, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        self.log.push(format!("stmt.query:{}:{}", self.query, args.len()));
        if self.query.contains("broken_stmt") {
            return Err(DriverError::backend(FakeError { code: 42 }));
        }
        Ok(Box::new(FakeRows::for_query(&self.query, self.caps, self.log.clone())))
    }
}

// ── Result ──

pub struct FakeResult {
    last_insert_id: Option<i64>,
    rows_affected: u64,
}

impl ExecResult for FakeResult {
    fn last_insert_id(&self) -> DriverResult<i64> {
        self.last_insert_id
            .ok_or_else(|| DriverError::other("LastInsertId is not supported by this driver"))
    }

    fn rows_affected(&self) -> DriverResult<u64> {
        Ok(self.rows_affected)
    }
}

// ── Rows ──

pub struct ResultSet {
    pub columns: Vec<&'static str>,
    pub db_types: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

pub fn users() -> ResultSet {
    ResultSet {
        columns: vec!["id", "name"],
        db_types: vec!["INT8", "VARCHAR"],
        rows: vec![
            vec![Value::Int(1), Value::Text("alice".into())],
            vec![Value::Int(2), Value::Text("bob".into())],
        ],
    }
}

pub fn answer() -> ResultSet {
    ResultSet {
        columns: vec!["answer"],
        db_types: vec!["NUMERIC"],
        rows: vec![vec![Value::Float(42.5)]],
    }
}

pub struct FakeRows {
    sets: Vec<ResultSet>,
    set: usize,
    row: usize,
    caps: Caps,
    log: CallLog,
}

impl FakeRows {
    pub fn for_query(query: &str, caps: Caps, log: CallLog) -> Self {
        let sets = if query.contains("select now()") {
            vec![ResultSet {
                columns: vec!["now"],
                db_types: vec!["TIMESTAMPTZ"],
                rows: vec![vec![Value::Timestamp(fixed_now())]],
            }]
        } else if query.contains("empty") {
            vec![ResultSet {
                rows: Vec::new(),
                ..users()
            }]
        } else {
            vec![users(), answer()]
        };
        Self {
            sets,
            set: 0,
            row: 0,
            caps,
            log,
        }
    }

    fn current(&self) -> &ResultSet {
        &self.sets[self.set]
    }

    fn check_index(&self, index: usize) -> DriverResult<()> {
        let columns = self.current().columns.len();
        if index >= columns {
            return Err(DriverError::ColumnIndex { index, columns });
        }
        Ok(())
    }
}

impl Rows for FakeRows {
    fn columns(&self) -> Vec<String> {
        self.current().columns.iter().map(|c| c.to_string()).collect()
    }

    fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool> {
        let Some(row) = self.current().rows.get(self.row) else {
            return Ok(false);
        };
        for (slot, value) in dest.iter_mut().zip(row) {
            *slot = value.clone();
        }
        self.row += 1;
        Ok(true)
    }

    fn close(&mut self) -> DriverResult<()> {
        self.log.push("rows.close");
        Ok(())
    }

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        if self.caps.column_metadata { Some(self) } else { None }
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        if self.caps.column_metadata { Some(self) } else { None }
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        if self.caps.column_metadata { Some(self) } else { None }
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        if self.caps.column_metadata { Some(self) } else { None }
    }

    fn as_next_result_set(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        if self.caps.next_result_set { Some(self) } else { None }
    }
}

impl RowsColumnTypeDatabaseTypeName for FakeRows {
    fn column_type_database_type_name(&self, index: usize) -> DriverResult<String> {
        self.check_index(index)?;
        Ok(self.current().db_types[index].to_string())
    }
}

impl RowsColumnTypeLength for FakeRows {
    fn column_type_length(&self, index: usize) -> DriverResult<Option<u64>> {
        self.check_index(index)?;
        Ok((self.current().db_types[index] == "VARCHAR").then_some(255))
    }
}

impl RowsColumnTypePrecisionScale for FakeRows {
    fn column_type_precision_scale(&self, index: usize) -> DriverResult<Option<(i64, i64)>> {
        self.check_index(index)?;
        Ok((self.current().db_types[index] == "NUMERIC").then_some((10, 2)))
    }
}

impl RowsColumnTypeScanType for FakeRows {
    fn column_type_scan_type(&self, index: usize) -> DriverResult<ValueKind> {
        self.check_index(index)?;
        Ok(match self.current().db_types[index] {
            "INT8" => ValueKind::Int,
            "VARCHAR" => ValueKind::Text,
            "NUMERIC" => ValueKind::Float,
            "TIMESTAMPTZ" => ValueKind::Timestamp,
            _ => ValueKind::Bytes,
        })
    }
}

impl RowsNextResultSet for FakeRows {
    fn has_next_result_set(&mut self) -> DriverResult<bool> {
        Ok(self.set + 1 < self.sets.len())
    }

    fn next_result_set(&mut self) -> DriverResult<bool> {
        if self.set + 1 >= self.sets.len() {
            return Ok(false);
        }
        self.set += 1;
        self.row = 0;
        Ok(true)
    }
}

/// Drain a row stream into memory.
pub fn collect_rows(rows: &mut dyn Rows) -> DriverResult<Vec<Vec<Value>>> {
    let width = rows.columns().len();
    let mut out = Vec::new();
    loop {
        let mut row = vec![Value::Null; width];
        if !rows.next(&mut row)? {
            return Ok(out);
        }
        out.push(row);
    }
}
