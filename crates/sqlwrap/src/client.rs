//! A minimal client layer over a [`Connector`].
//!
//! [`Db`] keeps a single lazily opened connection (no pooling, no retries) and
//! drives it the way a host client layer does. Exec and query try the
//! context-aware fast path, then the legacy `Execer`/`Queryer` path, then
//! prepare + statement. A step that answers [`DriverError::Skip`] or
//! [`DriverError::Unsupported`] moves on to the next one.
//!
//! ```rust,ignore
//! use sqlwrap::{Context, Db, InstrumentedConnector};
//!
//! let db = Db::open(InstrumentedConnector::new(connector).with_query_hook(hook));
//! let row = db.query_row_context(&Context::background(), "select now()", &[])?;
//! ```

use crate::context::Context;
use crate::driver::{
    Conn, Connector, Driver, ExecResult, NamedValue, Rows, RowsColumnTypeDatabaseTypeName,
    RowsColumnTypeLength, RowsColumnTypePrecisionScale, RowsColumnTypeScanType,
    RowsNextResultSet, Stmt, Tx, TxOptions, Value,
};
use crate::error::{DriverError, DriverResult};
use std::sync::{Arc, Mutex, PoisonError};

/// A database handle holding at most one open connection.
pub struct Db {
    connector: Arc<dyn Connector>,
    conn: Mutex<Option<Box<dyn Conn>>>,
}

impl Db {
    /// Create a handle. No connection is opened until the first call.
    pub fn open<C: Connector + 'static>(connector: C) -> Self {
        Self::from_arc(Arc::new(connector))
    }

    /// Create a handle from a shared connector.
    pub fn from_arc(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            conn: Mutex::new(None),
        }
    }

    /// The driver behind the connector.
    pub fn driver(&self) -> &dyn Driver {
        self.connector.driver()
    }

    /// Whether a connection is currently cached.
    pub fn is_connected(&self) -> bool {
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run `f` on the cached connection, connecting first if needed.
    ///
    /// A connection whose call fails with [`DriverError::BadConn`] is closed and
    /// dropped; the next call opens a fresh one.
    fn with_conn<T>(
        &self,
        ctx: &Context,
        f: impl FnOnce(&mut dyn Conn) -> DriverResult<T>,
    ) -> DriverResult<T> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let mut slot = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.connector.connect(ctx)?,
        };

        let result = f(conn.as_mut());
        match &result {
            Err(err) if err.is_bad_conn() => {
                tracing::debug!(target: "sqlwrap.client", "discarding bad connection");
                if let Err(close_err) = conn.close() {
                    tracing::debug!(target: "sqlwrap.client", error = %close_err, "close after bad connection failed");
                }
            }
            _ => *slot = Some(conn),
        }
        result
    }

    /// Check the connection is alive, connecting if needed.
    ///
    /// Connections without a liveness check count as alive.
    pub fn ping_context(&self, ctx: &Context) -> DriverResult<()> {
        self.with_conn(ctx, |conn| match conn.as_pinger() {
            Some(pinger) => match pinger.ping(ctx) {
                Err(err) if err.is_unsupported() => Ok(()),
                other => other,
            },
            None => Ok(()),
        })
    }

    /// Execute a statement that returns no rows.
    pub fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Value],
    ) -> DriverResult<Box<dyn ExecResult>> {
        self.with_conn(ctx, |conn| {
            if let Some(execer) = conn.as_execer_context() {
                match execer.exec_context(ctx, query, &NamedValue::from_values(args)) {
                    Err(err) if falls_back(&err) => {}
                    other => return other,
                }
            }
            if let Some(execer) = conn.as_execer() {
                match execer.exec(query, args) {
                    Err(err) if falls_back(&err) => {}
                    other => return other,
                }
            }

            let mut stmt = conn.prepare(query)?;
            let result = stmt.exec(args);
            let closed = stmt.close();
            let result = result?;
            closed?;
            Ok(result)
        })
    }

    /// Run a query and return the open row stream.
    pub fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Value],
    ) -> DriverResult<Box<dyn Rows>> {
        self.with_conn(ctx, |conn| {
            if let Some(queryer) = conn.as_queryer_context() {
                match queryer.query_context(ctx, query, &NamedValue::from_values(args)) {
                    Err(err) if falls_back(&err) => {}
                    other => return other,
                }
            }
            if let Some(queryer) = conn.as_queryer() {
                match queryer.query(query, args) {
                    Err(err) if falls_back(&err) => {}
                    other => return other,
                }
            }

            let mut stmt = conn.prepare(query)?;
            match stmt.query(args) {
                Ok(rows) => Ok(Box::new(StmtRows { rows, stmt }) as Box<dyn Rows>),
                Err(err) => {
                    if let Err(close_err) = stmt.close() {
                        tracing::debug!(target: "sqlwrap.client", error = %close_err, "close after failed statement query failed");
                    }
                    Err(err)
                }
            }
        })
    }

    /// Run a query and return its first row.
    ///
    /// Returns [`DriverError::NoRows`] when the query produced no rows.
    pub fn query_row_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Value],
    ) -> DriverResult<Vec<Value>> {
        let mut rows = self.query_context(ctx, query, args)?;
        let mut row = vec![Value::Null; rows.columns().len()];
        let found = rows.next(&mut row);
        let closed = rows.close();
        if !found? {
            return Err(DriverError::NoRows);
        }
        closed?;
        Ok(row)
    }

    /// Begin a transaction.
    ///
    /// Without `ConnBeginTx` support only default options can be honored.
    pub fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> DriverResult<Box<dyn Tx>> {
        self.with_conn(ctx, |conn| {
            if let Some(beginner) = conn.as_begin_tx() {
                match beginner.begin_tx(ctx, opts) {
                    Err(err) if falls_back(&err) && opts == TxOptions::default() => {}
                    other => return other,
                }
            } else if opts != TxOptions::default() {
                return Err(DriverError::other(
                    "sql: driver does not support non-default transaction options",
                ));
            }
            conn.begin()
        })
    }

    /// Prepare a statement on the cached connection.
    pub fn prepare(&self, ctx: &Context, query: &str) -> DriverResult<Box<dyn Stmt>> {
        self.with_conn(ctx, |conn| conn.prepare(query))
    }

    /// Close the cached connection, if any.
    pub fn close(&self) -> DriverResult<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner).take();
        match conn {
            Some(mut conn) => conn.close(),
            None => Ok(()),
        }
    }
}

fn falls_back(err: &DriverError) -> bool {
    if err.is_skip() || err.is_unsupported() {
        tracing::debug!(target: "sqlwrap.client", error = %err, "path unavailable, trying the next one");
        return true;
    }
    false
}

/// Rows obtained through a prepared statement; closing them closes the statement.
struct StmtRows {
    rows: Box<dyn Rows>,
    stmt: Box<dyn Stmt>,
}

impl Rows for StmtRows {
    fn columns(&self) -> Vec<String> {
        self.rows.columns()
    }

    fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool> {
        self.rows.next(dest)
    }

    fn close(&mut self) -> DriverResult<()> {
        let rows = self.rows.close();
        let stmt = self.stmt.close();
        rows.and(stmt)
    }

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        self.rows.as_column_type_database_type_name()
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        self.rows.as_column_type_length()
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        self.rows.as_column_type_precision_scale()
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        self.rows.as_column_type_scan_type()
    }

    fn as_next_result_set(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        self.rows.as_next_result_set()
    }
}
