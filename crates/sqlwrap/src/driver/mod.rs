//! Driver capability model.
//!
//! A concrete database driver implements the mandatory traits ([`Connector`],
//! [`Conn`], [`Tx`], [`Stmt`], [`ExecResult`], [`Rows`]) and any subset of the
//! optional capability traits. Optional capabilities are discovered at call
//! time through the `as_*` probe methods, which default to `None`:
//!
//! ```rust,ignore
//! impl Conn for MyConn {
//!     // ...
//!     fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
//!         Some(self)
//!     }
//! }
//! ```
//!
//! Callers should go through the free functions in this module ([`ping`],
//! [`query_context`], ...), which run the probe and fail with
//! [`DriverError::Unsupported`] when the capability is missing.

mod value;


pub use value::{IsolationLevel, NamedValue, TxOptions, Value, ValueKind};

use crate::context::Context;
use crate::error::{Capability, DriverError, DriverResult};

/// A database driver.
pub trait Driver: Send + Sync {
    /// Driver name, e.g. `"postgres"`.
    fn name(&self) -> &str;

    /// Open a connection from a data source name.
    fn open(&self, dsn: &str) -> DriverResult<Box<dyn Conn>>;
}

/// A factory for connections with fixed configuration.
pub trait Connector: Send + Sync {
    /// Open a new connection.
    fn connect(&self, ctx: &Context) -> DriverResult<Box<dyn Conn>>;

    /// The driver this connector belongs to.
    fn driver(&self) -> &dyn Driver;
}

/// An open connection.
///
/// The `as_*` methods expose optional capabilities. Implementations that
/// support one return `Some(self)`.
pub trait Conn: Send {
    /// Prepare a statement.
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>>;

    /// Close the connection.
    fn close(&mut self) -> DriverResult<()>;

    /// Begin a transaction with default options.
    fn begin(&mut self) -> DriverResult<Box<dyn Tx>>;

    fn as_begin_tx(&mut self) -> Option<&mut dyn ConnBeginTx> {
        None
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        None
    }

    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        None
    }

    fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
        None
    }

    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        None
    }

    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        None
    }
}

/// Begin a transaction with a context and options.
pub trait ConnBeginTx {
    fn begin_tx(&mut self, ctx: &Context, opts: TxOptions) -> DriverResult<Box<dyn Tx>>;
}

/// Connection liveness check.
pub trait Pinger {
    fn ping(&mut self, ctx: &Context) -> DriverResult<()>;
}

/// Exec without preparing a statement first.
pub trait Execer {
    fn exec(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn ExecResult>>;
}

/// Context-aware exec without preparing a statement first.
pub trait ExecerContext {
    fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>>;
}

/// Query without preparing a statement first.
pub trait Queryer {
    fn query(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>>;
}

/// Context-aware query without preparing a statement first.
pub trait QueryerContext {
    fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>>;
}

/// A transaction. Commit and rollback are terminal.
pub trait Tx: Send {
    fn commit(&mut self) -> DriverResult<()>;
    fn rollback(&mut self) -> DriverResult<()>;
}

/// A prepared statement.
pub trait Stmt: Send {
    /// Close the statement.
    fn close(&mut self) -> DriverResult<()>;

    /// Number of placeholders, or `None` if the driver does not know.
    fn num_input(&self) -> Option<usize>;

    fn exec(&mut self, args: &[Value]) -> DriverResult<Box<dyn ExecResult>>;

    fn query(&mut self, args: &[Value]) -> DriverResult<Box<dyn Rows>>;
}

/// The outcome of an exec.
pub trait ExecResult: Send {
    /// Database-generated id of the last inserted row.
    fn last_insert_id(&self) -> DriverResult<i64>;

    /// Number of rows affected.
    fn rows_affected(&self) -> DriverResult<u64>;
}

/// An open, forward-only row stream.
pub trait Rows: Send {
    /// Column names.
    fn columns(&self) -> Vec<String>;

    /// Fill `dest` with the next row. Returns `Ok(false)` once exhausted.
    ///
    /// `dest` has the same length as [`Rows::columns`].
    fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool>;

    /// Close the row stream.
    fn close(&mut self) -> DriverResult<()>;

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        None
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        None
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        None
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        None
    }

    fn as_next_result_set(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        None
    }
}

/// Database type name of a column, e.g. `"VARCHAR"`.
pub trait RowsColumnTypeDatabaseTypeName {
    fn column_type_database_type_name(&self, index: usize) -> DriverResult<String>;
}

/// Length of variable-length columns. `None` if not a variable-length type.
pub trait RowsColumnTypeLength {
    fn column_type_length(&self, index: usize) -> DriverResult<Option<u64>>;
}

/// Precision and scale of decimal columns. `None` if not applicable.
pub trait RowsColumnTypePrecisionScale {
    fn column_type_precision_scale(&self, index: usize) -> DriverResult<Option<(i64, i64)>>;
}

/// The kind of value a column scans into.
pub trait RowsColumnTypeScanType {
    fn column_type_scan_type(&self, index: usize) -> DriverResult<ValueKind>;
}

/// Row streams that carry several result sets.
pub trait RowsNextResultSet {
    /// Whether another result set follows the current one.
    fn has_next_result_set(&mut self) -> DriverResult<bool>;

    /// Advance to the next result set. Returns `Ok(false)` if there is none.
    fn next_result_set(&mut self) -> DriverResult<bool>;
}

fn require<T>(probe: Option<T>, capability: Capability) -> DriverResult<T> {
    probe.ok_or(DriverError::Unsupported(capability))
}

/// Begin a transaction through [`ConnBeginTx`].
pub fn begin_tx(conn: &mut dyn Conn, ctx: &Context, opts: TxOptions) -> DriverResult<Box<dyn Tx>> {
    require(conn.as_begin_tx(), Capability::BeginTx)?.begin_tx(ctx, opts)
}

/// Ping through [`Pinger`].
pub fn ping(conn: &mut dyn Conn, ctx: &Context) -> DriverResult<()> {
    require(conn.as_pinger(), Capability::Pinger)?.ping(ctx)
}

/// Exec through [`Execer`].
pub fn exec(conn: &mut dyn Conn, query: &str, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
    require(conn.as_execer(), Capability::Execer)?.exec(query, args)
}

/// Exec through [`ExecerContext`].
pub fn exec_context(
    conn: &mut dyn Conn,
    ctx: &Context,
    query: &str,
    args: &[NamedValue],
) -> DriverResult<Box<dyn ExecResult>> {
    require(conn.as_execer_context(), Capability::ExecerContext)?.exec_context(ctx, query, args)
}

/// Query through [`Queryer`].
pub fn query(conn: &mut dyn Conn, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
    require(conn.as_queryer(), Capability::Queryer)?.query(query, args)
}

/// Query through [`QueryerContext`].
pub fn query_context(
    conn: &mut dyn Conn,
    ctx: &Context,
    query: &str,
    args: &[NamedValue],
) -> DriverResult<Box<dyn Rows>> {
    require(conn.as_queryer_context(), Capability::QueryerContext)?.query_context(ctx, query, args)
}

/// Column database type name through [`RowsColumnTypeDatabaseTypeName`].
pub fn column_type_database_type_name(rows: &dyn Rows, index: usize) -> DriverResult<String> {
    require(
        rows.as_column_type_database_type_name(),
        Capability::ColumnTypeDatabaseTypeName,
    )?
    .column_type_database_type_name(index)
}

/// Column length through [`RowsColumnTypeLength`].
pub fn column_type_length(rows: &dyn Rows, index: usize) -> DriverResult<Option<u64>> {
    require(rows.as_column_type_length(), Capability::ColumnTypeLength)?.column_type_length(index)
}

/// Column precision and scale through [`RowsColumnTypePrecisionScale`].
pub fn column_type_precision_scale(
    rows: &dyn Rows,
    index: usize,
) -> DriverResult<Option<(i64, i64)>> {
    require(
        rows.as_column_type_precision_scale(),
        Capability::ColumnTypePrecisionScale,
    )?
    .column_type_precision_scale(index)
}

/// Column scan type through [`RowsColumnTypeScanType`].
pub fn column_type_scan_type(rows: &dyn Rows, index: usize) -> DriverResult<ValueKind> {
    require(rows.as_column_type_scan_type(), Capability::ColumnTypeScanType)?
        .column_type_scan_type(index)
}

/// Check for another result set through [`RowsNextResultSet`].
pub fn has_next_result_set(rows: &mut dyn Rows) -> DriverResult<bool> {
    require(rows.as_next_result_set(), Capability::NextResultSet)?.has_next_result_set()
}

/// Advance to the next result set through [`RowsNextResultSet`].
pub fn next_result_set(rows: &mut dyn Rows) -> DriverResult<bool> {
    require(rows.as_next_result_set(), Capability::NextResultSet)?.next_result_set()
}
