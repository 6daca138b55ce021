use super::result::WrappedExecResult;
use super::rows::WrappedRows;
use super::stmt::WrappedStmt;
use super::trace_unsupported;
use super::tx::WrappedTx;
use crate::context::Context;
use crate::driver::{
    self, Conn, ConnBeginTx, ExecResult, Execer, ExecerContext, NamedValue, Pinger, Queryer,
    QueryerContext, Rows, Stmt, Tx, TxOptions, Value,
};
use crate::error::DriverResult;
use crate::hook::{QueryHook, run_isolated};
use std::sync::Arc;
use std::time::Instant;

const PROXY: &str = "InstrumentedConn";

/// A connection proxy.
///
/// Every operation is forwarded to the wrapped connection; only
/// [`QueryerContext::query_context`] is timed and reported to the query hook.
/// All six optional connection capabilities are advertised regardless of what
/// the wrapped connection supports.
pub struct InstrumentedConn {
    conn: Box<dyn Conn>,
    query_hook: Option<Arc<dyn QueryHook>>,
}

impl InstrumentedConn {
    /// Wrap a connection.
    pub fn new(conn: Box<dyn Conn>, query_hook: Option<Arc<dyn QueryHook>>) -> Self {
        Self { conn, query_hook }
    }

    /// The query hook this connection reports to.
    pub fn query_hook(&self) -> Option<&Arc<dyn QueryHook>> {
        self.query_hook.as_ref()
    }

    /// Get a reference to the inner connection.
    pub fn inner(&self) -> &dyn Conn {
        self.conn.as_ref()
    }

    /// Get the inner connection, consuming this wrapper.
    pub fn into_inner(self) -> Box<dyn Conn> {
        self.conn
    }
}

impl Conn for InstrumentedConn {
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>> {
        self.conn.prepare(query).map(WrappedStmt::boxed)
    }

    fn close(&mut self) -> DriverResult<()> {
        self.conn.close()
    }

    fn begin(&mut self) -> DriverResult<Box<dyn Tx>> {
        self.conn.begin().map(WrappedTx::boxed)
    }

    fn as_begin_tx(&mut self) -> Option<&mut dyn ConnBeginTx> {
        Some(self)
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        Some(self)
    }

    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        Some(self)
    }

    fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
        Some(self)
    }

    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        Some(self)
    }

    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        Some(self)
    }
}

impl ConnBeginTx for InstrumentedConn {
    fn begin_tx(&mut self, ctx: &Context, opts: TxOptions) -> DriverResult<Box<dyn Tx>> {
        trace_unsupported(driver::begin_tx(&mut *self.conn, ctx, opts), PROXY).map(WrappedTx::boxed)
    }
}

impl Pinger for InstrumentedConn {
    fn ping(&mut self, ctx: &Context) -> DriverResult<()> {
        trace_unsupported(driver::ping(&mut *self.conn, ctx), PROXY)
    }
}

impl Execer for InstrumentedConn {
    fn exec(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        trace_unsupported(driver::exec(&mut *self.conn, query, args), PROXY)
            .map(WrappedExecResult::boxed)
    }
}

impl ExecerContext for InstrumentedConn {
    fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>> {
        trace_unsupported(driver::exec_context(&mut *self.conn, ctx, query, args), PROXY)
            .map(WrappedExecResult::boxed)
    }
}

impl Queryer for InstrumentedConn {
    fn query(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        trace_unsupported(driver::query(&mut *self.conn, query, args), PROXY).map(WrappedRows::boxed)
    }
}

impl QueryerContext for InstrumentedConn {
    fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>> {
        let start = Instant::now();
        let result = driver::query_context(&mut *self.conn, ctx, query, args);
        let duration = start.elapsed();

        if let Some(hook) = &self.query_hook {
            run_isolated("query", || {
                hook.on_query(ctx, query, args, result.as_ref().err(), duration)
            });
        }

        trace_unsupported(result, PROXY).map(WrappedRows::boxed)
    }
}
