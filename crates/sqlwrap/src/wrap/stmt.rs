use super::result::WrappedExecResult;
use super::rows::WrappedRows;
use crate::driver::{ExecResult, Rows, Stmt, Value};
use crate::error::DriverResult;

/// A prepared statement proxy. Results and rows come back wrapped.
pub struct WrappedStmt {
    stmt: Box<dyn Stmt>,
}

impl WrappedStmt {
    /// Wrap a prepared statement.
    pub fn new(stmt: Box<dyn Stmt>) -> Self {
        Self { stmt }
    }

    pub(crate) fn boxed(stmt: Box<dyn Stmt>) -> Box<dyn Stmt> {
        Box::new(Self::new(stmt))
    }
}

impl Stmt for WrappedStmt {
    fn close(&mut self) -> DriverResult<()> {
        self.stmt.close()
    }

    fn num_input(&self) -> Option<usize> {
        self.stmt.num_input()
    }

    fn exec(&mut self, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        self.stmt.exec(args).map(WrappedExecResult::boxed)
    }

    fn query(&mut self, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        self.stmt.query(args).map(WrappedRows::boxed)
    }
}
