use crate::driver::ExecResult;
use crate::error::DriverResult;

/// An exec result proxy.
pub struct WrappedExecResult {
    result: Box<dyn ExecResult>,
}

impl WrappedExecResult {
    /// Wrap an exec result.
    pub fn new(result: Box<dyn ExecResult>) -> Self {
        Self { result }
    }

    pub(crate) fn boxed(result: Box<dyn ExecResult>) -> Box<dyn ExecResult> {
        Box::new(Self::new(result))
    }
}

impl ExecResult for WrappedExecResult {
    fn last_insert_id(&self) -> DriverResult<i64> {
        self.result.last_insert_id()
    }

    fn rows_affected(&self) -> DriverResult<u64> {
        self.result.rows_affected()
    }
}
