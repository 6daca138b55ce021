use crate::driver::Tx;
use crate::error::DriverResult;

/// A transaction proxy.
///
/// Commit and rollback go straight to the wrapped transaction. A second
/// terminal call is not intercepted: whatever the driver does with it is what
/// the caller sees.
pub struct WrappedTx {
    tx: Box<dyn Tx>,
}

impl WrappedTx {
    /// Wrap a transaction.
    pub fn new(tx: Box<dyn Tx>) -> Self {
        Self { tx }
    }

    pub(crate) fn boxed(tx: Box<dyn Tx>) -> Box<dyn Tx> {
        Box::new(Self::new(tx))
    }
}

impl Tx for WrappedTx {
    fn commit(&mut self) -> DriverResult<()> {
        self.tx.commit()
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.tx.rollback()
    }
}
