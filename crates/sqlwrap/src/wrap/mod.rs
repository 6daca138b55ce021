//! Capability-preserving driver proxies.
//!
//! [`InstrumentedConnector`] wraps any [`Connector`](crate::driver::Connector)
//! and hands out [`InstrumentedConn`]s. Everything a connection returns
//! (transactions, statements, results, rows) comes back wrapped as well.
//!
//! # Capability probing
//!
//! The proxies answer `Some(self)` to every `as_*` capability probe, whether or
//! not the wrapped object has the capability. Support is only checked when the
//! capability is invoked; a missing one fails with
//! [`DriverError::Unsupported`](crate::DriverError::Unsupported), the same
//! error the caller gets from the free functions in [`crate::driver`] when
//! talking to the delegate directly. Probing a proxy therefore always says
//! "yes"; only calling tells.
//!
//! # Hooks
//!
//! Only two operations are observed: `Connector::connect` (connect hook) and
//! `QueryerContext::query_context` (query hook). Every other call is forwarded
//! without timing.

mod conn;
mod connector;
mod result;
mod rows;
mod stmt;
mod tx;


pub use conn::InstrumentedConn;
pub use connector::InstrumentedConnector;
pub use result::WrappedExecResult;
pub use rows::WrappedRows;
pub use stmt::WrappedStmt;
pub use tx::WrappedTx;

use crate::error::DriverResult;

/// Log capability mismatches as they pass through a proxy.
pub(crate) fn trace_unsupported<T>(result: DriverResult<T>, proxy: &'static str) -> DriverResult<T> {
    result.inspect_err(|err| {
        if let Some(capability) = err.capability() {
            tracing::debug!(target: "sqlwrap.wrap", proxy, %capability, "delegate lacks capability");
        }
    })
}
