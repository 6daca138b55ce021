//! # sqlwrap
//!
//! An instrumentation shim between a database client layer and a concrete
//! driver.
//!
//! ## Features
//!
//! - **Transparent forwarding**: every connector, connection, transaction,
//!   statement, result and row operation goes straight to the wrapped driver
//! - **Capability preserving**: the optional driver capabilities (context
//!   transactions, ping, exec, query, extended column metadata, multiple result
//!   sets) stay reachable through the proxies
//! - **Two hooks**: a connect hook and a context-aware query hook, each told
//!   the outcome and the time spent in the driver
//! - **Ready-made hooks**: `tracing` events, counters, fan-out
//!
//! ## Example
//!
//! ```ignore
//! use sqlwrap::{Context, Db, DriverError, InstrumentedConnector, NamedValue};
//! use std::time::Duration;
//!
//! let connector = InstrumentedConnector::new(my_driver_connector)
//!     .with_connect_hook(|_: &Context, err: Option<&DriverError>, d: Duration| {
//!         println!("connect took {d:?} (error: {err:?})");
//!     })
//!     .with_query_hook(
//!         |_: &Context, q: &str, _: &[NamedValue], _: Option<&DriverError>, d: Duration| {
//!             println!("{q} took {d:?}");
//!         },
//!     );
//!
//! let db = Db::open(connector);
//! let row = db.query_row_context(&Context::background(), "select now()", &[])?;
//! ```
//!
//! ## Capability probing
//!
//! Proxies advertise every optional capability. A capability the wrapped
//! driver lacks only shows up when it is called, as
//! [`DriverError::Unsupported`]. See [`wrap`] for details.

pub mod client;
pub mod context;
pub mod driver;
pub mod error;
pub mod hook;
pub mod wrap;

pub use client::Db;
pub use context::Context;
pub use driver::{
    Conn, Connector, Driver, ExecResult, IsolationLevel, NamedValue, Rows, Stmt, Tx, TxOptions,
    Value, ValueKind,
};
pub use error::{Capability, DriverError, DriverResult};
pub use hook::{CompositeHook, ConnectHook, HookStats, QueryHook, QueryType, StatsHook, TracingHook};
pub use wrap::{
    InstrumentedConn, InstrumentedConnector, WrappedExecResult, WrappedRows, WrappedStmt,
    WrappedTx,
};
