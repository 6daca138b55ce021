//! Connect and query hooks.
//!
//! Hooks observe two operations of the instrumented driver:
//! - [`ConnectHook`] runs after every [`InstrumentedConnector::connect`](crate::InstrumentedConnector)
//! - [`QueryHook`] runs after every context-aware query on an
//!   [`InstrumentedConn`](crate::InstrumentedConn)
//!
//! Both receive the caller's context, the outcome of the delegate call and the
//! time the delegate took. They cannot change the result.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlwrap::hook::{CompositeHook, StatsHook, TracingHook};
//! use sqlwrap::{Context, DriverError, InstrumentedConnector, NamedValue};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let stats = Arc::new(StatsHook::new());
//! let connector = InstrumentedConnector::new(pg_connector)
//!     .with_connect_hook_arc(stats.clone())
//!     .with_query_hook(TracingHook::new())
//!     .add_query_hook_arc(stats.clone());
//!
//! // ... later
//! println!("{:?}", stats.stats());
//! ```

mod composite;
mod stats;
mod tracing_hook;
mod types;


pub use composite::CompositeHook;
pub use stats::{HookStats, StatsHook};
pub use tracing_hook::TracingHook;
pub use types::QueryType;

use crate::context::Context;
use crate::driver::NamedValue;
use crate::error::DriverError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Observes connection establishment.
pub trait ConnectHook: Send + Sync {
    /// Called once per connect attempt, after the driver returned.
    ///
    /// `duration` covers the driver call only.
    fn on_connect(&self, ctx: &Context, err: Option<&DriverError>, duration: Duration);
}

impl<F> ConnectHook for F
where
    F: Fn(&Context, Option<&DriverError>, Duration) + Send + Sync,
{
    fn on_connect(&self, ctx: &Context, err: Option<&DriverError>, duration: Duration) {
        self(ctx, err, duration)
    }
}

/// Observes context-aware queries.
pub trait QueryHook: Send + Sync {
    /// Called once per query, after the driver returned and before the rows
    /// are handed back to the caller.
    ///
    /// `duration` covers the driver call only.
    fn on_query(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
        err: Option<&DriverError>,
        duration: Duration,
    );
}

impl<F> QueryHook for F
where
    F: Fn(&Context, &str, &[NamedValue], Option<&DriverError>, Duration) + Send + Sync,
{
    fn on_query(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
        err: Option<&DriverError>,
        duration: Duration,
    ) {
        self(ctx, query, args, err, duration)
    }
}

/// Run a hook, containing any panic it raises.
///
/// A panicking hook is logged and otherwise ignored so the caller still gets
/// the driver's result.
pub(crate) fn run_isolated(hook: &'static str, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        tracing::error!(
            target: "sqlwrap.hook",
            hook,
            panic = %panic_message(payload.as_ref()),
            "hook panicked; driver result returned unchanged"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
