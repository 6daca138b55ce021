//! Example wiring connect and query hooks around a driver.
//!
//! Run with:
//!   cargo run --example hooks -p sqlwrap
//!
//! Set `RUST_LOG=sqlwrap=debug` to see the `TracingHook` events.
//!
//! The driver here is a toy that only knows `select now()`; any real driver
//! implementing the `sqlwrap::driver` traits plugs in the same way.

use chrono::Utc;
use sqlwrap::driver::{Conn, Connector, Driver, QueryerContext, Rows, Stmt, Tx, Value};
use sqlwrap::{
    Context, Db, DriverError, DriverResult, InstrumentedConnector, NamedValue, StatsHook,
    TracingHook,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

// ─── A toy driver ───────────────────────────────────────────────────────────

struct ClockDriver;

impl Driver for ClockDriver {
    fn name(&self) -> &str {
        "clock"
    }

    fn open(&self, _dsn: &str) -> DriverResult<Box<dyn Conn>> {
        Ok(Box::new(ClockConn))
    }
}

struct ClockConnector(ClockDriver);

impl Connector for ClockConnector {
    fn connect(&self, ctx: &Context) -> DriverResult<Box<dyn Conn>> {
        self.0.open(ctx.field("dsn").unwrap_or("clock://local"))
    }

    fn driver(&self) -> &dyn Driver {
        &self.0
    }
}

struct ClockConn;

impl Conn for ClockConn {
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>> {
        Err(DriverError::other(format!("clock: cannot prepare {query:?}")))
    }

    fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn begin(&mut self) -> DriverResult<Box<dyn Tx>> {
        Err(DriverError::other("clock: transactions are not supported"))
    }

    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        Some(self)
    }
}

impl QueryerContext for ClockConn {
    fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        _args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        if !query.trim().eq_ignore_ascii_case("select now()") {
            return Err(DriverError::other(format!("clock: unknown query {query:?}")));
        }
        Ok(Box::new(NowRow { sent: false }))
    }
}

struct NowRow {
    sent: bool,
}

impl Rows for NowRow {
    fn columns(&self) -> Vec<String> {
        vec!["now".to_string()]
    }

    fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool> {
        if self.sent {
            return Ok(false);
        }
        self.sent = true;
        if let Some(slot) = dest.first_mut() {
            *slot = Value::Timestamp(Utc::now());
        }
        Ok(true)
    }

    fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}

// ─── Wiring ─────────────────────────────────────────────────────────────────

fn main() -> DriverResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlwrap=debug")),
        )
        .with_target(true)
        .init();

    let stats = Arc::new(StatsHook::new());
    let tracing_hook = Arc::new(
        TracingHook::new()
            .level(Level::INFO)
            .max_sql_length(80)
            .log_params(true),
    );

    let connector = InstrumentedConnector::new(ClockConnector(ClockDriver))
        .with_connect_hook_arc(tracing_hook.clone())
        .add_connect_hook_arc(stats.clone())
        .with_query_hook_arc(tracing_hook)
        .add_query_hook_arc(stats.clone())
        .add_query_hook(
            |_: &Context, query: &str, _: &[NamedValue], err: Option<&DriverError>, d: Duration| {
                if d > Duration::from_millis(50) {
                    println!("slow query ({d:?}): {query}");
                }
                if let Some(err) = err {
                    println!("query failed: {err}");
                }
            },
        );

    let db = Db::open(connector);
    let ctx = Context::background().with_field("request_id", "example-1");

    let row = db.query_row_context(&ctx, "select now()", &[])?;
    println!("now = {:?}", row.first());

    // Fails in the driver; the hooks still see it.
    if let Err(err) = db.query_row_context(&ctx, "select answer()", &[]) {
        println!("expected error: {err}");
    }

    // The proxy advertises ping; the toy driver lacks it, which the client treats as alive.
    db.ping_context(&ctx)?;

    println!("{:#?}", stats.stats());
    db.close()
}
