use super::conn::InstrumentedConn;
use crate::context::Context;
use crate::driver::{Conn, Connector, Driver};
use crate::error::DriverResult;
use crate::hook::{CompositeHook, ConnectHook, QueryHook, run_isolated};
use std::sync::Arc;
use std::time::Instant;

/// A connector that times connects and hands out [`InstrumentedConn`]s.
///
/// Hooks are configured with the builder methods (or the `set_*` methods on a
/// `&mut`) before the connector is shared. Connections copy the query hook when
/// they are created, so changing it later only affects new connections.
pub struct InstrumentedConnector {
    connector: Box<dyn Connector>,
    connect_hook: Option<Arc<dyn ConnectHook>>,
    query_hook: Option<Arc<dyn QueryHook>>,
}

impl InstrumentedConnector {
    /// Wrap a connector. No hooks are set.
    pub fn new<C: Connector + 'static>(connector: C) -> Self {
        Self::from_boxed(Box::new(connector))
    }

    /// Wrap an already boxed connector.
    pub fn from_boxed(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            connect_hook: None,
            query_hook: None,
        }
    }

    /// Set the connect hook.
    pub fn with_connect_hook<H: ConnectHook + 'static>(self, hook: H) -> Self {
        self.with_connect_hook_arc(Arc::new(hook))
    }

    /// Set the connect hook from an Arc.
    pub fn with_connect_hook_arc(mut self, hook: Arc<dyn ConnectHook>) -> Self {
        self.connect_hook = Some(hook);
        self
    }

    /// Add a connect hook.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_connect_hook<H: ConnectHook + 'static>(self, hook: H) -> Self {
        self.add_connect_hook_arc(Arc::new(hook))
    }

    /// Add a connect hook from an `Arc`.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_connect_hook_arc(mut self, hook: Arc<dyn ConnectHook>) -> Self {
        self.connect_hook = Some(match self.connect_hook.take() {
            None => hook,
            Some(existing) => Arc::new(
                CompositeHook::new()
                    .add_connect_arc(existing)
                    .add_connect_arc(hook),
            ),
        });
        self
    }

    /// Set the query hook.
    pub fn with_query_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.with_query_hook_arc(Arc::new(hook))
    }

    /// Set the query hook from an Arc.
    pub fn with_query_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.query_hook = Some(hook);
        self
    }

    /// Add a query hook.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_query_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_query_hook_arc(Arc::new(hook))
    }

    /// Add a query hook from an `Arc`.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_query_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.query_hook = Some(match self.query_hook.take() {
            None => hook,
            Some(existing) => Arc::new(
                CompositeHook::new()
                    .add_query_arc(existing)
                    .add_query_arc(hook),
            ),
        });
        self
    }

    /// Replace the connect hook (`None` removes it).
    pub fn set_connect_hook(&mut self, hook: Option<Arc<dyn ConnectHook>>) {
        self.connect_hook = hook;
    }

    /// Replace the query hook (`None` removes it).
    pub fn set_query_hook(&mut self, hook: Option<Arc<dyn QueryHook>>) {
        self.query_hook = hook;
    }

    /// The connect hook, if set.
    pub fn connect_hook(&self) -> Option<&Arc<dyn ConnectHook>> {
        self.connect_hook.as_ref()
    }

    /// The query hook, if set.
    pub fn query_hook(&self) -> Option<&Arc<dyn QueryHook>> {
        self.query_hook.as_ref()
    }

    /// Get a reference to the inner connector.
    pub fn inner(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// Get the inner connector, consuming this wrapper.
    pub fn into_inner(self) -> Box<dyn Connector> {
        self.connector
    }

    /// Connect and return the concrete proxy type.
    ///
    /// The connect hook (if any) runs once, success or failure, after the
    /// delegate returns. The delegate's error is returned unchanged.
    pub fn connect_instrumented(&self, ctx: &Context) -> DriverResult<InstrumentedConn> {
        let start = Instant::now();
        let result = self.connector.connect(ctx);
        let duration = start.elapsed();

        if let Some(hook) = &self.connect_hook {
            run_isolated("connect", || {
                hook.on_connect(ctx, result.as_ref().err(), duration)
            });
        }

        result.map(|conn| InstrumentedConn::new(conn, self.query_hook.clone()))
    }
}

impl Connector for InstrumentedConnector {
    fn connect(&self, ctx: &Context) -> DriverResult<Box<dyn Conn>> {
        self.connect_instrumented(ctx)
            .map(|conn| Box::new(conn) as Box<dyn Conn>)
    }

    fn driver(&self) -> &dyn Driver {
        self.connector.driver()
    }
}
