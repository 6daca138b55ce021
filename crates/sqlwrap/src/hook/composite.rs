use super::{ConnectHook, QueryHook};
use crate::context::Context;
use crate::driver::NamedValue;
use crate::error::DriverError;
use std::sync::Arc;
use std::time::Duration;

/// A hook that forwards to several hooks in the order they were added.
#[derive(Default)]
pub struct CompositeHook {
    connect_hooks: Vec<Arc<dyn ConnectHook>>,
    query_hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    /// Create an empty composite hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connect hook.
    pub fn add_connect<H: ConnectHook + 'static>(self, hook: H) -> Self {
        self.add_connect_arc(Arc::new(hook))
    }

    /// Add an Arc-wrapped connect hook.
    pub fn add_connect_arc(mut self, hook: Arc<dyn ConnectHook>) -> Self {
        self.connect_hooks.push(hook);
        self
    }

    /// Add a query hook.
    pub fn add_query<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_query_arc(Arc::new(hook))
    }

    /// Add an Arc-wrapped query hook.
    pub fn add_query_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.query_hooks.push(hook);
        self
    }

    /// Number of connect hooks.
    pub fn connect_len(&self) -> usize {
        self.connect_hooks.len()
    }

    /// Number of query hooks.
    pub fn query_len(&self) -> usize {
        self.query_hooks.len()
    }
}

impl ConnectHook for CompositeHook {
    fn on_connect(&self, ctx: &Context, err: Option<&DriverError>, duration: Duration) {
        for hook in &self.connect_hooks {
            hook.on_connect(ctx, err, duration);
        }
    }
}

impl QueryHook for CompositeHook {
    fn on_query(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
        err: Option<&DriverError>,
        duration: Duration,
    ) {
        for hook in &self.query_hooks {
            hook.on_query(ctx, query, args, err, duration);
        }
    }
}
