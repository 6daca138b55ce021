use super::types::QueryType;
use super::{ConnectHook, QueryHook, truncate_sql_bytes};
use crate::context::Context;
use crate::driver::NamedValue;
use crate::error::DriverError;
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based hook that emits one event per connect and per query.
///
/// Successful calls are emitted at [`TracingHook::level`], failed calls at
/// [`TracingHook::error_level`]. Events use the targets `sqlwrap.connect` and
/// `sqlwrap.sql`.
///
/// Bound parameters are not logged unless [`TracingHook::log_params`] is set.
#[derive(Debug, Clone)]
pub struct TracingHook {
    /// Level for successful calls.
    pub level: Level,
    /// Level for failed calls.
    pub error_level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Include bound parameters (as JSON) in query events.
    pub log_params: bool,
}

impl Default for TracingHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            error_level: Level::WARN,
            max_sql_length: Some(200),
            log_params: false,
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl TracingHook {
    /// Create a new hook with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the level for successful calls.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Override the level for failed calls.
    pub fn error_level(mut self, level: Level) -> Self {
        self.error_level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Include bound parameters in query events.
    pub fn log_params(mut self, enabled: bool) -> Self {
        self.log_params = enabled;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn render_params(&self, args: &[NamedValue]) -> Option<String> {
        if !self.log_params {
            return None;
        }
        Some(serde_json::to_string(args).unwrap_or_else(|e| format!("<unserializable: {e}>")))
    }

    fn level_for(&self, err: Option<&DriverError>) -> Level {
        if err.is_some() {
            self.error_level
        } else {
            self.level
        }
    }
}

impl ConnectHook for TracingHook {
    fn on_connect(&self, ctx: &Context, err: Option<&DriverError>, duration: Duration) {
        let fields = tracing::field::debug(ctx.fields());
        emit_at_level!(
            self.level_for(err),
            target: "sqlwrap.connect",
            ?duration,
            error = err.map(tracing::field::display),
            fields = fields,
            "connect"
        );
    }
}

impl QueryHook for TracingHook {
    fn on_query(
        &self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
        err: Option<&DriverError>,
        duration: Duration,
    ) {
        let sql = self.truncate_sql(query);
        let params = self.render_params(args);
        let fields = tracing::field::debug(ctx.fields());
        emit_at_level!(
            self.level_for(err),
            target: "sqlwrap.sql",
            query_type = ?QueryType::from_sql(query),
            param_count = args.len(),
            ?duration,
            sql = %sql,
            params = params.as_deref(),
            error = err.map(tracing::field::display),
            fields = fields,
            "query"
        );
    }
}
