use super::types::QueryType;
use super::{ConnectHook, QueryHook};
use crate::context::Context;
use crate::driver::NamedValue;
use crate::error::DriverError;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A hook that counts connects and queries.
///
/// Register the same `Arc<StatsHook>` as both connect and query hook to get a
/// full picture.
#[derive(Debug, Default)]
pub struct StatsHook {
    connects: AtomicU64,
    failed_connects: AtomicU64,
    connect_duration_nanos: AtomicU64,
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    total_duration_nanos: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_query: Mutex<Option<String>>,
}

/// Snapshot of [`StatsHook`] counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookStats {
    /// Connect attempts.
    pub connects: u64,
    /// Connect attempts that failed.
    pub failed_connects: u64,
    /// Total time spent in the driver's connect.
    pub connect_duration: Duration,
    /// Context-aware queries.
    pub total_queries: u64,
    /// Context-aware queries that failed.
    pub failed_queries: u64,
    /// Total time spent in the driver's query.
    pub total_duration: Duration,
    /// Number of SELECT queries.
    pub select_count: u64,
    /// Number of INSERT queries.
    pub insert_count: u64,
    /// Number of UPDATE queries.
    pub update_count: u64,
    /// Number of DELETE queries.
    pub delete_count: u64,
    /// Slowest query duration.
    pub max_duration: Duration,
    /// Slowest query text.
    pub slowest_query: Option<String>,
}

fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

// Saturate instead of wrapping on overflow.
fn saturating_add(counter: &AtomicU64, nanos: u64) {
    let prev = counter.fetch_add(nanos, Ordering::Relaxed);
    if prev.checked_add(nanos).is_none() {
        counter.store(u64::MAX, Ordering::Relaxed);
    }
}

impl StatsHook {
    /// Create a new stats hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> HookStats {
        HookStats {
            connects: self.connects.load(Ordering::Relaxed),
            failed_connects: self.failed_connects.load(Ordering::Relaxed),
            connect_duration: Duration::from_nanos(
                self.connect_duration_nanos.load(Ordering::Relaxed),
            ),
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self
                .slowest_query
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        for counter in [
            &self.connects,
            &self.failed_connects,
            &self.connect_duration_nanos,
            &self.total_queries,
            &self.failed_queries,
            &self.total_duration_nanos,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        *self.slowest_query.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl ConnectHook for StatsHook {
    fn on_connect(&self, _ctx: &Context, err: Option<&DriverError>, duration: Duration) {
        self.connects.fetch_add(1, Ordering::Relaxed);
        if err.is_some() {
            self.failed_connects.fetch_add(1, Ordering::Relaxed);
        }
        saturating_add(&self.connect_duration_nanos, as_nanos(duration));
    }
}

impl QueryHook for StatsHook {
    fn on_query(
        &self,
        _ctx: &Context,
        query: &str,
        _args: &[NamedValue],
        err: Option<&DriverError>,
        duration: Duration,
    ) {
        let nanos = as_nanos(duration);

        self.total_queries.fetch_add(1, Ordering::Relaxed);
        saturating_add(&self.total_duration_nanos, nanos);

        let counter = match QueryType::from_sql(query) {
            QueryType::Select => Some(&self.select_count),
            QueryType::Insert => Some(&self.insert_count),
            QueryType::Update => Some(&self.update_count),
            QueryType::Delete => Some(&self.delete_count),
            QueryType::Other => None,
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        if err.is_some() {
            self.failed_queries.fetch_add(1, Ordering::Relaxed);
        }

        // Only the query that becomes the new max records its text.
        let mut current_max = self.max_duration_nanos.load(Ordering::Relaxed);
        while nanos > current_max {
            match self.max_duration_nanos.compare_exchange_weak(
                current_max,
                nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    *self.slowest_query.lock().unwrap_or_else(|e| e.into_inner()) =
                        Some(query.to_string());
                    break;
                }
                Err(updated) => current_max = updated,
            }
        }
    }
}
