//! Request-scoped context passed to context-aware driver operations.
//!
//! A [`Context`] carries an optional deadline, a cancellation token and a
//! small set of string fields. Derived contexts get a child token: cancelling
//! a parent cancels its children, never the other way round. Proxies hand it
//! to the delegate and to hooks as-is; they never create or modify one.

use crate::error::DriverError;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Deadline, cancellation and request-scoped fields for one operation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancellationToken,
    fields: BTreeMap<String, String>,
}

impl Context {
    /// An empty context: no deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose deadline is `timeout` from now.
    ///
    /// An earlier deadline already present on `self` is kept. A timeout too
    /// large to represent leaves the deadline as it was.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.derive(self.deadline),
        }
    }

    /// Derive a context with the given deadline (the earlier one wins).
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        self.derive(Some(deadline))
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        Self {
            deadline,
            cancel: self.cancel.child_token(),
            fields: self.fields.clone(),
        }
    }

    /// Add a field (low-cardinality, e.g. a request tag).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// All fields, ordered by key.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context, its clones and every context derived from it.
    ///
    /// The context this one was derived from stays live.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether this context or one of its ancestors was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Why this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<DriverError> {
        if self.is_cancelled() {
            return Some(DriverError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(DriverError::DeadlineExceeded),
            _ => None,
        }
    }
}
