//! Error types for sqlwrap

use std::fmt;
use thiserror::Error;

/// Result type alias for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// An optional driver capability that is probed at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `ConnBeginTx`: begin a transaction with a context and options.
    BeginTx,
    /// `Pinger`: liveness check.
    Pinger,
    /// `Execer`: direct exec without a context.
    Execer,
    /// `ExecerContext`: direct exec with a context.
    ExecerContext,
    /// `Queryer`: direct query without a context.
    Queryer,
    /// `QueryerContext`: direct query with a context.
    QueryerContext,
    /// `RowsColumnTypeDatabaseTypeName`
    ColumnTypeDatabaseTypeName,
    /// `RowsColumnTypeLength`
    ColumnTypeLength,
    /// `RowsColumnTypePrecisionScale`
    ColumnTypePrecisionScale,
    /// `RowsColumnTypeScanType`
    ColumnTypeScanType,
    /// `RowsNextResultSet`
    NextResultSet,
}

impl Capability {
    /// Name of the capability trait.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::BeginTx => "ConnBeginTx",
            Capability::Pinger => "Pinger",
            Capability::Execer => "Execer",
            Capability::ExecerContext => "ExecerContext",
            Capability::Queryer => "Queryer",
            Capability::QueryerContext => "QueryerContext",
            Capability::ColumnTypeDatabaseTypeName => "RowsColumnTypeDatabaseTypeName",
            Capability::ColumnTypeLength => "RowsColumnTypeLength",
            Capability::ColumnTypePrecisionScale => "RowsColumnTypePrecisionScale",
            Capability::ColumnTypeScanType => "RowsColumnTypeScanType",
            Capability::NextResultSet => "RowsNextResultSet",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error types for driver operations
#[derive(Debug, Error)]
pub enum DriverError {
    /// The object does not implement an optional capability
    #[error("driver: {0} is not implemented")]
    Unsupported(Capability),

    /// The connection is unusable and should be discarded by the caller
    #[error("driver: bad connection")]
    BadConn,

    /// The fast path is not available; the caller should fall back
    #[error("driver: skip fast-path; continue as if unimplemented")]
    Skip,

    /// A single-row query returned no rows
    #[error("sql: no rows in result set")]
    NoRows,

    /// The context was cancelled
    #[error("context canceled")]
    Canceled,

    /// The context deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// A column index outside the row set
    #[error("column index {index} out of range ({columns} columns)")]
    ColumnIndex { index: usize, columns: usize },

    /// Error raised by the concrete driver
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Wrap an error produced by a concrete driver
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    /// Create a free-form error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if this is a capability mismatch
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Check if the connection should be discarded
    pub fn is_bad_conn(&self) -> bool {
        matches!(self, Self::BadConn)
    }

    /// Check if the caller should take the slow path
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// The capability that was missing, if this is a capability mismatch
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Self::Unsupported(capability) => Some(*capability),
            _ => None,
        }
    }
}
