use super::trace_unsupported;
use crate::driver::{
    self, Rows, RowsColumnTypeDatabaseTypeName, RowsColumnTypeLength,
    RowsColumnTypePrecisionScale, RowsColumnTypeScanType, RowsNextResultSet, Value, ValueKind,
};
use crate::error::DriverResult;

const PROXY: &str = "WrappedRows";

/// A row stream proxy.
///
/// `columns`, `next` and `close` are forwarded as-is. The five extended
/// capabilities are always advertised; calling one the wrapped rows lack
/// returns [`DriverError::Unsupported`](crate::DriverError::Unsupported).
pub struct WrappedRows {
    rows: Box<dyn Rows>,
}

impl WrappedRows {
    /// Wrap a row stream.
    pub fn new(rows: Box<dyn Rows>) -> Self {
        Self { rows }
    }

    pub(crate) fn boxed(rows: Box<dyn Rows>) -> Box<dyn Rows> {
        Box::new(Self::new(rows))
    }
}

impl Rows for WrappedRows {
    fn columns(&self) -> Vec<String> {
        self.rows.columns()
    }

    fn next(&mut self, dest: &mut [Value]) -> DriverResult<bool> {
        self.rows.next(dest)
    }

    fn close(&mut self) -> DriverResult<()> {
        self.rows.close()
    }

    fn as_column_type_database_type_name(&self) -> Option<&dyn RowsColumnTypeDatabaseTypeName> {
        Some(self)
    }

    fn as_column_type_length(&self) -> Option<&dyn RowsColumnTypeLength> {
        Some(self)
    }

    fn as_column_type_precision_scale(&self) -> Option<&dyn RowsColumnTypePrecisionScale> {
        Some(self)
    }

    fn as_column_type_scan_type(&self) -> Option<&dyn RowsColumnTypeScanType> {
        Some(self)
    }

    fn as_next_result_set(&mut self) -> Option<&mut dyn RowsNextResultSet> {
        Some(self)
    }
}

impl RowsColumnTypeDatabaseTypeName for WrappedRows {
    fn column_type_database_type_name(&self, index: usize) -> DriverResult<String> {
        trace_unsupported(
            driver::column_type_database_type_name(&*self.rows, index),
            PROXY,
        )
    }
}

impl RowsColumnTypeLength for WrappedRows {
    fn column_type_length(&self, index: usize) -> DriverResult<Option<u64>> {
        trace_unsupported(driver::column_type_length(&*self.rows, index), PROXY)
    }
}

impl RowsColumnTypePrecisionScale for WrappedRows {
    fn column_type_precision_scale(&self, index: usize) -> DriverResult<Option<(i64, i64)>> {
        trace_unsupported(
            driver::column_type_precision_scale(&*self.rows, index),
            PROXY,
        )
    }
}

impl RowsColumnTypeScanType for WrappedRows {
    fn column_type_scan_type(&self, index: usize) -> DriverResult<ValueKind> {
        trace_unsupported(driver::column_type_scan_type(&*self.rows, index), PROXY)
    }
}

impl RowsNextResultSet for WrappedRows {
    fn has_next_result_set(&mut self) -> DriverResult<bool> {
        trace_unsupported(driver::has_next_result_set(&mut *self.rows), PROXY)
    }

    fn next_result_set(&mut self) -> DriverResult<bool> {
        trace_unsupported(driver::next_result_set(&mut *self.rows), PROXY)
    }
}
