//! Engine error types.
//!
//! The engine is pure computation over in-memory tables, so there is exactly
//! one way for it to fail: a present column whose values cannot be coerced.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Data coercion failed for {table}.{column} at row {row}: {value:?} is not numeric")]
    DataCoercion {
        table: String,
        column: String,
        row: usize,
        value: String,
    },
}

impl EngineError {
    /// `table.column` of the offending column.
    pub fn column_path(&self) -> String {
        match self {
            EngineError::DataCoercion { table, column, .. } => format!("{}.{}", table, column),
        }
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
