//! Error types shared by every gridframe crate.
//!
//! Two layers of errors exist:
//!
//! - [`EngineError`] is raised by an engine implementation at the
//!   [`NetworkEngine`](crate::NetworkEngine) boundary (unknown element id,
//!   unknown column, read-only column, …).
//! - [`GridError`] is raised by the tabular layer. Engine errors are carried
//!   through it unmodified in [`GridError::Engine`].
//!
//! # Example
//!
//! ```ignore
//! use gridframe_core::{GridError, GridResult};
//!
//! fn set_base(value: f64) -> GridResult<()> {
//!     if value <= 0.0 {
//!         return Err(GridError::InvalidBase { value });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::category::ElementCategory;

/// Errors raised by an engine at the boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown network handle {0}")]
    UnknownNetwork(u64),

    #[error("{category} '{id}' not found")]
    UnknownElement {
        category: ElementCategory,
        id: String,
    },

    #[error("no connectable element '{0}'")]
    UnknownConnectable(String),

    #[error("{category} has no column '{column}'")]
    UnknownColumn {
        category: ElementCategory,
        column: String,
    },

    #[error("column '{column}' of {category} is read-only")]
    ReadOnlyColumn {
        category: ElementCategory,
        column: String,
    },

    /// Ids and values passed to a bulk write differ in length
    #[error("{ids} ids but {values} values for column '{column}'")]
    LengthMismatch {
        column: String,
        ids: usize,
        values: usize,
    },

    #[error("variant '{0}' not found")]
    UnknownVariant(String),

    #[error("variant '{0}' already exists")]
    VariantAlreadyExists(String),

    #[error("variant '{0}' is the working variant and cannot be removed")]
    CannotRemoveWorkingVariant(String),

    /// The engine could not read a network snapshot
    #[error("invalid network snapshot: {0}")]
    Snapshot(String),

    #[error("{0}")]
    Other(String),
}

/// Convenience alias for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the tabular layer.
#[derive(Error, Debug)]
pub enum GridError {
    /// Power base must be strictly positive
    #[error("invalid power base {value}: must be strictly positive")]
    InvalidBase { value: f64 },

    /// The schema oracle returned a type code this layer cannot dispatch
    #[error("unsupported series type {code}, element type: {category}, series_name: {column}")]
    UnsupportedSeriesType {
        category: ElementCategory,
        column: String,
        code: i32,
    },

    /// Column data does not match the declared type of the column
    #[error("column '{column}' of {category} is declared {declared} but {actual} values were given")]
    SeriesTypeMismatch {
        category: ElementCategory,
        column: String,
        declared: &'static str,
        actual: &'static str,
    },

    #[error("variant '{0}' not found")]
    UnknownVariant(String),

    #[error("variant '{0}' already exists")]
    VariantAlreadyExists(String),

    #[error("variant '{0}' is the working variant and cannot be removed")]
    CannotRemoveWorkingVariant(String),

    /// Malformed element table (ragged column, duplicate column, …)
    #[error("table error: {0}")]
    Table(String),

    /// Errors from the engine, passed through as-is
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_series_type_names_category_and_column() {
        let err = GridError::UnsupportedSeriesType {
            category: ElementCategory::Generator,
            column: "target_p".into(),
            code: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("generator"));
        assert!(msg.contains("target_p"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_engine_error_passes_through_unmodified() {
        let engine_err = EngineError::UnknownElement {
            category: ElementCategory::Load,
            id: "NOPE".into(),
        };
        let grid_err: GridError = engine_err.clone().into();
        assert_eq!(grid_err.to_string(), engine_err.to_string());
        assert!(matches!(grid_err, GridError::Engine(e) if e == engine_err));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> GridResult<()> {
            Err(GridError::InvalidBase { value: 0.0 })
        }

        fn outer() -> GridResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
