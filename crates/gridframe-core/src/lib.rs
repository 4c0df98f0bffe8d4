//! # gridframe-core: tables, bases and the engine boundary
//!
//! Shared building blocks of the gridframe workspace:
//!
//! - [`ElementCategory`] - the closed set of equipment classes exposed as tables
//! - [`ElementTable`] - rows keyed by element id, named typed columns
//! - [`SeriesType`] / [`ColumnSpec`] - declared column types and their engine codes
//! - [`units`] - unit newtypes and the per-unit base formulas
//! - [`NetworkEngine`] - the trait an engine implements to sit under the tabular layer
//! - [`GridError`] / [`EngineError`] - error types
//! - [`Diagnostics`] - lenient-path warnings collected during an operation
//!
//! ## Quick Start
//!
//! ```
//! use gridframe_core::{ElementTable, SeriesData};
//!
//! let table = ElementTable::from_ids(["LOAD"])
//!     .with_column("p0", SeriesData::Double(vec![600.0]))
//!     .unwrap();
//! assert_eq!(table.double("LOAD", "p0"), Some(600.0));
//! ```

pub mod boundary;
pub mod category;
pub mod diagnostics;
pub mod error;
pub mod series;
pub mod table;
pub mod units;

pub use boundary::{NetworkEngine, NetworkHandle, NetworkMetadata, INITIAL_VARIANT_ID};
pub use category::ElementCategory;
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{EngineError, EngineResult, GridError, GridResult};
pub use series::{ColumnSpec, SeriesType};
pub use table::{CellValue, ElementTable, RowKey, Series, SeriesData};
pub use units::{Kilovolts, MegavoltAmperes, PerUnitBases};
