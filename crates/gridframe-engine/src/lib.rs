//! # gridframe-engine: in-memory reference engine
//!
//! [`MemoryEngine`] implements [`gridframe_core::NetworkEngine`] entirely in
//! memory: a static column schema per category, variants as full copies of
//! the element tables, typed bulk writes and a JSON snapshot format.
//!
//! ```
//! use gridframe_core::{ElementCategory, NetworkEngine};
//! use gridframe_engine::{fixtures, MemoryEngine};
//!
//! let engine = MemoryEngine::new();
//! let handle = fixtures::eurostag_example(&engine).unwrap();
//! let loads = engine.element_table(&handle, ElementCategory::Load).unwrap();
//! assert_eq!(loads.double("LOAD", "p0"), Some(600.0));
//! ```

pub mod fixtures;
pub mod memory;
pub mod schema;

pub use memory::{MemoryEngine, SNAPSHOT_FORMAT_VERSION};
pub use schema::{column_def, schema, ColumnDef};
