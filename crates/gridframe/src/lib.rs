//! # gridframe: electrical networks as tables
//!
//! [`Network`] exposes every element category of an engine-owned network as an
//! [`ElementTable`], accepts bulk updates of any subset of rows and columns,
//! and can express all physical quantities in per-unit.
//!
//! ## Data flow
//!
//! - **read**: engine table (SI) → per-unit [`pipeline`] when active → caller
//! - **write**: caller table → inverse [`pipeline`] when active → typed
//!   [`accessor`] dispatch, one engine primitive per column
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use gridframe::{ElementTable, Network, SeriesData};
//! use gridframe_engine::{fixtures, MemoryEngine};
//!
//! let engine = Arc::new(MemoryEngine::new());
//! let handle = fixtures::eurostag_example(&engine).unwrap();
//! let mut network = Network::from_handle(engine, handle);
//!
//! network.set_power_base(100.0).unwrap();
//! network.activate_per_unit();
//! let loads = network.get_loads().unwrap();
//! assert!((loads.double("LOAD", "p0").unwrap() - 6.0).abs() < 1e-12);
//!
//! let update = ElementTable::from_ids(["LOAD"])
//!     .with_column("p0", SeriesData::Double(vec![5.0]))
//!     .unwrap();
//! network.update_loads(&update).unwrap();
//!
//! network.deactivate_per_unit();
//! assert_eq!(network.get_loads().unwrap().double("LOAD", "p0"), Some(500.0));
//! ```

pub mod accessor;
pub mod network;
pub mod per_unit;
pub mod pipeline;
pub mod rules;
pub mod variants;

pub use network::{ElementFilter, Network};
pub use per_unit::PerUnitContext;
pub use variants::VariantManager;

pub use gridframe_core::{
    CellValue, ColumnSpec, Diagnostics, ElementCategory, ElementTable, EngineError, EngineResult,
    GridError, GridResult, NetworkEngine, NetworkHandle, NetworkMetadata, RowKey, SeriesData, SeriesType,
    INITIAL_VARIANT_ID,
};
