//! The seam between the tabular layer and a network engine.
//!
//! An engine owns network instances and their variants. The tabular layer only
//! ever holds a [`NetworkHandle`] and talks to the engine through the
//! [`NetworkEngine`] trait, so any engine that can answer these calls can sit
//! underneath it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::ElementCategory;
use crate::error::EngineResult;
use crate::series::ColumnSpec;
use crate::table::{ElementTable, RowKey};

/// Name of the variant every network starts with.
pub const INITIAL_VARIANT_ID: &str = "InitialState";

/// Opaque reference to a network instance owned by an engine.
///
/// Neither `Clone` nor `Copy`: exactly one owner releases it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NetworkHandle(u64);

impl NetworkHandle {
    /// Only engines mint handles.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "network#{}", self.0)
    }
}

/// Descriptive attributes of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetadata {
    pub id: String,
    pub name: String,
    pub source_format: String,
    pub case_date: DateTime<Utc>,
    /// Minutes between case date and forecast target
    pub forecast_distance: i64,
}

/// Operations an engine must provide.
///
/// Every element table returned by [`element_table`](Self::element_table) is
/// expressed in SI units (MW, Mvar, kV, A, Ω, S) and reflects the working
/// variant of the handle.
pub trait NetworkEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    // ---------------------------------------------------------------
    // Network lifecycle
    // ---------------------------------------------------------------

    fn create_network(&self, id: &str) -> EngineResult<NetworkHandle>;

    /// Rebuild a network from the engine's own snapshot format.
    fn load_network_from_str(&self, snapshot: &str) -> EngineResult<NetworkHandle>;

    fn dump_network_to_string(&self, handle: &NetworkHandle) -> EngineResult<String>;

    /// Free the network. Takes the handle by value so it cannot be reused.
    fn release_network(&self, handle: NetworkHandle) -> EngineResult<()>;

    fn metadata(&self, handle: &NetworkHandle) -> EngineResult<NetworkMetadata>;

    // ---------------------------------------------------------------
    // Tables and schema
    // ---------------------------------------------------------------

    fn element_table(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
    ) -> EngineResult<ElementTable>;

    /// Declared type code of a column (0 string, 1 double, 2 integer, 3 boolean).
    fn series_type(&self, category: ElementCategory, column: &str) -> EngineResult<i32>;

    fn columns(&self, category: ElementCategory) -> Vec<ColumnSpec>;

    // ---------------------------------------------------------------
    // Typed bulk writes
    // ---------------------------------------------------------------

    fn write_string_series(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[String],
    ) -> EngineResult<()>;

    /// Integer primitive, also used for boolean columns (0/1).
    fn write_int_series(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[i64],
    ) -> EngineResult<()>;

    fn write_double_series(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[f64],
    ) -> EngineResult<()>;

    // ---------------------------------------------------------------
    // Variants
    // ---------------------------------------------------------------

    fn working_variant(&self, handle: &NetworkHandle) -> EngineResult<String>;

    fn set_working_variant(&self, handle: &NetworkHandle, variant: &str) -> EngineResult<()>;

    fn clone_variant(
        &self,
        handle: &NetworkHandle,
        src: &str,
        target: &str,
        may_overwrite: bool,
    ) -> EngineResult<()>;

    fn remove_variant(&self, handle: &NetworkHandle, variant: &str) -> EngineResult<()>;

    fn variant_ids(&self, handle: &NetworkHandle) -> EngineResult<Vec<String>>;

    // ---------------------------------------------------------------
    // Topology toggles
    // ---------------------------------------------------------------

    /// Returns whether the switch changed position.
    fn update_switch_position(
        &self,
        handle: &NetworkHandle,
        switch_id: &str,
        open: bool,
    ) -> EngineResult<bool>;

    /// Returns whether any terminal of the connectable changed state.
    fn update_connectable_status(
        &self,
        handle: &NetworkHandle,
        connectable_id: &str,
        connected: bool,
    ) -> EngineResult<bool>;
}
