//! In-memory network engine.
//!
//! Every network is a set of named variants; a variant is one element table
//! per category, shaped by [`schema`](crate::schema::schema). Networks live in
//! a handle map guarded by a [`parking_lot::RwLock`], so distinct handles can
//! be used from different threads.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use gridframe_core::{
    CellValue, ColumnSpec, ElementCategory, ElementTable, EngineError, EngineResult, GridError,
    NetworkEngine, NetworkHandle, NetworkMetadata, RowKey, SeriesData, SeriesType,
    INITIAL_VARIANT_ID,
};

use crate::schema::{column_def, connection_columns, schema};

/// Version written into every snapshot.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

type Tables = BTreeMap<ElementCategory, ElementTable>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Variant {
    id: String,
    tables: Tables,
}

/// State of one network: metadata plus its variants, in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NetworkState {
    format_version: u32,
    metadata: NetworkMetadata,
    working_variant: String,
    variants: Vec<Variant>,
}

fn table_error(err: GridError) -> EngineError {
    EngineError::Other(err.to_string())
}

fn empty_table(category: ElementCategory) -> EngineResult<ElementTable> {
    let mut table = ElementTable::new(Vec::new());
    for col in schema(category) {
        table
            .insert_column(col.name, SeriesData::empty(col.series_type))
            .map_err(table_error)?;
    }
    Ok(table)
}

fn empty_tables() -> EngineResult<Tables> {
    ElementCategory::ALL
        .iter()
        .map(|&category| Ok((category, empty_table(category)?)))
        .collect()
}

fn default_cell(series_type: SeriesType) -> CellValue {
    match series_type {
        SeriesType::String => CellValue::String(String::new()),
        SeriesType::Double => CellValue::Double(f64::NAN),
        SeriesType::Int => CellValue::Int(0),
        SeriesType::Boolean => CellValue::Boolean(false),
    }
}

impl NetworkState {
    fn new(metadata: NetworkMetadata) -> EngineResult<Self> {
        Ok(Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            metadata,
            working_variant: INITIAL_VARIANT_ID.to_string(),
            variants: vec![Variant {
                id: INITIAL_VARIANT_ID.to_string(),
                tables: empty_tables()?,
            }],
        })
    }

    fn variant_position(&self, id: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.id == id)
    }

    fn working_tables(&self) -> EngineResult<&Tables> {
        self.variants
            .iter()
            .find(|v| v.id == self.working_variant)
            .map(|v| &v.tables)
            .ok_or_else(|| EngineError::UnknownVariant(self.working_variant.clone()))
    }

    fn working_table_mut(&mut self, category: ElementCategory) -> EngineResult<&mut ElementTable> {
        let working = self.working_variant.clone();
        let variant = self
            .variants
            .iter_mut()
            .find(|v| v.id == working)
            .ok_or(EngineError::UnknownVariant(working))?;
        if !variant.tables.contains_key(&category) {
            variant.tables.insert(category, empty_table(category)?);
        }
        variant
            .tables
            .get_mut(&category)
            .ok_or_else(|| EngineError::Other(format!("no {} table", category)))
    }

    /// Check a deserialized state against the schema.
    fn validate(mut self) -> EngineResult<Self> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(EngineError::Snapshot(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }
        if self.variant_position(&self.working_variant).is_none() {
            return Err(EngineError::Snapshot(format!(
                "working variant '{}' is not among the variants",
                self.working_variant
            )));
        }
        for variant in &mut self.variants {
            for category in ElementCategory::ALL {
                if !variant.tables.contains_key(&category) {
                    variant.tables.insert(category, empty_table(category)?);
                    continue;
                }
                let table = &variant.tables[&category];
                let expected: Vec<(&str, SeriesType)> = schema(category)
                    .iter()
                    .map(|c| (c.name, c.series_type))
                    .collect();
                let actual: Vec<(&str, SeriesType)> = table
                    .columns()
                    .iter()
                    .map(|s| (s.name.as_str(), s.data.series_type()))
                    .collect();
                if expected != actual {
                    return Err(EngineError::Snapshot(format!(
                        "{} table of variant '{}' does not match the schema",
                        category, variant.id
                    )));
                }
                if table.columns().iter().any(|s| s.data.len() != table.len()) {
                    return Err(EngineError::Snapshot(format!(
                        "{} table of variant '{}' has ragged columns",
                        category, variant.id
                    )));
                }
            }
        }
        Ok(self)
    }
}

/// Reference engine keeping every network in memory.
pub struct MemoryEngine {
    networks: RwLock<HashMap<u64, NetworkState>>,
    next_handle: AtomicU64,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            networks: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Number of networks currently held.
    pub fn network_count(&self) -> usize {
        self.networks.read().len()
    }

    fn register(&self, state: NetworkState) -> NetworkHandle {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        info!(handle = raw, network = %state.metadata.id, "network registered");
        self.networks.write().insert(raw, state);
        NetworkHandle::from_raw(raw)
    }

    fn with_state<T>(
        &self,
        handle: &NetworkHandle,
        f: impl FnOnce(&NetworkState) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let networks = self.networks.read();
        let state = networks
            .get(&handle.raw())
            .ok_or(EngineError::UnknownNetwork(handle.raw()))?;
        f(state)
    }

    fn with_state_mut<T>(
        &self,
        handle: &NetworkHandle,
        f: impl FnOnce(&mut NetworkState) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut networks = self.networks.write();
        let state = networks
            .get_mut(&handle.raw())
            .ok_or(EngineError::UnknownNetwork(handle.raw()))?;
        f(state)
    }

    pub fn set_metadata(&self, handle: &NetworkHandle, metadata: NetworkMetadata) -> EngineResult<()> {
        self.with_state_mut(handle, |state| {
            state.metadata = metadata;
            Ok(())
        })
    }

    /// Append an element to the working variant.
    ///
    /// Columns not listed in `values` get a missing value (NaN, empty string,
    /// 0 or false).
    pub fn add_element(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        key: RowKey,
        values: &[(&str, CellValue)],
    ) -> EngineResult<()> {
        if category.has_composite_key() != key.num.is_some() {
            return Err(EngineError::Other(format!(
                "row key '{}' does not fit the {} key shape",
                key, category
            )));
        }
        for (name, value) in values {
            let def = column_def(category, name).ok_or_else(|| EngineError::UnknownColumn {
                category,
                column: name.to_string(),
            })?;
            if def.series_type != value.series_type() {
                return Err(EngineError::Other(format!(
                    "column '{}' of {} is declared {} but got a {} value",
                    name,
                    category,
                    def.series_type.as_str(),
                    value.series_type().as_str()
                )));
            }
        }
        let cells: Vec<CellValue> = schema(category)
            .iter()
            .map(|col| {
                values
                    .iter()
                    .find(|(name, _)| *name == col.name)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_else(|| default_cell(col.series_type))
            })
            .collect();

        self.with_state_mut(handle, |state| {
            state
                .working_table_mut(category)?
                .push_row(key, cells)
                .map_err(table_error)
        })
    }

    /// Shared body of the typed write primitives.
    fn write_cells<T>(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[T],
        to_cell: impl Fn(&T) -> CellValue,
    ) -> EngineResult<()> {
        let def = column_def(category, column).ok_or_else(|| EngineError::UnknownColumn {
            category,
            column: column.to_string(),
        })?;
        if !def.writable {
            return Err(EngineError::ReadOnlyColumn {
                category,
                column: column.to_string(),
            });
        }
        if ids.len() != values.len() {
            return Err(EngineError::LengthMismatch {
                column: column.to_string(),
                ids: ids.len(),
                values: values.len(),
            });
        }

        self.with_state_mut(handle, |state| {
            let table = state.working_table_mut(category)?;
            // resolve every id before touching the column
            let positions = ids
                .iter()
                .map(|key| {
                    table.position(key).ok_or_else(|| EngineError::UnknownElement {
                        category,
                        id: key.to_string(),
                    })
                })
                .collect::<EngineResult<Vec<_>>>()?;
            let series = table
                .column_mut(column)
                .ok_or_else(|| EngineError::UnknownColumn {
                    category,
                    column: column.to_string(),
                })?;
            for (position, value) in positions.into_iter().zip(values) {
                series.data.set(position, to_cell(value)).map_err(table_error)?;
            }
            debug!(%category, column, rows = ids.len(), "column written");
            Ok(())
        })
    }

    fn expect_type(
        category: ElementCategory,
        column: &str,
        accepted: &[SeriesType],
        primitive: &str,
    ) -> EngineResult<SeriesType> {
        let def = column_def(category, column).ok_or_else(|| EngineError::UnknownColumn {
            category,
            column: column.to_string(),
        })?;
        if accepted.contains(&def.series_type) {
            Ok(def.series_type)
        } else {
            Err(EngineError::Other(format!(
                "column '{}' of {} is declared {}; the {} primitive cannot write it",
                column,
                category,
                def.series_type.as_str(),
                primitive
            )))
        }
    }
}

impl NetworkEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create_network(&self, id: &str) -> EngineResult<NetworkHandle> {
        let metadata = NetworkMetadata {
            id: id.to_string(),
            name: id.to_string(),
            source_format: String::new(),
            case_date: Utc::now(),
            forecast_distance: 0,
        };
        Ok(self.register(NetworkState::new(metadata)?))
    }

    fn load_network_from_str(&self, snapshot: &str) -> EngineResult<NetworkHandle> {
        let state: NetworkState =
            serde_json::from_str(snapshot).map_err(|e| EngineError::Snapshot(e.to_string()))?;
        Ok(self.register(state.validate()?))
    }

    fn dump_network_to_string(&self, handle: &NetworkHandle) -> EngineResult<String> {
        self.with_state(handle, |state| {
            serde_json::to_string_pretty(state).map_err(|e| EngineError::Snapshot(e.to_string()))
        })
    }

    fn release_network(&self, handle: NetworkHandle) -> EngineResult<()> {
        self.networks
            .write()
            .remove(&handle.raw())
            .ok_or(EngineError::UnknownNetwork(handle.raw()))?;
        info!(handle = handle.raw(), "network released");
        Ok(())
    }

    fn metadata(&self, handle: &NetworkHandle) -> EngineResult<NetworkMetadata> {
        self.with_state(handle, |state| Ok(state.metadata.clone()))
    }

    fn element_table(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
    ) -> EngineResult<ElementTable> {
        self.with_state(handle, |state| match state.working_tables()?.get(&category) {
            Some(table) => Ok(table.clone()),
            None => empty_table(category),
        })
    }

    fn series_type(&self, category: ElementCategory, column: &str) -> EngineResult<i32> {
        column_def(category, column)
            .map(|c| c.series_type.code())
            .ok_or_else(|| EngineError::UnknownColumn {
                category,
                column: column.to_string(),
            })
    }

    fn columns(&self, category: ElementCategory) -> Vec<ColumnSpec> {
        schema(category).iter().map(|c| c.spec()).collect()
    }

    fn write_string_series(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[String],
    ) -> EngineResult<()> {
        Self::expect_type(category, column, &[SeriesType::String], "string")?;
        self.write_cells(handle, category, column, ids, values, |v| {
            CellValue::String(v.clone())
        })
    }

    fn write_int_series(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[i64],
    ) -> EngineResult<()> {
        match Self::expect_type(
            category,
            column,
            &[SeriesType::Int, SeriesType::Boolean],
            "integer",
        )? {
            SeriesType::Boolean => {
                self.write_cells(handle, category, column, ids, values, |v| {
                    CellValue::Boolean(*v != 0)
                })
            }
            _ => self.write_cells(handle, category, column, ids, values, |v| CellValue::Int(*v)),
        }
    }

    fn write_double_series(
        &self,
        handle: &NetworkHandle,
        category: ElementCategory,
        column: &str,
        ids: &[RowKey],
        values: &[f64],
    ) -> EngineResult<()> {
        Self::expect_type(category, column, &[SeriesType::Double], "double")?;
        self.write_cells(handle, category, column, ids, values, |v| CellValue::Double(*v))
    }

    fn working_variant(&self, handle: &NetworkHandle) -> EngineResult<String> {
        self.with_state(handle, |state| Ok(state.working_variant.clone()))
    }

    fn set_working_variant(&self, handle: &NetworkHandle, variant: &str) -> EngineResult<()> {
        self.with_state_mut(handle, |state| {
            if state.variant_position(variant).is_none() {
                return Err(EngineError::UnknownVariant(variant.to_string()));
            }
            state.working_variant = variant.to_string();
            Ok(())
        })
    }

    fn clone_variant(
        &self,
        handle: &NetworkHandle,
        src: &str,
        target: &str,
        may_overwrite: bool,
    ) -> EngineResult<()> {
        self.with_state_mut(handle, |state| {
            let tables = state
                .variants
                .iter()
                .find(|v| v.id == src)
                .map(|v| v.tables.clone())
                .ok_or_else(|| EngineError::UnknownVariant(src.to_string()))?;
            match state.variant_position(target) {
                Some(_) if !may_overwrite => {
                    Err(EngineError::VariantAlreadyExists(target.to_string()))
                }
                Some(position) => {
                    state.variants[position].tables = tables;
                    Ok(())
                }
                None => {
                    state.variants.push(Variant {
                        id: target.to_string(),
                        tables,
                    });
                    Ok(())
                }
            }
        })
    }

    fn remove_variant(&self, handle: &NetworkHandle, variant: &str) -> EngineResult<()> {
        self.with_state_mut(handle, |state| {
            let position = state
                .variant_position(variant)
                .ok_or_else(|| EngineError::UnknownVariant(variant.to_string()))?;
            if state.working_variant == variant {
                return Err(EngineError::CannotRemoveWorkingVariant(variant.to_string()));
            }
            state.variants.remove(position);
            Ok(())
        })
    }

    fn variant_ids(&self, handle: &NetworkHandle) -> EngineResult<Vec<String>> {
        self.with_state(handle, |state| {
            Ok(state.variants.iter().map(|v| v.id.clone()).collect())
        })
    }

    fn update_switch_position(
        &self,
        handle: &NetworkHandle,
        switch_id: &str,
        open: bool,
    ) -> EngineResult<bool> {
        self.with_state_mut(handle, |state| {
            let table = state.working_table_mut(ElementCategory::Switch)?;
            let key = RowKey::id(switch_id);
            let unknown = || EngineError::UnknownElement {
                category: ElementCategory::Switch,
                id: switch_id.to_string(),
            };
            let current = table.cell(&key, "open").ok_or_else(unknown)?;
            if current == CellValue::Boolean(open) {
                return Ok(false);
            }
            table
                .set_cell(&key, "open", CellValue::Boolean(open))
                .map_err(table_error)?;
            Ok(true)
        })
    }

    fn update_connectable_status(
        &self,
        handle: &NetworkHandle,
        connectable_id: &str,
        connected: bool,
    ) -> EngineResult<bool> {
        self.with_state_mut(handle, |state| {
            let key = RowKey::id(connectable_id);
            for category in ElementCategory::ALL {
                let columns: Vec<&str> = connection_columns(category).collect();
                if columns.is_empty() {
                    continue;
                }
                let table = state.working_table_mut(category)?;
                if table.position(&key).is_none() {
                    continue;
                }
                let mut changed = false;
                for column in columns {
                    if table.cell(&key, column) != Some(CellValue::Boolean(connected)) {
                        table
                            .set_cell(&key, column, CellValue::Boolean(connected))
                            .map_err(table_error)?;
                        changed = true;
                    }
                }
                return Ok(changed);
            }
            Err(EngineError::UnknownConnectable(connectable_id.to_string()))
        })
    }
}
