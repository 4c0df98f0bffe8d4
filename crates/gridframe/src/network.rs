//! The tabular facade over one engine-owned network.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use gridframe_core::{
    ColumnSpec, Diagnostics, ElementCategory, ElementTable, GridError, GridResult, NetworkEngine,
    NetworkHandle, NetworkMetadata, RowKey,
};
use tracing::{info, warn};

use crate::accessor;
use crate::per_unit::PerUnitContext;
use crate::pipeline::{self, Direction, VoltageLevelBases};
use crate::rules;
use crate::variants::VariantManager;

/// Restricts [`Network::get_elements_ids`].
///
/// An element passes when one of the voltage levels it is attached to
/// satisfies every criterion set. Elements attached to no voltage level only
/// pass an empty filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementFilter {
    /// Nominal voltages (kV) to keep
    pub nominal_voltages: Option<Vec<f64>>,
    /// Substation countries to keep
    pub countries: Option<Vec<String>>,
}

impl ElementFilter {
    pub fn nominal_voltages(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            nominal_voltages: Some(values.into_iter().collect()),
            countries: None,
        }
    }

    pub fn countries<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            nominal_voltages: None,
            countries: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nominal_voltages.is_none() && self.countries.is_none()
    }
}

/// A network seen as tables.
///
/// Owns its handle and releases it on drop. Reads take `&self`; anything that
/// changes the network or its per-unit settings takes `&mut self`.
pub struct Network<E: NetworkEngine> {
    engine: Arc<E>,
    handle: Option<NetworkHandle>,
    per_unit: PerUnitContext,
    missing_bases: Cell<usize>,
    last_diagnostics: RefCell<Diagnostics>,
}

impl<E: NetworkEngine> Network<E> {
    /// Take ownership of a handle created by `engine`.
    pub fn from_handle(engine: Arc<E>, handle: NetworkHandle) -> Self {
        Self {
            engine,
            handle: Some(handle),
            per_unit: PerUnitContext::default(),
            missing_bases: Cell::new(0),
            last_diagnostics: RefCell::new(Diagnostics::new()),
        }
    }

    pub fn create_empty(engine: Arc<E>, id: &str) -> GridResult<Self> {
        let handle = engine.create_network(id)?;
        Ok(Self::from_handle(engine, handle))
    }

    /// Rebuild a network from a [`dump_to_string`](Self::dump_to_string) snapshot.
    pub fn load_from_str(engine: Arc<E>, snapshot: &str) -> GridResult<Self> {
        let handle = engine.load_network_from_str(snapshot)?;
        Ok(Self::from_handle(engine, handle))
    }

    pub fn dump_to_string(&self) -> GridResult<String> {
        Ok(self.engine.dump_network_to_string(self.handle()?)?)
    }

    /// Release the network now, reporting engine errors instead of logging them.
    pub fn close(mut self) -> GridResult<()> {
        match self.handle.take() {
            Some(handle) => Ok(self.engine.release_network(handle)?),
            None => Ok(()),
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    fn handle(&self) -> GridResult<&NetworkHandle> {
        self.handle
            .as_ref()
            .ok_or_else(|| GridError::Other("network already released".to_string()))
    }

    pub fn metadata(&self) -> GridResult<NetworkMetadata> {
        Ok(self.engine.metadata(self.handle()?)?)
    }

    /// Declared columns of a category.
    pub fn columns(&self, category: ElementCategory) -> Vec<ColumnSpec> {
        self.engine.columns(category)
    }

    // =========================================================================
    // Per-unit
    // =========================================================================

    pub fn activate_per_unit(&mut self) {
        self.per_unit.enable();
        info!(power_base = self.per_unit.power_base(), "per-unit activated");
    }

    pub fn deactivate_per_unit(&mut self) {
        self.per_unit.disable();
        info!("per-unit deactivated");
    }

    pub fn is_per_unit(&self) -> bool {
        self.per_unit.is_enabled()
    }

    /// Set the power base (MVA). Fails with [`GridError::InvalidBase`] unless
    /// the value is finite and strictly positive.
    pub fn set_power_base(&mut self, value: f64) -> GridResult<()> {
        self.per_unit.set_power_base(value)?;
        info!(power_base = value, "power base set");
        Ok(())
    }

    pub fn power_base(&self) -> f64 {
        self.per_unit.power_base()
    }

    /// Cells set to NaN so far because their voltage base could not be found.
    pub fn missing_base_count(&self) -> usize {
        self.missing_bases.get()
    }

    /// Diagnostics of the most recent get or update.
    pub fn last_diagnostics(&self) -> Diagnostics {
        self.last_diagnostics.borrow().clone()
    }

    fn voltage_level_bases(&self, category: ElementCategory) -> GridResult<VoltageLevelBases> {
        if !rules::needs_voltage_levels(category) {
            return Ok(VoltageLevelBases::default());
        }
        let raw = accessor::read_table(&*self.engine, self.handle()?, ElementCategory::VoltageLevel)?;
        Ok(VoltageLevelBases::from_table(&raw))
    }

    fn record(&self, report: pipeline::ConversionReport) {
        self.missing_bases
            .set(self.missing_bases.get() + report.missing_bases);
        *self.last_diagnostics.borrow_mut() = report.diagnostics;
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Table of a category for the working variant, in per-unit when active.
    pub fn get_elements(&self, category: ElementCategory) -> GridResult<ElementTable> {
        let mut table = accessor::read_table(&*self.engine, self.handle()?, category)?;
        if self.per_unit.is_enabled() {
            let bases = self.voltage_level_bases(category)?;
            let report = pipeline::convert(
                &self.per_unit,
                category,
                &mut table,
                &bases,
                Direction::ToPerUnit,
            );
            self.record(report);
        } else {
            self.last_diagnostics.borrow_mut().clear();
        }
        Ok(table)
    }

    /// Write the columns of `table` to the elements named by its index.
    ///
    /// `table` may hold any subset of rows and writable columns. In per-unit
    /// mode its values are converted back to SI first; base-source columns it
    /// lacks are looked up in the engine and never written back. Rows whose
    /// voltage base cannot be resolved are left untouched in the engine and
    /// reported like on the read path. Rows the engine does not know are
    /// still dispatched so that it rejects them.
    pub fn update_elements(&mut self, category: ElementCategory, table: &ElementTable) -> GridResult<()> {
        let handle = self.handle()?;
        if !self.per_unit.is_enabled() {
            self.last_diagnostics.borrow_mut().clear();
            return accessor::write_table(&*self.engine, handle, category, table);
        }

        let mut scaled = table.clone();
        let needed = rules::base_columns(category, table.column_names());
        let mut raw = None;
        let joined = if needed.is_empty() {
            Vec::new()
        } else {
            let source = accessor::read_table(&*self.engine, handle, category)?;
            let added = scaled.join_columns(&source, &needed)?;
            raw = Some(source);
            added
        };

        let bases = self.voltage_level_bases(category)?;
        let report = pipeline::convert(
            &self.per_unit,
            category,
            &mut scaled,
            &bases,
            Direction::FromPerUnit,
        );

        for column in &joined {
            scaled.remove_column(column);
        }

        if !report.unresolved.is_empty() {
            let raw = match raw {
                Some(raw) => raw,
                None => accessor::read_table(&*self.engine, handle, category)?,
            };
            let known: HashSet<&RowKey> = raw.index().iter().collect();
            let skipped: HashSet<&RowKey> = report
                .unresolved
                .iter()
                .filter(|key| known.contains(key))
                .collect();
            if !skipped.is_empty() {
                warn!(%category, rows = skipped.len(), "skipping rows without a voltage base");
            }
            scaled = scaled.filter_rows(|key| !skipped.contains(key));
        }

        accessor::write_table(&*self.engine, handle, category, &scaled)?;
        self.record(report);
        Ok(())
    }

    /// Ids of the elements of a category, optionally filtered by the
    /// voltage levels they are attached to.
    pub fn get_elements_ids(&self, category: ElementCategory, filter: &ElementFilter) -> GridResult<Vec<String>> {
        let handle = self.handle()?;
        let table = accessor::read_table(&*self.engine, handle, category)?;
        let mut ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();

        let accepted = if filter.is_empty() {
            None
        } else {
            Some(self.accepted_voltage_levels(filter)?)
        };

        let level_columns: Vec<&str> = table
            .column_names()
            .into_iter()
            .filter(|name| name.starts_with("voltage_level") && name.ends_with("_id"))
            .collect();

        for (position, key) in table.index().iter().enumerate() {
            let keep = match &accepted {
                None => true,
                Some(levels) if category == ElementCategory::VoltageLevel => levels.contains(&key.id),
                Some(levels) => level_columns.iter().any(|column| {
                    table
                        .strings(column)
                        .map(|values| levels.contains(&values[position]))
                        .unwrap_or(false)
                }),
            };
            if keep && seen.insert(key.id.clone()) {
                ids.push(key.id.clone());
            }
        }
        Ok(ids)
    }

    /// Voltage levels satisfying `filter`.
    fn accepted_voltage_levels(&self, filter: &ElementFilter) -> GridResult<HashSet<String>> {
        let handle = self.handle()?;
        let levels = accessor::read_table(&*self.engine, handle, ElementCategory::VoltageLevel)?;
        let substations = accessor::read_table(&*self.engine, handle, ElementCategory::Substation)?;

        let countries: HashMap<&str, &str> = match substations.strings("country") {
            Some(values) => substations
                .index()
                .iter()
                .map(|k| k.id.as_str())
                .zip(values.iter().map(String::as_str))
                .collect(),
            None => HashMap::new(),
        };
        let nominal_v = levels.doubles("nominal_v").unwrap_or(&[]);
        let substation_ids = levels.strings("substation_id").unwrap_or(&[]);

        Ok(levels
            .index()
            .iter()
            .enumerate()
            .filter(|(position, _)| {
                let voltage_ok = match &filter.nominal_voltages {
                    None => true,
                    Some(wanted) => nominal_v
                        .get(*position)
                        .map(|v| wanted.iter().any(|w| (w - v).abs() < 1e-9))
                        .unwrap_or(false),
                };
                let country_ok = match &filter.countries {
                    None => true,
                    Some(wanted) => substation_ids
                        .get(*position)
                        .and_then(|s| countries.get(s.as_str()))
                        .map(|country| wanted.iter().any(|w| w == country))
                        .unwrap_or(false),
                };
                voltage_ok && country_ok
            })
            .map(|(_, key)| key.id.clone())
            .collect())
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Returns whether the switch changed position.
    pub fn open_switch(&mut self, id: &str) -> GridResult<bool> {
        Ok(self.engine.update_switch_position(self.handle()?, id, true)?)
    }

    pub fn close_switch(&mut self, id: &str) -> GridResult<bool> {
        Ok(self.engine.update_switch_position(self.handle()?, id, false)?)
    }

    /// Connect every terminal of an element. Returns whether anything changed.
    pub fn connect(&mut self, id: &str) -> GridResult<bool> {
        Ok(self.engine.update_connectable_status(self.handle()?, id, true)?)
    }

    pub fn disconnect(&mut self, id: &str) -> GridResult<bool> {
        Ok(self.engine.update_connectable_status(self.handle()?, id, false)?)
    }

    // =========================================================================
    // Variants
    // =========================================================================

    pub fn variants(&self) -> GridResult<VariantManager<'_, E>> {
        Ok(VariantManager::new(&*self.engine, self.handle()?))
    }

    pub fn get_variant_ids(&self) -> GridResult<Vec<String>> {
        self.variants()?.list()
    }

    pub fn get_working_variant_id(&self) -> GridResult<String> {
        self.variants()?.current()
    }

    pub fn clone_variant(&mut self, src: &str, target: &str, may_overwrite: bool) -> GridResult<()> {
        self.variants()?.clone_variant(src, target, may_overwrite)
    }

    pub fn set_working_variant(&mut self, id: &str) -> GridResult<()> {
        self.variants()?.select(id)
    }

    pub fn remove_variant(&mut self, id: &str) -> GridResult<()> {
        self.variants()?.remove(id)
    }
}

impl<E: NetworkEngine> Drop for Network<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.engine.release_network(handle) {
                warn!(error = %err, "failed to release network");
            }
        }
    }
}

impl<E: NetworkEngine> std::fmt::Debug for Network<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("engine", &self.engine.name())
            .field("handle", &self.handle)
            .field("per_unit", &self.per_unit)
            .finish()
    }
}

/// `get_<category>` / `update_<category>` shortcuts for every category.
macro_rules! category_accessors {
    ($($category:ident => $get:ident, $update:ident;)*) => {
        impl<E: NetworkEngine> Network<E> {
            $(
                #[doc = concat!("[`get_elements`](Self::get_elements) for `", stringify!($category), "`.")]
                pub fn $get(&self) -> GridResult<ElementTable> {
                    self.get_elements(ElementCategory::$category)
                }

                #[doc = concat!("[`update_elements`](Self::update_elements) for `", stringify!($category), "`.")]
                pub fn $update(&mut self, table: &ElementTable) -> GridResult<()> {
                    self.update_elements(ElementCategory::$category, table)
                }
            )*
        }
    };
}

category_accessors! {
    Bus => get_buses, update_buses;
    Generator => get_generators, update_generators;
    Load => get_loads, update_loads;
    Battery => get_batteries, update_batteries;
    Line => get_lines, update_lines;
    TwoWindingsTransformer => get_2_windings_transformers, update_2_windings_transformers;
    ThreeWindingsTransformer => get_3_windings_transformers, update_3_windings_transformers;
    ShuntCompensator => get_shunt_compensators, update_shunt_compensators;
    DanglingLine => get_dangling_lines, update_dangling_lines;
    LccConverterStation => get_lcc_converter_stations, update_lcc_converter_stations;
    VscConverterStation => get_vsc_converter_stations, update_vsc_converter_stations;
    StaticVarCompensator => get_static_var_compensators, update_static_var_compensators;
    VoltageLevel => get_voltage_levels, update_voltage_levels;
    BusbarSection => get_busbar_sections, update_busbar_sections;
    Substation => get_substations, update_substations;
    HvdcLine => get_hvdc_lines, update_hvdc_lines;
    Switch => get_switches, update_switches;
    RatioTapChanger => get_ratio_tap_changers, update_ratio_tap_changers;
    PhaseTapChanger => get_phase_tap_changers, update_phase_tap_changers;
    RatioTapChangerStep => get_ratio_tap_changer_steps, update_ratio_tap_changer_steps;
    PhaseTapChangerStep => get_phase_tap_changer_steps, update_phase_tap_changer_steps;
    ReactiveCapabilityCurvePoint => get_reactive_capability_curve_points, update_reactive_capability_curve_points;
}
