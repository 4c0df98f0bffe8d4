//! Column schema of every element category.
//!
//! This is the schema oracle of the in-memory engine: the declared type and
//! writability of each column. Columns are listed in display order; read-only
//! columns hold identifiers, topology or computed results.

use gridframe_core::{ColumnSpec, ElementCategory, SeriesType};

/// Static description of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub series_type: SeriesType,
    pub writable: bool,
}

impl ColumnDef {
    pub fn spec(&self) -> ColumnSpec {
        ColumnSpec {
            name: self.name.to_string(),
            series_type: self.series_type,
            writable: self.writable,
        }
    }
}

const fn s(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        series_type: SeriesType::String,
        writable: true,
    }
}

const fn d(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        series_type: SeriesType::Double,
        writable: true,
    }
}

const fn i(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        series_type: SeriesType::Int,
        writable: true,
    }
}

const fn b(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        series_type: SeriesType::Boolean,
        writable: true,
    }
}

const fn ro(def: ColumnDef) -> ColumnDef {
    ColumnDef {
        writable: false,
        ..def
    }
}

const BUS: &[ColumnDef] = &[
    d("v_mag"),
    d("v_angle"),
    ro(i("connected_component")),
    ro(i("synchronous_component")),
    ro(s("voltage_level_id")),
];

const GENERATOR: &[ColumnDef] = &[
    s("name"),
    s("energy_source"),
    d("target_p"),
    d("min_p"),
    d("max_p"),
    d("min_q"),
    d("max_q"),
    d("target_v"),
    d("target_q"),
    b("voltage_regulator_on"),
    d("p"),
    d("q"),
    ro(d("i")),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const LOAD: &[ColumnDef] = &[
    s("name"),
    s("type"),
    d("p0"),
    d("q0"),
    d("p"),
    d("q"),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const BATTERY: &[ColumnDef] = &[
    s("name"),
    d("max_p"),
    d("min_p"),
    d("min_q"),
    d("max_q"),
    d("p0"),
    d("q0"),
    d("p"),
    d("q"),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const LINE: &[ColumnDef] = &[
    s("name"),
    d("r"),
    d("x"),
    d("g1"),
    d("b1"),
    d("g2"),
    d("b2"),
    d("p1"),
    d("q1"),
    ro(d("i1")),
    d("p2"),
    d("q2"),
    ro(d("i2")),
    ro(s("voltage_level1_id")),
    ro(s("voltage_level2_id")),
    ro(s("bus1_id")),
    ro(s("bus2_id")),
    b("connected1"),
    b("connected2"),
];

const TWO_WINDINGS_TRANSFORMER: &[ColumnDef] = &[
    s("name"),
    d("r"),
    d("x"),
    d("g"),
    d("b"),
    d("rated_u1"),
    d("rated_u2"),
    d("rated_s"),
    d("p1"),
    d("q1"),
    ro(d("i1")),
    d("p2"),
    d("q2"),
    ro(d("i2")),
    ro(s("voltage_level1_id")),
    ro(s("voltage_level2_id")),
    ro(s("bus1_id")),
    ro(s("bus2_id")),
    b("connected1"),
    b("connected2"),
];

const THREE_WINDINGS_TRANSFORMER: &[ColumnDef] = &[
    s("name"),
    d("rated_u0"),
    d("r1"),
    d("x1"),
    d("g1"),
    d("b1"),
    d("rated_u1"),
    d("rated_s1"),
    d("p1"),
    d("q1"),
    ro(d("i1")),
    ro(s("voltage_level1_id")),
    ro(s("bus1_id")),
    b("connected1"),
    d("r2"),
    d("x2"),
    d("g2"),
    d("b2"),
    d("rated_u2"),
    d("rated_s2"),
    d("p2"),
    d("q2"),
    ro(d("i2")),
    ro(s("voltage_level2_id")),
    ro(s("bus2_id")),
    b("connected2"),
    d("r3"),
    d("x3"),
    d("g3"),
    d("b3"),
    d("rated_u3"),
    d("rated_s3"),
    d("p3"),
    d("q3"),
    ro(d("i3")),
    ro(s("voltage_level3_id")),
    ro(s("bus3_id")),
    b("connected3"),
];

const SHUNT_COMPENSATOR: &[ColumnDef] = &[
    s("name"),
    ro(s("model_type")),
    ro(i("max_section_count")),
    i("section_count"),
    d("p"),
    d("q"),
    ro(d("i")),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const DANGLING_LINE: &[ColumnDef] = &[
    s("name"),
    d("r"),
    d("x"),
    d("g"),
    d("b"),
    d("p0"),
    d("q0"),
    d("p"),
    d("q"),
    ro(d("i")),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const LCC_CONVERTER_STATION: &[ColumnDef] = &[
    s("name"),
    d("power_factor"),
    d("loss_factor"),
    d("p"),
    d("q"),
    ro(d("i")),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const VSC_CONVERTER_STATION: &[ColumnDef] = &[
    s("name"),
    d("loss_factor"),
    d("voltage_setpoint"),
    d("reactive_power_setpoint"),
    b("voltage_regulator_on"),
    d("p"),
    d("q"),
    ro(d("i")),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const STATIC_VAR_COMPENSATOR: &[ColumnDef] = &[
    s("name"),
    d("voltage_setpoint"),
    d("reactive_power_setpoint"),
    s("regulation_mode"),
    d("p"),
    d("q"),
    ro(d("i")),
    ro(s("voltage_level_id")),
    ro(s("bus_id")),
    b("connected"),
];

const VOLTAGE_LEVEL: &[ColumnDef] = &[
    s("name"),
    ro(s("substation_id")),
    d("nominal_v"),
    d("high_voltage_limit"),
    d("low_voltage_limit"),
];

const BUSBAR_SECTION: &[ColumnDef] = &[
    s("name"),
    ro(b("fictitious")),
    d("v"),
    d("angle"),
    ro(s("voltage_level_id")),
    b("connected"),
];

const SUBSTATION: &[ColumnDef] = &[s("name"), s("TSO"), s("geo_tags"), s("country")];

const HVDC_LINE: &[ColumnDef] = &[
    s("name"),
    s("converters_mode"),
    d("active_power_setpoint"),
    d("max_p"),
    d("nominal_v"),
    d("r"),
    ro(s("converter_station1_id")),
    ro(s("converter_station2_id")),
    b("connected1"),
    b("connected2"),
];

const SWITCH: &[ColumnDef] = &[
    s("name"),
    ro(s("kind")),
    b("open"),
    b("retained"),
    ro(s("voltage_level_id")),
    ro(s("bus_breaker_bus1_id")),
    ro(s("bus_breaker_bus2_id")),
];

const RATIO_TAP_CHANGER: &[ColumnDef] = &[
    i("tap"),
    ro(i("low_tap")),
    ro(i("high_tap")),
    ro(i("step_count")),
    b("on_load"),
    b("regulating"),
    d("target_v"),
    d("target_deadband"),
    ro(s("regulating_bus_id")),
];

const PHASE_TAP_CHANGER: &[ColumnDef] = &[
    i("tap"),
    ro(i("low_tap")),
    ro(i("high_tap")),
    ro(i("step_count")),
    b("regulating"),
    s("regulation_mode"),
    d("regulation_value"),
    d("target_deadband"),
    ro(s("regulating_bus_id")),
];

const RATIO_TAP_CHANGER_STEP: &[ColumnDef] = &[d("rho"), d("r"), d("x"), d("g"), d("b")];

const PHASE_TAP_CHANGER_STEP: &[ColumnDef] =
    &[d("rho"), d("alpha"), d("r"), d("x"), d("g"), d("b")];

const REACTIVE_CAPABILITY_CURVE_POINT: &[ColumnDef] = &[d("p"), d("min_q"), d("max_q")];

/// Columns of a category, in display order.
pub fn schema(category: ElementCategory) -> &'static [ColumnDef] {
    match category {
        ElementCategory::Bus => BUS,
        ElementCategory::Generator => GENERATOR,
        ElementCategory::Load => LOAD,
        ElementCategory::Battery => BATTERY,
        ElementCategory::Line => LINE,
        ElementCategory::TwoWindingsTransformer => TWO_WINDINGS_TRANSFORMER,
        ElementCategory::ThreeWindingsTransformer => THREE_WINDINGS_TRANSFORMER,
        ElementCategory::ShuntCompensator => SHUNT_COMPENSATOR,
        ElementCategory::DanglingLine => DANGLING_LINE,
        ElementCategory::LccConverterStation => LCC_CONVERTER_STATION,
        ElementCategory::VscConverterStation => VSC_CONVERTER_STATION,
        ElementCategory::StaticVarCompensator => STATIC_VAR_COMPENSATOR,
        ElementCategory::VoltageLevel => VOLTAGE_LEVEL,
        ElementCategory::BusbarSection => BUSBAR_SECTION,
        ElementCategory::Substation => SUBSTATION,
        ElementCategory::HvdcLine => HVDC_LINE,
        ElementCategory::Switch => SWITCH,
        ElementCategory::RatioTapChanger => RATIO_TAP_CHANGER,
        ElementCategory::PhaseTapChanger => PHASE_TAP_CHANGER,
        ElementCategory::RatioTapChangerStep => RATIO_TAP_CHANGER_STEP,
        ElementCategory::PhaseTapChangerStep => PHASE_TAP_CHANGER_STEP,
        ElementCategory::ReactiveCapabilityCurvePoint => REACTIVE_CAPABILITY_CURVE_POINT,
    }
}

pub fn column_def(category: ElementCategory, column: &str) -> Option<&'static ColumnDef> {
    schema(category).iter().find(|c| c.name == column)
}

/// Columns toggled by a connect/disconnect of a connectable.
pub fn connection_columns(category: ElementCategory) -> impl Iterator<Item = &'static str> {
    schema(category)
        .iter()
        .map(|c| c.name)
        .filter(|name| name.starts_with("connected") && *name != "connected_component")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn column_names_are_unique_per_category() {
        for category in ElementCategory::ALL {
            let names: HashSet<_> = schema(category).iter().map(|c| c.name).collect();
            assert_eq!(names.len(), schema(category).len(), "{}", category);
        }
    }

    #[test]
    fn computed_currents_are_read_only() {
        assert!(!column_def(ElementCategory::Generator, "i").unwrap().writable);
        assert!(!column_def(ElementCategory::Line, "i2").unwrap().writable);
        assert!(column_def(ElementCategory::Line, "r").unwrap().writable);
    }

    #[test]
    fn connection_columns_skip_components() {
        let bus: Vec<_> = connection_columns(ElementCategory::Bus).collect();
        assert!(bus.is_empty());
        let line: Vec<_> = connection_columns(ElementCategory::Line).collect();
        assert_eq!(line, vec!["connected1", "connected2"]);
    }
}
