//! Per-unit conversion rules, one list per element category.
//!
//! A rule names a column, the physical dimension of its values and where the
//! voltage base of each row comes from. Columns absent from a table are
//! skipped, so the same rules serve full reads and partial updates.

use gridframe_core::ElementCategory;

use crate::per_unit::PerUnitContext;

/// Physical dimension of a converted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// MW, Mvar, MVA
    Power,
    /// kV
    Voltage,
    /// Rated winding voltage, kV
    Ratio,
    /// A
    Current,
    /// Ω
    Impedance,
    /// S
    Admittance,
    /// Ω, HVDC line resistance
    DcResistance,
}

impl Dimension {
    /// Value that SI quantities are divided by on read (and multiplied by on write).
    ///
    /// `nominal_v` is ignored for [`Dimension::Power`].
    pub fn divisor(self, ctx: &PerUnitContext, nominal_v: f64) -> f64 {
        let bases = ctx.bases(nominal_v);
        match self {
            Dimension::Power => ctx.power_base(),
            Dimension::Voltage | Dimension::Ratio => nominal_v,
            Dimension::Current => bases.current().value(),
            Dimension::Impedance => bases.impedance().value(),
            Dimension::Admittance => bases.admittance().value(),
            Dimension::DcResistance => bases.dc_resistance().value(),
        }
    }

    pub fn needs_voltage(self) -> bool {
        !matches!(self, Dimension::Power)
    }
}

/// Where the nominal voltage of a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSource {
    /// Power quantities need no voltage.
    None,
    /// Nominal voltage of the voltage level whose id is in this column.
    VoltageLevel(&'static str),
    /// A kV column of the row itself.
    RowColumn(&'static str),
}

impl BaseSource {
    /// Column of the row the base is read from.
    pub fn column(self) -> Option<&'static str> {
        match self {
            BaseSource::None => None,
            BaseSource::VoltageLevel(column) | BaseSource::RowColumn(column) => Some(column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRule {
    pub column: &'static str,
    pub dimension: Dimension,
    pub base: BaseSource,
}

const fn power(column: &'static str) -> ConversionRule {
    ConversionRule {
        column,
        dimension: Dimension::Power,
        base: BaseSource::None,
    }
}

const fn at(column: &'static str, dimension: Dimension, voltage_level_id: &'static str) -> ConversionRule {
    ConversionRule {
        column,
        dimension,
        base: BaseSource::VoltageLevel(voltage_level_id),
    }
}

const fn own(column: &'static str, dimension: Dimension, voltage_column: &'static str) -> ConversionRule {
    ConversionRule {
        column,
        dimension,
        base: BaseSource::RowColumn(voltage_column),
    }
}

use Dimension::{Admittance, Current, DcResistance, Impedance, Ratio, Voltage};

const VL: &str = "voltage_level_id";
const VL1: &str = "voltage_level1_id";
const VL2: &str = "voltage_level2_id";
const VL3: &str = "voltage_level3_id";

const BUS: &[ConversionRule] = &[at("v_mag", Voltage, VL)];

const GENERATOR: &[ConversionRule] = &[
    power("target_p"),
    power("target_q"),
    power("min_p"),
    power("max_p"),
    power("min_q"),
    power("max_q"),
    power("p"),
    power("q"),
    at("target_v", Voltage, VL),
    at("i", Current, VL),
];

const LOAD: &[ConversionRule] = &[power("p0"), power("q0"), power("p"), power("q")];

const BATTERY: &[ConversionRule] = &[
    power("p0"),
    power("q0"),
    power("min_p"),
    power("max_p"),
    power("min_q"),
    power("max_q"),
    power("p"),
    power("q"),
];

const LINE: &[ConversionRule] = &[
    power("p1"),
    power("q1"),
    power("p2"),
    power("q2"),
    at("i1", Current, VL1),
    at("i2", Current, VL2),
    at("r", Impedance, VL1),
    at("x", Impedance, VL1),
    at("g1", Admittance, VL1),
    at("b1", Admittance, VL1),
    at("g2", Admittance, VL2),
    at("b2", Admittance, VL2),
];

const TWO_WINDINGS_TRANSFORMER: &[ConversionRule] = &[
    power("p1"),
    power("q1"),
    power("p2"),
    power("q2"),
    power("rated_s"),
    at("i1", Current, VL1),
    at("i2", Current, VL2),
    at("r", Impedance, VL2),
    at("x", Impedance, VL2),
    at("g", Admittance, VL2),
    at("b", Admittance, VL2),
    at("rated_u1", Ratio, VL1),
    at("rated_u2", Ratio, VL2),
];

const THREE_WINDINGS_TRANSFORMER: &[ConversionRule] = &[
    power("p1"),
    power("q1"),
    at("i1", Current, VL1),
    at("r1", Impedance, VL1),
    at("x1", Impedance, VL1),
    at("g1", Admittance, VL1),
    at("b1", Admittance, VL1),
    at("rated_u1", Ratio, VL1),
    power("p2"),
    power("q2"),
    at("i2", Current, VL2),
    at("r2", Impedance, VL2),
    at("x2", Impedance, VL2),
    at("g2", Admittance, VL2),
    at("b2", Admittance, VL2),
    at("rated_u2", Ratio, VL2),
    power("p3"),
    power("q3"),
    at("i3", Current, VL3),
    at("r3", Impedance, VL3),
    at("x3", Impedance, VL3),
    at("g3", Admittance, VL3),
    at("b3", Admittance, VL3),
    at("rated_u3", Ratio, VL3),
];

const SHUNT_COMPENSATOR: &[ConversionRule] = &[power("p"), power("q"), at("i", Current, VL)];

const DANGLING_LINE: &[ConversionRule] = &[
    power("p0"),
    power("q0"),
    power("p"),
    power("q"),
    at("i", Current, VL),
    at("r", Impedance, VL),
    at("x", Impedance, VL),
    at("g", Admittance, VL),
    at("b", Admittance, VL),
];

const LCC_CONVERTER_STATION: &[ConversionRule] = &[power("p"), power("q"), at("i", Current, VL)];

/// VSC converter stations and static var compensators share their rules.
const VOLTAGE_REGULATING_STATION: &[ConversionRule] = &[
    power("p"),
    power("q"),
    power("reactive_power_setpoint"),
    at("voltage_setpoint", Voltage, VL),
    at("i", Current, VL),
];

const VOLTAGE_LEVEL: &[ConversionRule] = &[
    own("high_voltage_limit", Voltage, "nominal_v"),
    own("low_voltage_limit", Voltage, "nominal_v"),
];

const BUSBAR_SECTION: &[ConversionRule] = &[at("v", Voltage, VL)];

const HVDC_LINE: &[ConversionRule] = &[
    power("max_p"),
    power("active_power_setpoint"),
    own("r", DcResistance, "nominal_v"),
];

const REACTIVE_CAPABILITY_CURVE_POINT: &[ConversionRule] =
    &[power("p"), power("min_q"), power("max_q")];

/// Conversion rules of a category.
pub fn rules_for(category: ElementCategory) -> &'static [ConversionRule] {
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
        ElementCategory::VscConverterStation | ElementCategory::StaticVarCompensator => {
            VOLTAGE_REGULATING_STATION
        }
        ElementCategory::VoltageLevel => VOLTAGE_LEVEL,
        ElementCategory::BusbarSection => BUSBAR_SECTION,
        ElementCategory::HvdcLine => HVDC_LINE,
        ElementCategory::ReactiveCapabilityCurvePoint => REACTIVE_CAPABILITY_CURVE_POINT,
        ElementCategory::Substation
        | ElementCategory::Switch
        | ElementCategory::RatioTapChanger
        | ElementCategory::PhaseTapChanger
        | ElementCategory::RatioTapChangerStep
        | ElementCategory::PhaseTapChangerStep => &[],
    }
}

/// Whether converting `category` requires the voltage-level table.
pub fn needs_voltage_levels(category: ElementCategory) -> bool {
    rules_for(category)
        .iter()
        .any(|r| matches!(r.base, BaseSource::VoltageLevel(_)))
}

/// Base-source columns needed to convert the given columns, without duplicates.
pub fn base_columns<'a>(
    category: ElementCategory,
    present: impl IntoIterator<Item = &'a str>,
) -> Vec<&'static str> {
    let present: Vec<&str> = present.into_iter().collect();
    let mut columns = Vec::new();
    for rule in rules_for(category) {
        if !present.contains(&rule.column) {
            continue;
        }
        if let Some(column) = rule.base.column() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    columns
}
