//! The closed set of element categories exposed as tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Equipment class of a table. Each category has its own column schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    Bus,
    Generator,
    Load,
    Battery,
    Line,
    TwoWindingsTransformer,
    ThreeWindingsTransformer,
    ShuntCompensator,
    DanglingLine,
    LccConverterStation,
    VscConverterStation,
    StaticVarCompensator,
    VoltageLevel,
    BusbarSection,
    Substation,
    HvdcLine,
    Switch,
    RatioTapChanger,
    PhaseTapChanger,
    RatioTapChangerStep,
    PhaseTapChangerStep,
    ReactiveCapabilityCurvePoint,
}

impl ElementCategory {
    pub const ALL: [ElementCategory; 22] = [
        ElementCategory::Bus,
        ElementCategory::Generator,
        ElementCategory::Load,
        ElementCategory::Battery,
        ElementCategory::Line,
        ElementCategory::TwoWindingsTransformer,
        ElementCategory::ThreeWindingsTransformer,
        ElementCategory::ShuntCompensator,
        ElementCategory::DanglingLine,
        ElementCategory::LccConverterStation,
        ElementCategory::VscConverterStation,
        ElementCategory::StaticVarCompensator,
        ElementCategory::VoltageLevel,
        ElementCategory::BusbarSection,
        ElementCategory::Substation,
        ElementCategory::HvdcLine,
        ElementCategory::Switch,
        ElementCategory::RatioTapChanger,
        ElementCategory::PhaseTapChanger,
        ElementCategory::RatioTapChangerStep,
        ElementCategory::PhaseTapChangerStep,
        ElementCategory::ReactiveCapabilityCurvePoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementCategory::Bus => "bus",
            ElementCategory::Generator => "generator",
            ElementCategory::Load => "load",
            ElementCategory::Battery => "battery",
            ElementCategory::Line => "line",
            ElementCategory::TwoWindingsTransformer => "two_windings_transformer",
            ElementCategory::ThreeWindingsTransformer => "three_windings_transformer",
            ElementCategory::ShuntCompensator => "shunt_compensator",
            ElementCategory::DanglingLine => "dangling_line",
            ElementCategory::LccConverterStation => "lcc_converter_station",
            ElementCategory::VscConverterStation => "vsc_converter_station",
            ElementCategory::StaticVarCompensator => "static_var_compensator",
            ElementCategory::VoltageLevel => "voltage_level",
            ElementCategory::BusbarSection => "busbar_section",
            ElementCategory::Substation => "substation",
            ElementCategory::HvdcLine => "hvdc_line",
            ElementCategory::Switch => "switch",
            ElementCategory::RatioTapChanger => "ratio_tap_changer",
            ElementCategory::PhaseTapChanger => "phase_tap_changer",
            ElementCategory::RatioTapChangerStep => "ratio_tap_changer_step",
            ElementCategory::PhaseTapChangerStep => "phase_tap_changer_step",
            ElementCategory::ReactiveCapabilityCurvePoint => "reactive_capability_curve_point",
        }
    }

    /// Rows of these categories are keyed by parent id plus a sequence number.
    pub fn has_composite_key(&self) -> bool {
        matches!(
            self,
            ElementCategory::RatioTapChangerStep
                | ElementCategory::PhaseTapChangerStep
                | ElementCategory::ReactiveCapabilityCurvePoint
        )
    }

    pub fn available() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementCategory {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase().replace('-', "_");
        ElementCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown element category '{}'; supported values: {}",
                    input,
                    ElementCategory::available().join(", ")
                )
            })
    }
}
