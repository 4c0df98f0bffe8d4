//! Built-in example networks.
//!
//! Values are in SI units (MW, Mvar, kV, A, Ω, S) and mimic a solved load
//! flow, so the computed columns (`p`, `q`, `i`, bus voltages) are populated.

use chrono::{TimeZone, Utc};

use gridframe_core::{
    CellValue, ElementCategory, EngineResult, NetworkEngine, NetworkHandle, NetworkMetadata,
    RowKey,
};

use crate::memory::MemoryEngine;

/// Names accepted by [`by_name`].
pub const FIXTURES: [&str; 3] = ["four_substations", "eurostag_example", "dangling_line"];

fn d(value: f64) -> CellValue {
    CellValue::Double(value)
}

fn s(value: &str) -> CellValue {
    CellValue::String(value.to_string())
}

fn b(value: bool) -> CellValue {
    CellValue::Boolean(value)
}

fn n(value: i64) -> CellValue {
    CellValue::Int(value)
}

struct Builder<'a> {
    engine: &'a MemoryEngine,
    handle: &'a NetworkHandle,
}

impl Builder<'_> {
    fn add(&self, category: ElementCategory, id: &str, values: &[(&str, CellValue)]) -> EngineResult<()> {
        self.engine
            .add_element(self.handle, category, RowKey::id(id), values)
    }

    fn add_numbered(
        &self,
        category: ElementCategory,
        id: &str,
        num: i64,
        values: &[(&str, CellValue)],
    ) -> EngineResult<()> {
        self.engine
            .add_element(self.handle, category, RowKey::composite(id, num), values)
    }

    fn substation(&self, id: &str, country: &str, tso: &str) -> EngineResult<()> {
        self.add(
            ElementCategory::Substation,
            id,
            &[("TSO", s(tso)), ("country", s(country))],
        )
    }

    fn voltage_level(&self, id: &str, substation: &str, nominal_v: f64, low: f64, high: f64) -> EngineResult<()> {
        self.add(
            ElementCategory::VoltageLevel,
            id,
            &[
                ("substation_id", s(substation)),
                ("nominal_v", d(nominal_v)),
                ("low_voltage_limit", d(low)),
                ("high_voltage_limit", d(high)),
            ],
        )
    }

    fn bus(&self, voltage_level: &str, v_mag: f64, v_angle: f64) -> EngineResult<()> {
        self.add(
            ElementCategory::Bus,
            &format!("{}_0", voltage_level),
            &[
                ("v_mag", d(v_mag)),
                ("v_angle", d(v_angle)),
                ("voltage_level_id", s(voltage_level)),
            ],
        )
    }

    fn load(&self, id: &str, voltage_level: &str, p0: f64, q0: f64) -> EngineResult<()> {
        self.add(
            ElementCategory::Load,
            id,
            &[
                ("type", s("UNDEFINED")),
                ("p0", d(p0)),
                ("q0", d(q0)),
                ("p", d(p0)),
                ("q", d(q0)),
                ("voltage_level_id", s(voltage_level)),
                ("bus_id", s(&format!("{}_0", voltage_level))),
                ("connected", b(true)),
            ],
        )
    }
}

/// Create the network and run `populate`; the network is released if
/// population fails.
fn build(
    engine: &MemoryEngine,
    metadata: NetworkMetadata,
    populate: impl FnOnce(&Builder<'_>) -> EngineResult<()>,
) -> EngineResult<NetworkHandle> {
    let handle = engine.create_network(&metadata.id)?;
    let result = engine.set_metadata(&handle, metadata).and_then(|_| {
        populate(&Builder {
            engine,
            handle: &handle,
        })
    });
    match result {
        Ok(()) => Ok(handle),
        Err(err) => {
            engine.release_network(handle)?;
            Err(err)
        }
    }
}

fn metadata(id: &str, hour: u32) -> NetworkMetadata {
    NetworkMetadata {
        id: id.to_string(),
        name: id.to_string(),
        source_format: "test".to_string(),
        case_date: Utc
            .with_ymd_and_hms(2018, 1, 1, hour, 0, 0)
            .single()
            .unwrap_or_default(),
        forecast_distance: 0,
    }
}

/// Create one of the built-in networks by name.
pub fn by_name(engine: &MemoryEngine, name: &str) -> Option<EngineResult<NetworkHandle>> {
    match name {
        "four_substations" => Some(four_substations(engine)),
        "eurostag_example" => Some(eurostag_example(engine)),
        "dangling_line" => Some(dangling_line(engine)),
        _ => None,
    }
}

/// Four substations with one 225 kV and four 400 kV voltage levels, two
/// lines, a phase-shifting transformer and two HVDC links.
pub fn four_substations(engine: &MemoryEngine) -> EngineResult<NetworkHandle> {
    use ElementCategory::*;

    build(engine, metadata("fourSubstations", 11), |net| {
        for id in ["S1", "S2", "S3", "S4"] {
            net.substation(id, "FR", "RTE")?;
        }
        net.voltage_level("S1VL1", "S1", 225.0, 220.0, 240.0)?;
        net.voltage_level("S1VL2", "S1", 400.0, 390.0, 440.0)?;
        net.voltage_level("S2VL1", "S2", 400.0, 390.0, 440.0)?;
        net.voltage_level("S3VL1", "S3", 400.0, 390.0, 440.0)?;
        net.voltage_level("S4VL1", "S4", 400.0, 390.0, 440.0)?;

        net.bus("S1VL1", 224.6139, 2.2822)?;
        net.bus("S1VL2", 400.0, 0.0)?;
        net.bus("S2VL1", 408.847, 0.7347)?;
        net.bus("S3VL1", 400.0, 0.0)?;
        net.bus("S4VL1", 400.0, -1.1259)?;

        for (id, vl, v, angle) in [
            ("S1VL1_BBS", "S1VL1", 224.6139, 2.2822),
            ("S1VL2_BBS1", "S1VL2", 400.0, 0.0),
            ("S1VL2_BBS2", "S1VL2", 400.0, 0.0),
            ("S2VL1_BBS", "S2VL1", 408.847, 0.7347),
            ("S3VL1_BBS", "S3VL1", 400.0, 0.0),
            ("S4VL1_BBS", "S4VL1", 400.0, -1.1259),
        ] {
            net.add(
                BusbarSection,
                id,
                &[
                    ("v", d(v)),
                    ("angle", d(angle)),
                    ("voltage_level_id", s(vl)),
                    ("connected", b(true)),
                ],
            )?;
        }

        for (id, vl, source, target_p, max_p, p, q, i) in [
            ("GH1", "S1VL2", "HYDRO", 100.0, 150.0, -100.0, -75.8, 181.1),
            ("GH2", "S1VL2", "HYDRO", 110.0, 200.0, -110.0, -75.8, 192.8),
            ("GH3", "S1VL2", "HYDRO", 100.0, 200.0, -100.0, -75.8, 181.1),
            ("GTH1", "S2VL1", "THERMAL", 100.0, 200.0, -100.0, 19.5, 144.0),
            ("GTH2", "S3VL1", "THERMAL", 250.9944, 400.0, -250.9944, -71.8, 376.8),
        ] {
            net.add(
                Generator,
                id,
                &[
                    ("energy_source", s(source)),
                    ("target_p", d(target_p)),
                    ("min_p", d(0.0)),
                    ("max_p", d(max_p)),
                    ("min_q", d(-769.3)),
                    ("max_q", d(860.0)),
                    ("target_v", d(400.0)),
                    ("target_q", d(0.0)),
                    ("voltage_regulator_on", b(true)),
                    ("p", d(p)),
                    ("q", d(q)),
                    ("i", d(i)),
                    ("voltage_level_id", s(vl)),
                    ("bus_id", s(&format!("{}_0", vl))),
                    ("connected", b(true)),
                ],
            )?;
        }
        net.add_numbered(
            ReactiveCapabilityCurvePoint,
            "GH1",
            0,
            &[("p", d(0.0)), ("min_q", d(-769.3)), ("max_q", d(860.0))],
        )?;
        net.add_numbered(
            ReactiveCapabilityCurvePoint,
            "GH1",
            1,
            &[("p", d(100.0)), ("min_q", d(-864.55)), ("max_q", d(946.25))],
        )?;

        net.load("LD1", "S1VL2", 80.0, 10.0)?;
        net.load("LD2", "S1VL2", 60.0, 5.0)?;
        net.load("LD3", "S3VL1", 60.0, 5.0)?;
        net.load("LD4", "S3VL1", 40.0, 5.0)?;
        net.load("LD5", "S4VL1", 200.0, 5.0)?;
        net.load("LD6", "S4VL1", 0.0, 0.0)?;

        for (id, vl1, vl2, x, p1, q1, i1, p2, q2, i2) in [
            ("LINE_S2S3", "S2VL1", "S3VL1", 19.1, 109.889, 190.023, 309.979, -109.886, -184.517, 309.978),
            ("LINE_S3S4", "S3VL1", "S4VL1", 13.1, 240.004, 2.1751, 346.43, -240.0, 2.5415, 346.43),
        ] {
            net.add(
                Line,
                id,
                &[
                    ("r", d(0.01)),
                    ("x", d(x)),
                    ("g1", d(0.0)),
                    ("b1", d(0.0)),
                    ("g2", d(0.0)),
                    ("b2", d(0.0)),
                    ("p1", d(p1)),
                    ("q1", d(q1)),
                    ("i1", d(i1)),
                    ("p2", d(p2)),
                    ("q2", d(q2)),
                    ("i2", d(i2)),
                    ("voltage_level1_id", s(vl1)),
                    ("voltage_level2_id", s(vl2)),
                    ("bus1_id", s(&format!("{}_0", vl1))),
                    ("bus2_id", s(&format!("{}_0", vl2))),
                    ("connected1", b(true)),
                    ("connected2", b(true)),
                ],
            )?;
        }

        net.add(
            TwoWindingsTransformer,
            "TWT",
            &[
                ("r", d(2.0)),
                ("x", d(14.745)),
                ("g", d(0.0)),
                ("b", d(3.2e-5)),
                ("rated_u1", d(225.0)),
                ("rated_u2", d(400.0)),
                ("p1", d(-80.0)),
                ("q1", d(-10.0)),
                ("i1", d(207.2)),
                ("p2", d(80.0809)),
                ("q2", d(5.4857)),
                ("i2", d(115.8)),
                ("voltage_level1_id", s("S1VL1")),
                ("voltage_level2_id", s("S1VL2")),
                ("bus1_id", s("S1VL1_0")),
                ("bus2_id", s("S1VL2_0")),
                ("connected1", b(true)),
                ("connected2", b(true)),
            ],
        )?;
        net.add(
            PhaseTapChanger,
            "TWT",
            &[
                ("tap", n(1)),
                ("low_tap", n(0)),
                ("high_tap", n(2)),
                ("step_count", n(3)),
                ("regulating", b(false)),
                ("regulation_mode", s("FIXED_TAP")),
                ("regulating_bus_id", s("S1VL1_0")),
            ],
        )?;
        for (num, alpha) in [(0, -42.8), (1, 0.0), (2, 42.8)] {
            net.add_numbered(
                PhaseTapChangerStep,
                "TWT",
                num,
                &[
                    ("rho", d(1.0)),
                    ("alpha", d(alpha)),
                    ("r", d(39.78)),
                    ("x", d(39.78)),
                    ("g", d(0.0)),
                    ("b", d(0.0)),
                ],
            )?;
        }

        net.add(
            ShuntCompensator,
            "SHUNT",
            &[
                ("model_type", s("LINEAR")),
                ("max_section_count", n(1)),
                ("section_count", n(1)),
                ("q", d(1920.0)),
                ("voltage_level_id", s("S1VL2")),
                ("bus_id", s("S1VL2_0")),
                ("connected", b(true)),
            ],
        )?;

        for (id, vl, setpoint, reactive, regulating, p, q, i) in [
            ("VSC1", "S1VL2", 400.0, 500.0, true, 10.11, -512.081, 739.3),
            ("VSC2", "S2VL1", 0.0, 120.0, false, -9.89, -120.0, 170.0),
        ] {
            net.add(
                VscConverterStation,
                id,
                &[
                    ("loss_factor", d(1.1)),
                    ("voltage_setpoint", d(setpoint)),
                    ("reactive_power_setpoint", d(reactive)),
                    ("voltage_regulator_on", b(regulating)),
                    ("p", d(p)),
                    ("q", d(q)),
                    ("i", d(i)),
                    ("voltage_level_id", s(vl)),
                    ("bus_id", s(&format!("{}_0", vl))),
                    ("connected", b(true)),
                ],
            )?;
        }
        for (id, vl, p, q, i) in [
            ("LCC1", "S1VL2", 80.88, 107.84, 194.6),
            ("LCC2", "S3VL1", -79.12, 105.493, 190.3),
        ] {
            net.add(
                LccConverterStation,
                id,
                &[
                    ("power_factor", d(0.6)),
                    ("loss_factor", d(1.1)),
                    ("p", d(p)),
                    ("q", d(q)),
                    ("i", d(i)),
                    ("voltage_level_id", s(vl)),
                    ("bus_id", s(&format!("{}_0", vl))),
                    ("connected", b(true)),
                ],
            )?;
        }
        for (id, setpoint, cs1, cs2) in [("HVDC1", 10.0, "VSC1", "VSC2"), ("HVDC2", 80.0, "LCC1", "LCC2")] {
            net.add(
                HvdcLine,
                id,
                &[
                    ("converters_mode", s("SIDE_1_RECTIFIER_SIDE_2_INVERTER")),
                    ("active_power_setpoint", d(setpoint)),
                    ("max_p", d(300.0)),
                    ("nominal_v", d(400.0)),
                    ("r", d(1.0)),
                    ("converter_station1_id", s(cs1)),
                    ("converter_station2_id", s(cs2)),
                    ("connected1", b(true)),
                    ("connected2", b(true)),
                ],
            )?;
        }

        net.add(
            StaticVarCompensator,
            "SVC",
            &[
                ("voltage_setpoint", d(400.0)),
                ("regulation_mode", s("VOLTAGE")),
                ("p", d(0.0)),
                ("q", d(-12.5415)),
                ("i", d(18.1)),
                ("voltage_level_id", s("S4VL1")),
                ("bus_id", s("S4VL1_0")),
                ("connected", b(true)),
            ],
        )?;

        for (id, kind, vl) in [
            ("S1VL1_BBS_TWT_DISCONNECTOR", "DISCONNECTOR", "S1VL1"),
            ("S1VL2_COUPLER", "BREAKER", "S1VL2"),
            ("S3VL1_LINES3S4_BREAKER", "BREAKER", "S3VL1"),
            ("S4VL1_LD6_BREAKER", "BREAKER", "S4VL1"),
        ] {
            net.add(
                Switch,
                id,
                &[
                    ("kind", s(kind)),
                    ("open", b(false)),
                    ("retained", b(kind == "BREAKER")),
                    ("voltage_level_id", s(vl)),
                ],
            )?;
        }
        Ok(())
    })
}

/// Generator, two 380 kV lines, step-up and step-down transformers and one load.
pub fn eurostag_example(engine: &MemoryEngine) -> EngineResult<NetworkHandle> {
    use ElementCategory::*;

    build(engine, metadata("sim1", 10), |net| {
        net.substation("P1", "FR", "RTE")?;
        net.substation("P2", "BE", "RTE")?;
        net.voltage_level("VLGEN", "P1", 24.0, f64::NAN, f64::NAN)?;
        net.voltage_level("VLHV1", "P1", 380.0, f64::NAN, f64::NAN)?;
        net.voltage_level("VLHV2", "P2", 380.0, f64::NAN, f64::NAN)?;
        net.voltage_level("VLLOAD", "P2", 150.0, f64::NAN, f64::NAN)?;

        net.bus("VLGEN", 24.5, 2.3259868)?;
        net.bus("VLHV1", 402.1428, 0.0)?;
        net.bus("VLHV2", 389.9527, -3.5063581)?;
        net.bus("VLLOAD", 147.5786, -9.6144858)?;

        for (id, min_q, max_q) in [("GEN", -9999.99, 9999.99), ("GEN2", -1.79769e306, 1.79769e306)] {
            net.add(
                Generator,
                id,
                &[
                    ("energy_source", s("OTHER")),
                    ("target_p", d(607.0)),
                    ("min_p", d(-9999.99)),
                    ("max_p", d(9999.99)),
                    ("min_q", d(min_q)),
                    ("max_q", d(max_q)),
                    ("target_v", d(24.5)),
                    ("target_q", d(301.0)),
                    ("voltage_regulator_on", b(true)),
                    ("p", d(-302.781)),
                    ("q", d(-112.641)),
                    ("i", d(7612.9)),
                    ("voltage_level_id", s("VLGEN")),
                    ("bus_id", s("VLGEN_0")),
                    ("connected", b(true)),
                ],
            )?;
        }

        net.load("LOAD", "VLLOAD", 600.0, 200.0)?;

        for id in ["NHV1_NHV2_1", "NHV1_NHV2_2"] {
            net.add(
                Line,
                id,
                &[
                    ("r", d(3.0)),
                    ("x", d(33.0)),
                    ("g1", d(0.0)),
                    ("b1", d(1.93e-4)),
                    ("g2", d(0.0)),
                    ("b2", d(1.93e-4)),
                    ("p1", d(302.444)),
                    ("q1", d(98.74)),
                    ("i1", d(456.77)),
                    ("p2", d(-300.434)),
                    ("q2", d(-137.188)),
                    ("i2", d(488.99)),
                    ("voltage_level1_id", s("VLHV1")),
                    ("voltage_level2_id", s("VLHV2")),
                    ("bus1_id", s("VLHV1_0")),
                    ("bus2_id", s("VLHV2_0")),
                    ("connected1", b(true)),
                    ("connected2", b(true)),
                ],
            )?;
        }

        for (id, vl1, vl2, r, x, rated_u1, rated_u2, flows) in [
            (
                "NGEN_NHV1",
                "VLGEN",
                "VLHV1",
                0.2654,
                11.1045,
                24.0,
                400.0,
                [605.56, 225.28, 15226.0, -604.89, -197.48, 913.5],
            ),
            (
                "NHV2_NLOAD",
                "VLHV2",
                "VLLOAD",
                0.0474,
                4.05,
                400.0,
                158.0,
                [600.87, 274.38, 977.97, -600.0, -200.0, 2474.26],
            ),
        ] {
            net.add(
                TwoWindingsTransformer,
                id,
                &[
                    ("r", d(r)),
                    ("x", d(x)),
                    ("g", d(0.0)),
                    ("b", d(0.0)),
                    ("rated_u1", d(rated_u1)),
                    ("rated_u2", d(rated_u2)),
                    ("p1", d(flows[0])),
                    ("q1", d(flows[1])),
                    ("i1", d(flows[2])),
                    ("p2", d(flows[3])),
                    ("q2", d(flows[4])),
                    ("i2", d(flows[5])),
                    ("voltage_level1_id", s(vl1)),
                    ("voltage_level2_id", s(vl2)),
                    ("bus1_id", s(&format!("{}_0", vl1))),
                    ("bus2_id", s(&format!("{}_0", vl2))),
                    ("connected1", b(true)),
                    ("connected2", b(true)),
                ],
            )?;
        }

        net.add(
            RatioTapChanger,
            "NHV2_NLOAD",
            &[
                ("tap", n(1)),
                ("low_tap", n(0)),
                ("high_tap", n(2)),
                ("step_count", n(3)),
                ("on_load", b(true)),
                ("regulating", b(true)),
                ("target_v", d(158.0)),
                ("target_deadband", d(0.0)),
                ("regulating_bus_id", s("VLLOAD_0")),
            ],
        )?;
        for (num, rho) in [(0, 0.8509), (1, 1.0), (2, 1.1491)] {
            net.add_numbered(
                RatioTapChangerStep,
                "NHV2_NLOAD",
                num,
                &[
                    ("rho", d(rho)),
                    ("r", d(0.0)),
                    ("x", d(0.0)),
                    ("g", d(0.0)),
                    ("b", d(0.0)),
                ],
            )?;
        }
        Ok(())
    })
}

/// One 100 kV voltage level holding a generator and a dangling line.
pub fn dangling_line(engine: &MemoryEngine) -> EngineResult<NetworkHandle> {
    use ElementCategory::*;

    build(engine, metadata("dangling-line", 11), |net| {
        net.substation("S", "FR", "RTE")?;
        net.voltage_level("VL", "S", 100.0, f64::NAN, f64::NAN)?;
        net.bus("VL", 100.0, 0.0)?;
        net.add(
            Generator,
            "G",
            &[
                ("energy_source", s("OTHER")),
                ("target_p", d(50.0)),
                ("min_p", d(0.0)),
                ("max_p", d(70.0)),
                ("min_q", d(-100.0)),
                ("max_q", d(100.0)),
                ("target_v", d(100.0)),
                ("target_q", d(30.0)),
                ("voltage_regulator_on", b(true)),
                ("p", d(-54.8154)),
                ("q", d(-30.2926)),
                ("i", d(361.6)),
                ("voltage_level_id", s("VL")),
                ("bus_id", s("VL_0")),
                ("connected", b(true)),
            ],
        )?;
        net.add(
            DanglingLine,
            "DL",
            &[
                ("r", d(10.0)),
                ("x", d(1.0)),
                ("g", d(1e-4)),
                ("b", d(1e-5)),
                ("p0", d(50.0)),
                ("q0", d(30.0)),
                ("p", d(54.8154)),
                ("q", d(30.2926)),
                ("i", d(361.6)),
                ("voltage_level_id", s("VL")),
                ("bus_id", s("VL_0")),
                ("connected", b(true)),
            ],
        )?;
        Ok(())
    })
}
