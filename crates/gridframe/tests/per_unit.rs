use std::sync::Arc;

use gridframe::{
    CellValue, ElementCategory, ElementTable, EngineError, GridError, Network, NetworkEngine,
    RowKey, SeriesData,
};
use gridframe_engine::{fixtures, MemoryEngine};

fn s(value: &str) -> CellValue {
    CellValue::String(value.to_string())
}

fn d(value: f64) -> CellValue {
    CellValue::Double(value)
}

/// One 400 kV voltage level with a load and a generator.
fn small_network() -> Network<MemoryEngine> {
    let engine = Arc::new(MemoryEngine::new());
    let handle = engine.create_network("small").unwrap();
    engine
        .add_element(
            &handle,
            ElementCategory::VoltageLevel,
            RowKey::id("VL"),
            &[("nominal_v", d(400.0)), ("high_voltage_limit", d(440.0))],
        )
        .unwrap();
    engine
        .add_element(
            &handle,
            ElementCategory::Load,
            RowKey::id("LOAD"),
            &[("p0", d(6.0)), ("voltage_level_id", s("VL"))],
        )
        .unwrap();
    engine
        .add_element(
            &handle,
            ElementCategory::Generator,
            RowKey::id("GEN"),
            &[
                ("target_v", d(420.0)),
                ("i", d(144.3376)),
                ("voltage_level_id", s("VL")),
            ],
        )
        .unwrap();
    engine
        .add_element(
            &handle,
            ElementCategory::Generator,
            RowKey::id("STRAY"),
            &[("target_v", d(420.0)), ("voltage_level_id", s("GHOST"))],
        )
        .unwrap();
    let mut network = Network::from_handle(engine, handle);
    network.set_power_base(100.0).unwrap();
    network
}

fn same(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() <= 1e-9 * a.abs().max(1.0)
}

#[test]
fn power_scale_law() {
    let mut network = small_network();
    network.activate_per_unit();

    let loads = network.get_loads().unwrap();
    assert!((loads.double("LOAD", "p0").unwrap() - 0.06).abs() < 1e-12);

    let update = ElementTable::from_ids(["LOAD"])
        .with_column("p0", SeriesData::Double(vec![0.05]))
        .unwrap();
    network.update_loads(&update).unwrap();

    network.deactivate_per_unit();
    let loads = network.get_loads().unwrap();
    assert!((loads.double("LOAD", "p0").unwrap() - 5.0).abs() < 1e-12);
}

#[test]
fn voltage_scale_law() {
    let mut network = small_network();
    network.activate_per_unit();
    let gens = network.get_generators().unwrap();
    assert!((gens.double("GEN", "target_v").unwrap() - 1.05).abs() < 1e-12);

    let vls = network.get_voltage_levels().unwrap();
    assert!((vls.double("VL", "high_voltage_limit").unwrap() - 1.1).abs() < 1e-12);
    assert_eq!(vls.double("VL", "nominal_v"), Some(400.0));
}

#[test]
fn bus_voltage_magnitude_scale_law() {
    let network = small_network();
    let engine = Arc::clone(network.engine());
    let handle = engine.create_network("buses").unwrap();
    engine
        .add_element(&handle, ElementCategory::VoltageLevel, RowKey::id("VL"), &[("nominal_v", d(400.0))])
        .unwrap();
    engine
        .add_element(
            &handle,
            ElementCategory::Bus,
            RowKey::id("VL_0"),
            &[("v_mag", d(420.0)), ("voltage_level_id", s("VL"))],
        )
        .unwrap();

    let mut buses = Network::from_handle(engine, handle);
    buses.set_power_base(100.0).unwrap();
    buses.activate_per_unit();
    let table = buses.get_buses().unwrap();
    assert!((table.double("VL_0", "v_mag").unwrap() - 1.05).abs() < 1e-12);
}

#[test]
fn current_formula() {
    let mut network = small_network();
    network.activate_per_unit();
    let gens = network.get_generators().unwrap();
    assert!((gens.double("GEN", "i").unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn unresolved_voltage_level_is_lenient() {
    let mut network = small_network();
    network.activate_per_unit();

    let gens = network.get_generators().unwrap();
    assert!(gens.double("STRAY", "target_v").unwrap().is_nan());
    assert!((gens.double("GEN", "target_v").unwrap() - 1.05).abs() < 1e-12);

    // target_v for STRAY, and its empty `i`
    assert_eq!(network.missing_base_count(), 2);
    let diagnostics = network.last_diagnostics();
    assert_eq!(diagnostics.warning_count(), 2);
    assert!(diagnostics
        .issues
        .iter()
        .all(|issue| issue.entity.as_deref() == Some("generator/STRAY")));

    network.get_generators().unwrap();
    assert_eq!(network.missing_base_count(), 4);
}

#[test]
fn unresolved_voltage_level_row_is_not_written() {
    let mut network = small_network();
    network.activate_per_unit();

    let update = ElementTable::from_ids(["GEN", "STRAY"])
        .with_column("target_v", SeriesData::Double(vec![1.0, 1.0]))
        .unwrap();
    network.update_generators(&update).unwrap();

    assert_eq!(network.missing_base_count(), 1);
    let diagnostics = network.last_diagnostics();
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(
        diagnostics.issues[0].entity.as_deref(),
        Some("generator/STRAY")
    );

    network.deactivate_per_unit();
    let gens = network.get_generators().unwrap();
    assert_eq!(gens.double("STRAY", "target_v"), Some(420.0));
    assert!((gens.double("GEN", "target_v").unwrap() - 400.0).abs() < 1e-9);
}

#[test]
fn unknown_row_fails_without_counting_a_missing_base() {
    let mut network = small_network();
    network.activate_per_unit();

    let update = ElementTable::from_ids(["NOPE"])
        .with_column("target_v", SeriesData::Double(vec![1.0]))
        .unwrap();
    let err = network.update_generators(&update).unwrap_err();

    assert!(matches!(
        err,
        GridError::Engine(EngineError::UnknownElement { ref id, .. }) if id == "NOPE"
    ));
    assert_eq!(network.missing_base_count(), 0);
    assert!(!network.last_diagnostics().has_issues());
}

#[test]
fn disabled_per_unit_reads_raw_values() {
    let network = small_network();
    let gens = network.get_generators().unwrap();
    assert_eq!(gens.double("GEN", "target_v"), Some(420.0));
    assert_eq!(network.missing_base_count(), 0);
}

#[test]
fn voltage_bases_are_read_on_every_call() {
    let mut network = small_network();
    network.activate_per_unit();

    // nominal_v is not a converted column, so it is written as given
    let update = ElementTable::from_ids(["VL"])
        .with_column("nominal_v", SeriesData::Double(vec![420.0]))
        .unwrap();
    network.update_voltage_levels(&update).unwrap();

    let gens = network.get_generators().unwrap();
    assert!((gens.double("GEN", "target_v").unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn write_path_joins_bases_without_writing_them() {
    let engine = Arc::new(MemoryEngine::new());
    let handle = fixtures::four_substations(&engine).unwrap();
    let mut network = Network::from_handle(Arc::clone(&engine), handle);
    network.set_power_base(100.0).unwrap();
    network.activate_per_unit();

    // voltage_level1_id is read-only; dispatching it would fail
    let lines = network.get_lines().unwrap();
    let r_pu = lines.double("LINE_S2S3", "r").unwrap();
    let update = ElementTable::from_ids(["LINE_S2S3"])
        .with_column("r", SeriesData::Double(vec![2.0 * r_pu]))
        .unwrap();
    network.update_lines(&update).unwrap();

    network.deactivate_per_unit();
    let lines = network.get_lines().unwrap();
    assert!((lines.double("LINE_S2S3", "r").unwrap() - 0.02).abs() < 1e-12);
}

#[test]
fn hvdc_resistance_uses_its_own_nominal_voltage() {
    let engine = Arc::new(MemoryEngine::new());
    let handle = fixtures::four_substations(&engine).unwrap();
    let mut network = Network::from_handle(engine, handle);
    network.set_power_base(100.0).unwrap();
    network.activate_per_unit();

    let hvdc = network.get_hvdc_lines().unwrap();
    assert!((hvdc.double("HVDC1", "r").unwrap() - 0.000625).abs() < 1e-12);
    assert!((hvdc.double("HVDC1", "active_power_setpoint").unwrap() - 0.1).abs() < 1e-12);
    assert!((hvdc.double("HVDC1", "max_p").unwrap() - 3.0).abs() < 1e-12);
    assert_eq!(hvdc.double("HVDC1", "nominal_v"), Some(400.0));
}

#[test]
fn transformer_sides_use_their_own_bases() {
    let engine = Arc::new(MemoryEngine::new());
    let handle = fixtures::four_substations(&engine).unwrap();
    let mut network = Network::from_handle(engine, handle);
    network.set_power_base(100.0).unwrap();
    network.activate_per_unit();

    let twt = network.get_2_windings_transformers().unwrap();
    assert!((twt.double("TWT", "rated_u1").unwrap() - 1.0).abs() < 1e-12);
    assert!((twt.double("TWT", "rated_u2").unwrap() - 1.0).abs() < 1e-12);
    // impedance on the 400 kV side: 400² / (100 * 1000) = 1.6
    assert!((twt.double("TWT", "r").unwrap() - 2.0 / 1.6).abs() < 1e-12);
    assert!(twt.double("TWT", "rated_s").unwrap().is_nan());
}

#[test]
fn inverse_law_over_every_fixture() {
    for fixture in fixtures::FIXTURES {
        let engine = Arc::new(MemoryEngine::new());
        let handle = fixtures::by_name(&engine, fixture).unwrap().unwrap();
        let mut network = Network::from_handle(Arc::clone(&engine), handle);
        network.set_power_base(100.0).unwrap();

        for category in ElementCategory::ALL {
            let raw = network.get_elements(category).unwrap();
            let writable: Vec<String> = network
                .columns(category)
                .into_iter()
                .filter(|c| c.writable)
                .map(|c| c.name)
                .collect();
            let names: Vec<&str> = writable.iter().map(String::as_str).collect();

            network.activate_per_unit();
            let pu = network.get_elements(category).unwrap();
            network
                .update_elements(category, &pu.select(&names).unwrap())
                .unwrap();
            network.deactivate_per_unit();

            let back = network.get_elements(category).unwrap();
            for name in &names {
                if let (Some(before), Some(after)) = (raw.doubles(name), back.doubles(name)) {
                    for (k, (a, b)) in before.iter().zip(after).enumerate() {
                        assert!(
                            same(*a, *b),
                            "{} {} {} row {}: {} != {}",
                            fixture,
                            category,
                            name,
                            k,
                            a,
                            b
                        );
                    }
                } else {
                    assert_eq!(raw.column(name), back.column(name), "{} {}", category, name);
                }
            }
        }
    }
}

#[test]
fn invalid_power_base_is_rejected_at_set_time() {
    let mut network = small_network();
    assert!(matches!(
        network.set_power_base(0.0),
        Err(GridError::InvalidBase { .. })
    ));
    assert!(matches!(
        network.set_power_base(-100.0),
        Err(GridError::InvalidBase { .. })
    ));
    assert_eq!(network.power_base(), 100.0);
}

#[test]
fn engine_tables_stay_in_si() {
    let mut network = small_network();
    network.activate_per_unit();
    let _ = network.get_loads().unwrap();

    let engine = Arc::clone(network.engine());
    let handles_seen = engine.network_count();
    assert_eq!(handles_seen, 1);
    network.deactivate_per_unit();
    assert_eq!(network.get_loads().unwrap().double("LOAD", "p0"), Some(6.0));
    assert_eq!(engine.name(), "memory");
}
