use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A command isolated from the user's home directory and log settings.
fn gridframe(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gridframe-cli").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

#[test]
fn categories_lists_every_table() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("two_windings_transformer"))
        .stdout(predicate::str::contains("reactive_capability_curve_point"));
}

#[test]
fn columns_show_types_and_conversions() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["columns", "load"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p0"))
        .stdout(predicate::str::contains("double"))
        .stdout(predicate::str::contains("power"));

    gridframe(home.path())
        .args(["columns", "widget"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown element category"));
}

#[test]
fn demo_lists_builtin_networks() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("fourSubstations"))
        .stdout(predicate::str::contains("sim1"))
        .stdout(predicate::str::contains("dangling_line"));
}

#[test]
fn show_prints_si_and_per_unit_values() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["show", "eurostag_example", "load"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOAD"))
        .stdout(predicate::str::contains("600.0000"));

    gridframe(home.path())
        .args([
            "show",
            "eurostag_example",
            "load",
            "--columns",
            "p0",
            "--per-unit",
            "--power-base",
            "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("6.0000"))
        .stdout(predicate::str::contains("q0").not());
}

#[test]
fn show_as_json() {
    let home = tempdir().unwrap();
    let output = gridframe(home.path())
        .args(["show", "dangling_line", "dangling_line", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["index"][0]["id"], "DL");
}

#[test]
fn config_file_sets_defaults() {
    let home = tempdir().unwrap();
    let config = home.path().join("gridframe.toml");
    fs::write(
        &config,
        "[per_unit]\nenabled = true\npower_base = 100.0\n\n[display]\ndecimal_places = 1\n",
    )
    .unwrap();

    gridframe(home.path())
        .args(["show", "eurostag_example", "load", "--columns", "p0", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("6.0"))
        .stdout(predicate::str::contains("6.0000").not());
}

#[test]
fn update_writes_a_snapshot() {
    let home = tempdir().unwrap();
    let snapshot = home.path().join("case.json");

    gridframe(home.path())
        .args([
            "update",
            "eurostag_example",
            "load",
            "--set",
            "LOAD.p0=650",
            "--set",
            "LOAD.q0=250",
            "-o",
        ])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("650.0000"))
        .stdout(predicate::str::contains("250.0000"));
    assert!(snapshot.exists());

    gridframe(home.path())
        .arg("show")
        .arg(&snapshot)
        .args(["load", "--columns", "p0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("650.0000"));
}

#[test]
fn update_in_per_unit_stores_si() {
    let home = tempdir().unwrap();
    let snapshot = home.path().join("case.json");

    gridframe(home.path())
        .args([
            "update",
            "eurostag_example",
            "load",
            "--set",
            "LOAD.p0=5",
            "--per-unit",
            "--power-base",
            "100",
            "-o",
        ])
        .arg(&snapshot)
        .assert()
        .success();

    gridframe(home.path())
        .arg("show")
        .arg(&snapshot)
        .args(["load", "--columns", "p0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("500.0000"));
}

#[test]
fn update_rejects_bad_values() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["update", "eurostag_example", "load", "--set", "LOAD.p0=lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid double"));

    gridframe(home.path())
        .args(["update", "eurostag_example", "load", "--set", "LOAD.bus_id=X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));

    gridframe(home.path())
        .args(["update", "eurostag_example", "load", "--set", "NOPE.p0=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOPE"));
}

#[test]
fn variants_clone_list_and_remove() {
    let home = tempdir().unwrap();
    let snapshot = home.path().join("variants.json");

    gridframe(home.path())
        .args(["variants", "clone", "four_substations", "InitialState", "peak", "--select", "-o"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloned InitialState into peak"));

    gridframe(home.path())
        .args(["variants", "list"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("InitialState"))
        .stdout(predicate::str::is_match(r"peak\s+\*").unwrap());

    gridframe(home.path())
        .args(["variants", "remove"])
        .arg(&snapshot)
        .arg("peak")
        .assert()
        .failure()
        .stderr(predicate::str::contains("working variant"));

    gridframe(home.path())
        .args(["variants", "remove"])
        .arg(&snapshot)
        .arg("InitialState")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed InitialState"));
}

#[test]
fn clone_onto_existing_variant_needs_overwrite() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["variants", "clone", "dangling_line", "InitialState", "InitialState"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn toggle_switches_and_connectables() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["toggle", "four_substations", "open", "S1VL2_COUPLER"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S1VL2_COUPLER opened"));

    gridframe(home.path())
        .args(["toggle", "four_substations", "disconnect", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOPE"));
}

#[test]
fn ids_filter_by_voltage_and_country() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["ids", "four_substations", "voltage_level", "--nominal-v", "225"])
        .assert()
        .success()
        .stdout(predicate::str::diff("S1VL1\n"));

    gridframe(home.path())
        .args(["ids", "eurostag_example", "bus", "--country", "BE"])
        .assert()
        .success()
        .stdout(predicate::str::diff("VLHV2_0\nVLLOAD_0\n"));
}

#[test]
fn dump_to_stdout_is_a_loadable_snapshot() {
    let home = tempdir().unwrap();
    let output = gridframe(home.path())
        .args(["dump", "dangling_line"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshot = home.path().join("dl.json");
    fs::write(&snapshot, &output.stdout).unwrap();
    gridframe(home.path())
        .arg("show")
        .arg(&snapshot)
        .arg("generator")
        .assert()
        .success()
        .stdout(predicate::str::contains("G"));
}

#[test]
fn config_init_and_show() {
    let home = tempdir().unwrap();
    let config = home.path().join("conf").join("config.toml");

    gridframe(home.path())
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    gridframe(home.path())
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("power_base = 100.0"))
        .stdout(predicate::str::contains("decimal_places = 4"));

    gridframe(home.path())
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn default_config_lives_under_home() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(home.path().join(".gridframe").join("config.toml").exists());
}

#[test]
fn invalid_inputs_fail_cleanly() {
    let home = tempdir().unwrap();
    gridframe(home.path())
        .args(["--power-base", "0", "show", "eurostag_example", "load"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid power base"));

    gridframe(home.path())
        .args(["show", "nowhere.json", "load"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither a built-in network"));
}
