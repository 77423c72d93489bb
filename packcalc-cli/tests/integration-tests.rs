use std::process::Command;

use assert_cmd::prelude::{CommandCargoExt, OutputAssertExt};
use predicates::prelude::predicate;

use packcalc_core::prelude::*;

#[test]
fn test_that_cli_app_produces_summary() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.args(["--cyc-resource", "ece15.txt"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cycle: ece15 (peak mode)"))
        .stdout(predicate::str::contains("Pack: 223S23P"));
    Ok(())
}

#[test]
fn test_json_results_from_inline_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.args([
        "--cyc",
        "0,10,20,20,10,0",
        "--mode",
        "continuous",
        "--res-fmt",
        "json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"continuous\""))
        .stdout(predicate::str::contains("\"soc_perc\""));
    Ok(())
}

#[test]
fn test_csv_and_saved_params() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let cyc_file = dir.path().join("short.txt");
    std::fs::write(&cyc_file, "0, 15, 30, 30, 15, 0\n")?;
    let out = dir.path().join("series.csv");
    let saved = dir.path().join("params.yaml");

    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.arg("--cyc-file")
        .arg(&cyc_file)
        .args(["--res-fmt", "csv", "--out"])
        .arg(&out)
        .arg("--save-params")
        .arg(&saved);
    cmd.assert().success();

    let csv = std::fs::read_to_string(&out)?;
    assert_eq!(csv.lines().count(), 7);
    assert!(csv.starts_with("time_s,speed_mps"));
    let params = std::fs::read_to_string(&saved)?;
    assert!(params.contains("voltage_architecture") && params.contains("800V"));

    // the saved set loads back as a parameter file
    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.arg("--params-file")
        .arg(&saved)
        .args(["--cyc", "0,20,40,20,0"]);
    cmd.assert().success();
    Ok(())
}

#[test]
fn test_undersized_pack_still_prints_sizing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let params_file = dir.path().join("small_pack.yaml");
    let mut params = ParameterSet::default();
    params.pack.voltage_architecture = VoltageArchitecture::V400;
    params.pack.pack_energy_kwh = 2.0;
    params.pack.ee_resistance_mohm = 600.0;
    params.to_file(&params_file)?;

    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.arg("--params-file")
        .arg(&params_file)
        .args(["--cyc", "0,40,80,130,130,80,0"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Required pack energy: "))
        .stdout(predicate::str::contains("Pack: 112S2P"))
        .stdout(predicate::str::contains("current and SOC: cannot compute"));
    Ok(())
}

#[test]
fn test_bad_inputs_fail() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.args(["--cyc", "0,10,abc"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("speed token 2 is not a number"));

    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.args(["--cyc", "0,10", "--mode", "turbo"]);
    cmd.assert().failure();

    // no cycle given
    let mut cmd = Command::cargo_bin("packcalc-cli")?;
    cmd.assert().failure();
    Ok(())
}
