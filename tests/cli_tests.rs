mod support;

use assert_cmd::Command;
use predicates::prelude::*;

use support::config::{write_config, FULL_CONFIG};

fn coinbook() -> Command {
    Command::cargo_bin("coinbook").expect("coinbook binary")
}

#[test]
fn check_config_accepts_valid_file() {
    let file = write_config(FULL_CONFIG);
    coinbook()
        .args(["check", "config", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("BTC-USD, ETH-USD"));
}

#[test]
fn check_config_rejects_invalid_file() {
    let file = write_config("products = [\"BTC-USD\"]\n[display]\ndepth = 0\n");
    coinbook()
        .args(["check", "config", "-c"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for display.depth"));
}

#[test]
fn check_config_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    coinbook()
        .args(["check", "config", "--config"])
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn run_fails_fast_on_bad_override() {
    let file = write_config(FULL_CONFIG);
    coinbook()
        .args(["run", "--products", "BTCUSD", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("BASE-QUOTE"));
}

#[test]
fn run_products_flag_fills_missing_config_list() {
    let file = write_config("[display]\ndepth = 3\n");
    // The zero depth stops the run once validation has accepted the products.
    coinbook()
        .args(["run", "--products", "BTC-USD", "--depth", "0", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for display.depth"))
        .stderr(predicate::str::contains("products").not());
}

#[test]
fn run_without_products_anywhere_fails() {
    let file = write_config("[display]\ndepth = 3\n");
    coinbook()
        .args(["run", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field: products"));
}

#[test]
fn help_lists_commands() {
    coinbook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"));
}
