//! End-to-end tests of the `docintel` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from the user's real configuration directory.
fn docintel(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docintel").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    docintel(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_path_points_into_config_home() {
    let home = TempDir::new().unwrap();
    docintel(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docintel/config.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_init_then_refuse_overwrite() {
    let home = TempDir::new().unwrap();
    let target = home.path().join("custom.json");
    let target = target.to_str().unwrap();

    docintel(&home)
        .args(["config", "init", "--output", target])
        .assert()
        .success();

    let written = std::fs::read_to_string(target).unwrap();
    assert!(written.contains("\"validation_agent\""));

    docintel(&home)
        .args(["config", "init", "--output", target])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    docintel(&home)
        .args(["config", "init", "--force", "--output", target])
        .assert()
        .success();
}

#[test]
fn test_config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    docintel(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_round\": 3"))
        .stdout(predicate::str::contains("\"model\": \"gpt-4o\""));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("bad.json");
    std::fs::write(&path, r#"{ "conversation": { "max_round": 0 } }"#).unwrap();

    docintel(&home)
        .args(["-c", path.to_str().unwrap(), "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_round"));
}

#[test]
fn test_extract_missing_file() {
    let home = TempDir::new().unwrap();
    docintel(&home)
        .args(["extract", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_extract_rejects_wrong_extension() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("report.txt");
    std::fs::write(&path, "plain text").unwrap();

    docintel(&home)
        .args(["extract", path.to_str().unwrap(), "--engine", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("El archivo debe ser un PDF"));
}

#[test]
fn test_extract_broken_pdf_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.pdf");
    std::fs::write(&path, "definitely not a pdf").unwrap();

    docintel(&home)
        .args(["extract", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PDF error"));
}
