//! E2E tests for `cdecomp verify`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

const HUB_OVER_SQUARE: &str = r#"{
  "directed": false,
  "nodes": [
    { "id": "H", "conc": 1.0 },
    { "id": "A", "conc": 1.0 },
    { "id": "B", "conc": 1.0 },
    { "id": "C", "conc": 1.0 },
    { "id": "D", "conc": 1.0 },
    { "id": "Z", "conc": 1.0 }
  ],
  "links": [
    { "source": "H", "target": "A" },
    { "source": "H", "target": "B" },
    { "source": "H", "target": "C" },
    { "source": "H", "target": "D" },
    { "source": "A", "target": "B" },
    { "source": "B", "target": "C" },
    { "source": "C", "target": "D" },
    { "source": "D", "target": "A" }
  ]
}"#;

fn cdecomp_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cdecomp"));
    cmd.current_dir(dir);
    cmd.env("CDECOMP_LOG", "error");
    cmd.env_remove("CDECOMP_FORMAT");
    cmd
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("net.json"), HUB_OVER_SQUARE).unwrap();
    dir
}

#[test]
fn verify_text_reports_every_check() {
    let dir = setup();

    cdecomp_cmd(dir.path())
        .args(["verify", "net.json", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK   existence symmetry"))
        .stdout(predicate::str::contains("OK   Ci identity"))
        .stdout(predicate::str::contains("OK   closed-quadriad cross-check"))
        .stdout(predicate::str::contains("OK   open-quadriad brute force"))
        .stdout(predicate::str::contains("verify: success"));
}

#[test]
fn verify_json_report_shape() {
    let dir = setup();

    let output = cdecomp_cmd(dir.path())
        .args(["verify", "net.json", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "verify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["symmetric"], true);
    assert!(report["maxIdentityResidual"].as_f64().unwrap() < 1e-9);
    assert!(report["maxClosureDiff"].as_f64().unwrap() < 1e-9);
    assert!(report["maxRedundancyDiff"].as_f64().unwrap() < 1e-9);
    assert!(report["failingNodes"].as_array().unwrap().is_empty());
}

#[test]
fn verify_honours_tolerance_flag() {
    let dir = setup();

    let output = cdecomp_cmd(dir.path())
        .args(["verify", "net.json", "--tolerance", "1e-6", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!((report["tolerance"].as_f64().unwrap() - 1e-6).abs() < f64::EPSILON);
}

#[test]
fn verify_checks_nodes_whose_ties_weigh_zero() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("silent.json"),
        r#"{"nodes":[{"id":"A","conc":1.0},{"id":"B","conc":1.0},{"id":"C","conc":1.0}],
            "links":[{"source":"A","target":"B","weight":0.0},
                     {"source":"B","target":"C","weight":1.0}]}"#,
    )
    .unwrap();

    let output = cdecomp_cmd(dir.path())
        .args(["verify", "silent.json", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "verify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["maxIdentityResidual"].as_f64().unwrap() < 1e-9);
    assert!(report["failingNodes"].as_array().unwrap().is_empty());
}

#[test]
fn verify_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    cdecomp_cmd(dir.path())
        .args(["verify", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
