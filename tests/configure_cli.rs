//! CLI integration tests for Slipway.
//!
//! These tests run the full configure pass against small fixture
//! workspaces. They avoid interface headers, so no external C++
//! front-end is needed.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the slipway binary command.
fn slipway() -> Command {
    Command::cargo_bin("slipway").unwrap()
}

/// Create a temporary directory for test workspaces.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const WORKSPACE_MANIFEST: &str = r#"
[package]
name = "engine"
category = "engine"
version = "0.3.1"
root_namespace = "Engine::Interface"

[[project]]
name = "math"
kind = "static_library"
sources = ["math/src/**/*.cpp"]
public_include_dirs = ["math/include"]

[[project]]
name = "render"
kind = "shared_library"
sources = ["render/src/**/*.cpp"]
public_include_dirs = ["render/include"]

[project.dependencies]
public = ["math"]
"#;

fn write_workspace(tmp: &TempDir, manifest: &str) {
    fs::write(tmp.path().join("Slipway.toml"), manifest).unwrap();
    for dir in ["math/src", "math/include", "render/src", "render/include"] {
        fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }
    fs::write(tmp.path().join("math/src/vec.cpp"), "int v;").unwrap();
    fs::write(tmp.path().join("render/src/device.cpp"), "int d;").unwrap();
}

fn configure_args(tmp: &TempDir) -> Vec<String> {
    vec![
        "configure".to_string(),
        "--host-preset".to_string(),
        "linux-x64".to_string(),
        "--build-type".to_string(),
        "debug".to_string(),
        "--output-root".to_string(),
        tmp.path().join("out").display().to_string(),
    ]
}

// ============================================================================
// slipway configure
// ============================================================================

#[test]
fn test_configure_emits_graph_and_package() {
    let tmp = temp_dir();
    write_workspace(&tmp, WORKSPACE_MANIFEST);

    slipway()
        .args(configure_args(&tmp))
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Configured 2 project(s)"));

    let graph = tmp.path().join("out/graph.json");
    assert!(graph.exists());
    let graph_json = fs::read_to_string(graph).unwrap();
    assert!(graph_json.contains("\"math\""));
    assert!(graph_json.contains("\"render\""));
    assert!(graph_json.contains("dynamic_library"));

    let export = tmp
        .path()
        .join("out/packages/engine/linux-x64/debug/engine.package.toml");
    assert!(export.exists());
    let export_toml = fs::read_to_string(export).unwrap();
    assert!(export_toml.contains("package_name = \"engine\""));
    assert!(export_toml.contains("name = \"math\""));
    assert!(export_toml.contains("name = \"render\""));

    let version = tmp
        .path()
        .join("out/packages/engine/linux-x64/debug/engine.version.toml");
    assert!(fs::read_to_string(version).unwrap().contains("0.3.1"));
}

#[test]
fn test_configure_requires_host_preset() {
    let tmp = temp_dir();
    write_workspace(&tmp, WORKSPACE_MANIFEST);

    slipway()
        .args([
            "configure",
            "--build-type",
            "debug",
            "--output-root",
            "out",
        ])
        .current_dir(tmp.path())
        .env_remove("SLIPWAY_HOST_PRESET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("host-preset"));
}

#[test]
fn test_configure_fails_without_manifest() {
    let tmp = temp_dir();

    slipway()
        .args(configure_args(&tmp))
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Slipway.toml"));
}

#[test]
fn test_configure_reports_linkage_violation() {
    let tmp = temp_dir();
    let manifest = r#"
[package]
name = "engine"
version = "0.1.0"

[[project]]
name = "contracts"
kind = "interface"

[project.dependencies]
public = ["math"]
"#;
    fs::write(tmp.path().join("Slipway.toml"), manifest).unwrap();

    slipway()
        .args(configure_args(&tmp))
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("`public`"))
        .stderr(predicate::str::contains("contracts"));
}

#[test]
fn test_configure_fails_on_unresolved_dependency() {
    let tmp = temp_dir();
    let manifest = r#"
[package]
name = "engine"
version = "0.1.0"

[[project]]
name = "core"
kind = "static_library"
external_packages = ["ghost-package"]
"#;
    fs::write(tmp.path().join("Slipway.toml"), manifest).unwrap();

    slipway()
        .args(configure_args(&tmp))
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost-package"));
}

// ============================================================================
// slipway clean
// ============================================================================

#[test]
fn test_clean_removes_output_root() {
    let tmp = temp_dir();
    write_workspace(&tmp, WORKSPACE_MANIFEST);

    slipway()
        .args(configure_args(&tmp))
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(tmp.path().join("out").exists());

    let mut clean_args = configure_args(&tmp);
    clean_args[0] = "clean".to_string();
    slipway()
        .args(clean_args)
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(!tmp.path().join("out").exists());
}

// ============================================================================
// slipway completions
// ============================================================================

#[test]
fn test_completions_bash() {
    slipway()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slipway"));
}
