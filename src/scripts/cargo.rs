//! Systems-language script strategy (cargo).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::scripts::probe::{CargoProbe, ManifestProbe};
use crate::util::diagnostic::ConfigurationError;
use crate::util::process::{find_cargo, ProcessBuilder};

const WASM_TARGET: &str = "wasm32-wasip2";

/// Deterministic module location under cargo's own output layout.
///
/// Cargo translates dashes in the package name to underscores for the
/// artifact file.
pub fn module_path(manifest_dir: &Path, package_name: &str, profile: &str) -> PathBuf {
    manifest_dir
        .join("target")
        .join(WASM_TARGET)
        .join(profile)
        .join(format!("{}.wasm", package_name.replace('-', "_")))
}

/// Read the declared package name from the manifest.
pub fn package_name(manifest_path: &Path) -> Result<String> {
    let content = crate::util::fs::read_to_string(manifest_path)?;
    match CargoProbe::new(content).field("name") {
        Some(name) => Ok(name),
        None => bail!(
            "`{}` declares no package name; cannot derive the module location",
            manifest_path.display()
        ),
    }
}

/// Compile the script and return the produced module path.
pub fn build(manifest_path: &Path, profile: &str) -> Result<PathBuf> {
    let name = package_name(manifest_path)?;

    let cargo = find_cargo().ok_or_else(|| ConfigurationError::ToolMissing {
        tool: "cargo".to_string(),
    })?;

    let mut pb = ProcessBuilder::new(cargo)
        .arg("build")
        .arg("--manifest-path")
        .arg(manifest_path)
        .arg("--target")
        .arg(WASM_TARGET);
    if profile == "release" {
        pb = pb.arg("--release");
    }

    pb.exec_and_check()
        .with_context(|| format!("script build failed for `{}`", manifest_path.display()))?;

    let manifest_dir = manifest_path.parent().unwrap_or(Path::new("."));
    Ok(module_path(manifest_dir, &name, profile))
}
