//! Native-build-tool script strategy (cmake).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::scripts::probe::{CMakeProbe, ManifestProbe};
use crate::util::diagnostic::ConfigurationError;
use crate::util::process::{find_cmake, ProcessBuilder};

/// Read the declared project name from the manifest.
pub fn project_name(manifest_path: &Path) -> Result<String> {
    let content = crate::util::fs::read_to_string(manifest_path)?;
    match CMakeProbe::new(content).field("project") {
        Some(name) => Ok(name),
        None => bail!(
            "`{}` declares no project(); cannot derive the module location",
            manifest_path.display()
        ),
    }
}

/// Per-profile build directory next to the manifest.
pub fn build_dir(manifest_dir: &Path, profile: &str) -> PathBuf {
    manifest_dir.join(format!("build-{}", profile))
}

/// Deterministic module location under the build directory.
pub fn module_path(manifest_dir: &Path, project_name: &str, profile: &str) -> PathBuf {
    build_dir(manifest_dir, profile).join(format!("{}.wasm", project_name))
}

/// Configure and build the script project, returning the module path.
pub fn build(manifest_path: &Path, profile: &str) -> Result<PathBuf> {
    let name = project_name(manifest_path)?;

    let cmake = find_cmake().ok_or_else(|| ConfigurationError::ToolMissing {
        tool: "cmake".to_string(),
    })?;

    let manifest_dir = manifest_path.parent().unwrap_or(Path::new("."));
    let build_dir = build_dir(manifest_dir, profile);

    let build_type = if profile == "release" {
        "Release"
    } else {
        "Debug"
    };

    ProcessBuilder::new(&cmake)
        .arg("-S")
        .arg(manifest_dir)
        .arg("-B")
        .arg(&build_dir)
        .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type))
        .exec_and_check()
        .with_context(|| format!("script configure failed for `{}`", manifest_path.display()))?;

    ProcessBuilder::new(&cmake)
        .arg("--build")
        .arg(&build_dir)
        .exec_and_check()
        .with_context(|| format!("script build failed for `{}`", manifest_path.display()))?;

    Ok(module_path(manifest_dir, &name, profile))
}
