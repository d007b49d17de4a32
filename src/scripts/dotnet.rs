//! Managed-runtime script strategy (dotnet).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::scripts::probe::{CsprojProbe, ManifestProbe};
use crate::util::diagnostic::ConfigurationError;
use crate::util::process::{find_dotnet, ProcessBuilder};

/// Default target framework when the project file omits it.
const DEFAULT_TFM: &str = "net9.0";

/// Fields the strategy needs from the project file.
#[derive(Debug, Clone)]
pub struct ProjectFields {
    pub assembly_name: String,
    pub target_framework: String,
}

/// Extract the needed fields. The assembly name falls back to the
/// project file's own stem, matching the toolchain's behavior.
pub fn project_fields(manifest_path: &Path) -> Result<ProjectFields> {
    let content = crate::util::fs::read_to_string(manifest_path)?;
    let probe = CsprojProbe::new(content);

    let assembly_name = probe.field("assembly_name").or_else(|| {
        manifest_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    });

    let Some(assembly_name) = assembly_name else {
        anyhow::bail!(
            "`{}` declares no assembly name and has no usable file stem",
            manifest_path.display()
        );
    };

    Ok(ProjectFields {
        assembly_name,
        target_framework: probe
            .field("target_framework")
            .unwrap_or_else(|| DEFAULT_TFM.to_string()),
    })
}

/// Deterministic module location under the publish layout.
pub fn module_path(manifest_dir: &Path, fields: &ProjectFields, profile: &str) -> PathBuf {
    let configuration = if profile == "release" {
        "Release"
    } else {
        "Debug"
    };

    manifest_dir
        .join("bin")
        .join(configuration)
        .join(&fields.target_framework)
        .join("publish")
        .join(format!("{}.wasm", fields.assembly_name))
}

/// Publish the script project and return the produced module path.
pub fn build(manifest_path: &Path, profile: &str) -> Result<PathBuf> {
    let fields = project_fields(manifest_path)?;

    let dotnet = find_dotnet().ok_or_else(|| ConfigurationError::ToolMissing {
        tool: "dotnet".to_string(),
    })?;

    let configuration = if profile == "release" {
        "Release"
    } else {
        "Debug"
    };

    ProcessBuilder::new(dotnet)
        .arg("publish")
        .arg(manifest_path)
        .arg("-c")
        .arg(configuration)
        .exec_and_check()
        .with_context(|| format!("script publish failed for `{}`", manifest_path.display()))?;

    let manifest_dir = manifest_path.parent().unwrap_or(Path::new("."));
    Ok(module_path(manifest_dir, &fields, profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_layout() {
        let fields = ProjectFields {
            assembly_name: "HudScript".to_string(),
            target_framework: "net9.0".to_string(),
        };

        let path = module_path(Path::new("/ws/scripts/Hud"), &fields, "release");
        assert_eq!(
            path,
            Path::new("/ws/scripts/Hud/bin/Release/net9.0/publish/HudScript.wasm")
        );
    }

    #[test]
    fn test_assembly_name_falls_back_to_stem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let manifest = tmp.path().join("Hud.csproj");
        std::fs::write(&manifest, "<Project></Project>").unwrap();

        let fields = project_fields(&manifest).unwrap();
        assert_eq!(fields.assembly_name, "Hud");
        assert_eq!(fields.target_framework, DEFAULT_TFM);
    }
}
