//! Install/package descriptor emission.
//!
//! After the registry is finalized, each package is exported as two
//! files under the install root: a target-export manifest
//! (`<name>.package.toml`) and a version/compatibility descriptor
//! (`<name>.version.toml`). A downstream invocation's package oracle
//! consumes exactly these files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::package::PackageDescriptor;
use crate::util::fs::atomic_write;
use crate::util::hash::Fingerprint;

/// One exported member target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTarget {
    pub name: String,
}

/// The target-export manifest: name, namespace, member target list and
/// the transitive external packages members depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub package_name: String,
    pub category: String,
    pub namespace: String,

    // Plain values must precede the [[target]] array-of-tables when
    // serialized to TOML.
    #[serde(default)]
    pub transitive_packages: Vec<String>,

    #[serde(rename = "target")]
    pub targets: Vec<ExportedTarget>,
}

/// The version/compatibility descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub package_name: String,
    pub version: Version,
    pub host_preset: String,
    pub build_type: String,

    /// Short digest of the exported surface (preset, build type, member
    /// list), so a consumer can detect an incompatible re-export without
    /// diffing the manifest.
    pub fingerprint: String,
}

/// Directory an exported package lands in:
/// `<install_root>/<name>/<host_preset>/<build_type>/`.
pub fn package_dir(
    install_root: &Path,
    name: &str,
    host_preset: &str,
    build_type: &str,
) -> PathBuf {
    install_root.join(name).join(host_preset).join(build_type)
}

/// Emit both descriptor files for a finalized package.
///
/// The exported target list is already duplicate-free and in
/// first-registration order; emission preserves it verbatim.
pub fn emit_package(
    install_root: &Path,
    descriptor: &PackageDescriptor,
    namespace: &str,
) -> Result<PathBuf> {
    let dir = package_dir(
        install_root,
        &descriptor.package_name,
        &descriptor.host_preset,
        &descriptor.build_type,
    );

    let manifest = ExportManifest {
        package_name: descriptor.package_name.clone(),
        category: descriptor.category.clone(),
        namespace: namespace.to_string(),
        transitive_packages: descriptor.transitive_packages.clone(),
        targets: descriptor
            .member_targets
            .iter()
            .map(|t| ExportedTarget {
                name: t.name().to_string(),
            })
            .collect(),
    };

    let manifest_path = dir.join(format!("{}.package.toml", descriptor.package_name));
    let manifest_toml = toml::to_string_pretty(&manifest)
        .with_context(|| format!("failed to serialize export manifest for `{}`", manifest.package_name))?;
    atomic_write(&manifest_path, manifest_toml.as_bytes())?;

    let mut fp = Fingerprint::new();
    fp.update_str(&descriptor.package_name)
        .update_str(&descriptor.host_preset)
        .update_str(&descriptor.build_type);
    fp.update_strs(descriptor.member_targets.iter().map(|t| t.name()));

    let version = VersionDescriptor {
        package_name: descriptor.package_name.clone(),
        version: descriptor.version.clone(),
        host_preset: descriptor.host_preset.clone(),
        build_type: descriptor.build_type.clone(),
        fingerprint: fp.finish_short(),
    };

    let version_path = dir.join(format!("{}.version.toml", descriptor.package_name));
    let version_toml = toml::to_string_pretty(&version)
        .with_context(|| format!("failed to serialize version descriptor for `{}`", version.package_name))?;
    atomic_write(&version_path, version_toml.as_bytes())?;

    tracing::info!(
        "exported package `{}` ({} target(s)) to {}",
        descriptor.package_name,
        manifest.targets.len(),
        dir.display()
    );

    Ok(manifest_path)
}

/// Load an export manifest back from disk.
pub fn load_manifest(path: &Path) -> Result<ExportManifest> {
    let content = crate::util::fs::read_to_string(path)?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse export manifest: {}", path.display()))
}

/// Load a version descriptor back from disk.
pub fn load_version(path: &Path) -> Result<VersionDescriptor> {
    let content = crate::util::fs::read_to_string(path)?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse version descriptor: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target_ref::TargetRef;
    use crate::graph::NodeId;
    use tempfile::TempDir;

    fn descriptor() -> PackageDescriptor {
        PackageDescriptor {
            package_name: "engine".to_string(),
            category: "engine".to_string(),
            host_preset: "linux-x64".to_string(),
            build_type: "debug".to_string(),
            member_targets: vec![
                TargetRef::materialized(NodeId(0), "core"),
                TargetRef::materialized(NodeId(1), "render"),
            ],
            version: Version::new(0, 3, 1),
            transitive_packages: vec!["fmt".to_string()],
        }
    }

    #[test]
    fn test_emit_and_reload() {
        let tmp = TempDir::new().unwrap();
        let manifest_path = emit_package(tmp.path(), &descriptor(), "engine").unwrap();

        let manifest = load_manifest(&manifest_path).unwrap();
        assert_eq!(manifest.package_name, "engine");
        let names: Vec<_> = manifest.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["core", "render"]);
        assert_eq!(manifest.transitive_packages, vec!["fmt"]);

        let version_path = manifest_path.with_file_name("engine.version.toml");
        let version = load_version(&version_path).unwrap();
        assert_eq!(version.version, Version::new(0, 3, 1));
        assert_eq!(version.host_preset, "linux-x64");
        assert_eq!(version.fingerprint.len(), 16);
    }

    #[test]
    fn test_fingerprint_tracks_member_set() {
        let tmp = TempDir::new().unwrap();
        emit_package(tmp.path(), &descriptor(), "engine").unwrap();
        let dir = package_dir(tmp.path(), "engine", "linux-x64", "debug");
        let first = load_version(&dir.join("engine.version.toml")).unwrap();

        let mut changed = descriptor();
        changed
            .member_targets
            .push(TargetRef::materialized(NodeId(2), "audio"));
        emit_package(tmp.path(), &changed, "engine").unwrap();
        let second = load_version(&dir.join("engine.version.toml")).unwrap();

        assert_ne!(first.fingerprint, second.fingerprint);
    }

    #[test]
    fn test_package_dir_layout() {
        let dir = package_dir(Path::new("/install"), "engine", "linux-x64", "release");
        assert_eq!(
            dir,
            Path::new("/install/engine/linux-x64/release")
        );
    }
}
