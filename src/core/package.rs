//! Package descriptors and the configure-pass registry.
//!
//! Every project registered during one configure pass lands in the
//! PackageRegistry under its logical package name. The registry is owned
//! by the configure orchestrator and finalized exactly once after all
//! projects are processed; accumulation is idempotent and preserves
//! first-registration order.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::target_ref::TargetRef;

/// The exportable manifest of all build targets registered under one
/// logical package name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Logical package name
    pub package_name: String,

    /// Package category (engine, application, sdk, ...)
    pub category: String,

    /// Host platform preset this package was configured for
    pub host_preset: String,

    /// Build type this package was configured for
    pub build_type: String,

    /// Member targets in first-registration order, no duplicates
    pub member_targets: Vec<TargetRef>,

    /// Package version
    pub version: Version,

    /// Names of external packages the members depend on
    #[serde(default)]
    pub transitive_packages: Vec<String>,
}

/// Accumulates target registrations per package during one configure pass.
///
/// The graph-description phase is single-threaded, so no locking is
/// needed; the registry just enforces ordered, duplicate-free
/// accumulation and a single finalize.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    members: BTreeMap<String, Vec<TargetRef>>,
    transitive: BTreeMap<String, Vec<String>>,
    finalized: bool,
}

impl PackageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        PackageRegistry::default()
    }

    /// Register a target under a package name.
    ///
    /// Re-registering the same target name is a no-op, so an erroneously
    /// double-declared project cannot produce a duplicate export entry.
    pub fn register(&mut self, package_name: &str, target: TargetRef) -> Result<()> {
        if self.finalized {
            bail!(
                "cannot register `{}`: package registry already finalized",
                target.name()
            );
        }

        let members = self.members.entry(package_name.to_string()).or_default();
        if members.iter().any(|t| t.name() == target.name()) {
            tracing::debug!(
                "target `{}` already registered under package `{}`",
                target.name(),
                package_name
            );
            return Ok(());
        }

        members.push(target);
        Ok(())
    }

    /// Record an external package used by a member of `package_name`.
    pub fn record_external(&mut self, package_name: &str, external: &str) {
        let list = self.transitive.entry(package_name.to_string()).or_default();
        if !list.iter().any(|p| p == external) {
            list.push(external.to_string());
        }
    }

    /// Number of targets registered under a package.
    pub fn member_count(&self, package_name: &str) -> usize {
        self.members.get(package_name).map_or(0, |m| m.len())
    }

    /// Finalize one package into its descriptor.
    ///
    /// Must be called after all projects are processed; the descriptor
    /// reflects the complete member set, not a point-in-time prefix.
    pub fn finalize(
        &mut self,
        package_name: &str,
        category: &str,
        host_preset: &str,
        build_type: &str,
        version: Version,
    ) -> Result<PackageDescriptor> {
        let members = match self.members.get(package_name) {
            Some(m) if !m.is_empty() => m.clone(),
            _ => bail!(
                "no targets registered under package `{}`; nothing to export",
                package_name
            ),
        };

        self.finalized = true;

        Ok(PackageDescriptor {
            package_name: package_name.to_string(),
            category: category.to_string(),
            host_preset: host_preset.to_string(),
            build_type: build_type.to_string(),
            member_targets: members,
            version,
            transitive_packages: self
                .transitive
                .get(package_name)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn target(id: usize, name: &str) -> TargetRef {
        TargetRef::materialized(NodeId(id), name)
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = PackageRegistry::new();
        registry.register("engine", target(0, "core")).unwrap();
        registry.register("engine", target(1, "render")).unwrap();
        registry.register("engine", target(2, "audio")).unwrap();

        let descriptor = registry
            .finalize("engine", "engine", "linux-x64", "debug", Version::new(0, 3, 1))
            .unwrap();

        let names: Vec<_> = descriptor.member_targets.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["core", "render", "audio"]);
    }

    #[test]
    fn test_double_registration_is_idempotent() {
        let mut registry = PackageRegistry::new();
        registry.register("engine", target(0, "core")).unwrap();
        registry.register("engine", target(1, "render")).unwrap();
        registry.register("engine", target(0, "core")).unwrap();

        assert_eq!(registry.member_count("engine"), 2);
    }

    #[test]
    fn test_register_after_finalize_fails() {
        let mut registry = PackageRegistry::new();
        registry.register("engine", target(0, "core")).unwrap();
        registry
            .finalize("engine", "engine", "linux-x64", "debug", Version::new(1, 0, 0))
            .unwrap();

        assert!(registry.register("engine", target(1, "late")).is_err());
    }

    #[test]
    fn test_finalize_empty_package_fails() {
        let mut registry = PackageRegistry::new();
        assert!(registry
            .finalize("ghost", "engine", "linux-x64", "debug", Version::new(1, 0, 0))
            .is_err());
    }

    #[test]
    fn test_external_packages_recorded_once() {
        let mut registry = PackageRegistry::new();
        registry.register("engine", target(0, "core")).unwrap();
        registry.record_external("engine", "fmt");
        registry.record_external("engine", "fmt");
        registry.record_external("engine", "spdlog");

        let descriptor = registry
            .finalize("engine", "engine", "linux-x64", "debug", Version::new(1, 0, 0))
            .unwrap();
        assert_eq!(descriptor.transitive_packages, vec!["fmt", "spdlog"]);
    }
}
