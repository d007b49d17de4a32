//! Package oracle - external dependency resolution.
//!
//! The oracle answers one question: for a named package under a host
//! preset and build type, where do its headers and libraries live and
//! what are its linkable target names. Resolution and fetching belong to
//! the external package manager; Slipway only consumes the answer.

use std::path::PathBuf;

use anyhow::Result;

use crate::export;

/// Result of resolving a named package.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Public include directories of the package
    pub include_dirs: Vec<PathBuf>,

    /// Library search paths
    pub lib_dirs: Vec<PathBuf>,

    /// Linkable target names exported by the package
    pub link_names: Vec<String>,
}

/// A source of installed packages.
pub trait PackageOracle {
    /// Resolve a package by name for a host preset and build type.
    ///
    /// `Ok(None)` means not found; callers decide whether that is fatal.
    fn resolve(
        &self,
        name: &str,
        host_preset: &str,
        build_type: &str,
    ) -> Result<Option<Resolution>>;

    /// Source name for diagnostics.
    fn source_name(&self) -> &str;
}

/// Oracle backed by an install root of exported package descriptors,
/// the same layout `export::emit_package` writes:
/// `<root>/<name>/<preset>/<build_type>/<name>.package.toml` next to the
/// package's `include/` and `lib/` directories.
pub struct DirectoryOracle {
    install_root: PathBuf,
}

impl DirectoryOracle {
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        DirectoryOracle {
            install_root: install_root.into(),
        }
    }
}

impl PackageOracle for DirectoryOracle {
    fn resolve(
        &self,
        name: &str,
        host_preset: &str,
        build_type: &str,
    ) -> Result<Option<Resolution>> {
        let dir = export::package_dir(&self.install_root, name, host_preset, build_type);
        let manifest_path = dir.join(format!("{}.package.toml", name));

        if !manifest_path.is_file() {
            tracing::debug!(
                "package `{}` not found at {}",
                name,
                manifest_path.display()
            );
            return Ok(None);
        }

        let manifest = export::load_manifest(&manifest_path)?;

        let mut resolution = Resolution::default();
        let include_dir = dir.join("include");
        if include_dir.is_dir() {
            resolution.include_dirs.push(include_dir);
        }
        let lib_dir = dir.join("lib");
        if lib_dir.is_dir() {
            resolution.lib_dirs.push(lib_dir);
        }
        resolution.link_names = manifest.targets.into_iter().map(|t| t.name).collect();

        Ok(Some(resolution))
    }

    fn source_name(&self) -> &str {
        "install-root"
    }
}

/// A prioritized collection of oracles; first hit wins.
#[derive(Default)]
pub struct OracleSet {
    oracles: Vec<Box<dyn PackageOracle>>,
}

impl OracleSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        OracleSet::default()
    }

    /// Add an oracle to the set.
    pub fn add(&mut self, oracle: Box<dyn PackageOracle>) {
        self.oracles.push(oracle);
    }

    /// Query oracles in order until one resolves the package.
    pub fn resolve(
        &self,
        name: &str,
        host_preset: &str,
        build_type: &str,
    ) -> Result<Option<Resolution>> {
        for oracle in &self.oracles {
            match oracle.resolve(name, host_preset, build_type) {
                Ok(Some(resolution)) => return Ok(Some(resolution)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(
                        "oracle {} failed to resolve {}: {}",
                        oracle.source_name(),
                        name,
                        e
                    );
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
pub mod mock {
    //! Mock oracle for unit tests.

    use std::collections::HashMap;

    use super::*;

    /// In-memory oracle seeded with fixed resolutions.
    #[derive(Default)]
    pub struct MockOracle {
        packages: HashMap<String, Resolution>,
    }

    impl MockOracle {
        pub fn new() -> Self {
            MockOracle::default()
        }

        pub fn with_package(mut self, name: &str, resolution: Resolution) -> Self {
            self.packages.insert(name.to_string(), resolution);
            self
        }
    }

    impl PackageOracle for MockOracle {
        fn resolve(
            &self,
            name: &str,
            _host_preset: &str,
            _build_type: &str,
        ) -> Result<Option<Resolution>> {
            Ok(self.packages.get(name).cloned())
        }

        fn source_name(&self) -> &str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockOracle;
    use super::*;
    use crate::core::package::PackageDescriptor;
    use crate::core::target_ref::TargetRef;
    use crate::graph::NodeId;
    use semver::Version;
    use tempfile::TempDir;

    #[test]
    fn test_directory_oracle_round_trip() {
        let tmp = TempDir::new().unwrap();

        let descriptor = PackageDescriptor {
            package_name: "math".to_string(),
            category: "engine".to_string(),
            host_preset: "linux-x64".to_string(),
            build_type: "debug".to_string(),
            member_targets: vec![TargetRef::materialized(NodeId(0), "math")],
            version: Version::new(1, 2, 0),
            transitive_packages: vec![],
        };
        export::emit_package(tmp.path(), &descriptor, "math").unwrap();

        let dir = export::package_dir(tmp.path(), "math", "linux-x64", "debug");
        std::fs::create_dir_all(dir.join("include")).unwrap();

        let oracle = DirectoryOracle::new(tmp.path());
        let resolution = oracle
            .resolve("math", "linux-x64", "debug")
            .unwrap()
            .expect("package should resolve");

        assert_eq!(resolution.link_names, vec!["math"]);
        assert_eq!(resolution.include_dirs.len(), 1);
    }

    #[test]
    fn test_directory_oracle_not_found() {
        let tmp = TempDir::new().unwrap();
        let oracle = DirectoryOracle::new(tmp.path());

        assert!(oracle
            .resolve("ghost", "linux-x64", "debug")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_oracle_set_first_hit_wins() {
        let mut set = OracleSet::new();
        set.add(Box::new(MockOracle::new()));
        set.add(Box::new(MockOracle::new().with_package(
            "fmt",
            Resolution {
                include_dirs: vec![PathBuf::from("/pkgs/fmt/include")],
                lib_dirs: vec![],
                link_names: vec!["fmt".to_string()],
            },
        )));

        let resolution = set.resolve("fmt", "linux-x64", "debug").unwrap().unwrap();
        assert_eq!(resolution.link_names, vec!["fmt"]);
        assert!(set.resolve("missing", "linux-x64", "debug").unwrap().is_none());
    }
}
