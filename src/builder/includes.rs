//! Transitive include directory collection.
//!
//! The extractor needs a flat search path: the target's own public
//! include directories plus those of every public dependency,
//! recursively. Order matters - it becomes the extractor's search-path
//! order, and earlier paths shadow later ones on name collision - so
//! traversal preserves first-occurrence order and drops duplicates.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;

use crate::builder::genex;
use crate::core::project::DependencyKeyword;
use crate::core::target_ref::TargetRef;
use crate::graph::BuildGraph;
use crate::oracle::OracleSet;
use crate::util::diagnostic::DependencyResolutionError;

/// Collects public include directories across the dependency graph.
pub struct IncludeCollector<'a> {
    graph: &'a BuildGraph,
    oracles: &'a OracleSet,
    host_preset: &'a str,
    build_type: &'a str,
    active_config: Option<&'a str>,
}

impl<'a> IncludeCollector<'a> {
    pub fn new(
        graph: &'a BuildGraph,
        oracles: &'a OracleSet,
        host_preset: &'a str,
        build_type: &'a str,
        active_config: Option<&'a str>,
    ) -> Self {
        IncludeCollector {
            graph,
            oracles,
            host_preset,
            build_type,
            active_config,
        }
    }

    /// Collect the target's own and transitive public include dirs.
    pub fn collect(&self, target: &TargetRef) -> Result<Vec<PathBuf>> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.walk(target, target.name(), &mut visited, &mut out)?;
        Ok(out)
    }

    fn walk(
        &self,
        target: &TargetRef,
        root: &str,
        visited: &mut HashSet<String>,
        out: &mut Vec<PathBuf>,
    ) -> Result<()> {
        if !visited.insert(target.name().to_string()) {
            return Ok(());
        }

        // Named refs may still be materialized in this invocation;
        // only fall back to the oracle when they are not.
        let node_id = match target {
            TargetRef::Materialized { node, .. } => Some(*node),
            TargetRef::Named { name } => self.graph.find_target(name),
        };

        match node_id {
            Some(id) => {
                let node = self.graph.target(id);

                let raw: Vec<String> = node
                    .include_dirs
                    .iter()
                    .filter(|d| d.visibility != DependencyKeyword::Private)
                    .map(|d| d.entry.clone())
                    .collect();
                push_unique(out, genex::normalize(&raw, self.active_config));

                // Interface edges carry usage requirements just like
                // public ones; private edges stay internal.
                let deps: Vec<TargetRef> = node
                    .deps
                    .iter()
                    .filter(|e| e.visibility != DependencyKeyword::Private)
                    .map(|e| e.target.clone())
                    .collect();
                for dep in deps {
                    self.walk(&dep, root, visited, out)?;
                }
            }
            None => {
                let resolution = self
                    .oracles
                    .resolve(target.name(), self.host_preset, self.build_type)?
                    .ok_or_else(|| DependencyResolutionError::new(target.name(), root))?;
                push_unique(out, resolution.include_dirs);
            }
        }

        Ok(())
    }
}

fn push_unique(out: &mut Vec<PathBuf>, items: Vec<PathBuf>) {
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{IncludeDir, NodeKind, TargetNode};
    use crate::oracle::mock::MockOracle;
    use crate::oracle::Resolution;

    fn node(name: &str, public_includes: &[&str]) -> TargetNode {
        TargetNode {
            name: name.to_string(),
            kind: NodeKind::StaticArchive,
            sources: vec![],
            include_dirs: public_includes
                .iter()
                .map(|d| IncludeDir {
                    entry: d.to_string(),
                    visibility: DependencyKeyword::Public,
                })
                .collect(),
            deps: vec![],
            link_names: vec![],
            lib_dirs: vec![],
        }
    }

    fn collector<'a>(graph: &'a BuildGraph, oracles: &'a OracleSet) -> IncludeCollector<'a> {
        IncludeCollector::new(graph, oracles, "linux-x64", "debug", None)
    }

    #[test]
    fn test_own_dirs_before_dependency_dirs() {
        let mut graph = BuildGraph::new();
        let dep = graph.add_target(node("contracts", &["contracts/include"])).unwrap();
        let lib = graph.add_target(node("render", &["render/include"])).unwrap();
        graph.link(
            lib,
            TargetRef::materialized(dep, "contracts"),
            DependencyKeyword::Public,
        );

        let oracles = OracleSet::new();
        let dirs = collector(&graph, &oracles)
            .collect(&TargetRef::materialized(lib, "render"))
            .unwrap();

        assert_eq!(
            dirs,
            vec![
                PathBuf::from("render/include"),
                PathBuf::from("contracts/include")
            ]
        );
    }

    #[test]
    fn test_private_dependencies_not_followed() {
        let mut graph = BuildGraph::new();
        let dep = graph.add_target(node("zlib-shim", &["zlib/include"])).unwrap();
        let lib = graph.add_target(node("io", &["io/include"])).unwrap();
        graph.link(
            lib,
            TargetRef::materialized(dep, "zlib-shim"),
            DependencyKeyword::Private,
        );

        let oracles = OracleSet::new();
        let dirs = collector(&graph, &oracles)
            .collect(&TargetRef::materialized(lib, "io"))
            .unwrap();

        assert_eq!(dirs, vec![PathBuf::from("io/include")]);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = BuildGraph::new();
        let a = graph.add_target(node("a", &["a/include"])).unwrap();
        let b = graph.add_target(node("b", &["b/include"])).unwrap();
        graph.link(a, TargetRef::materialized(b, "b"), DependencyKeyword::Public);
        graph.link(b, TargetRef::materialized(a, "a"), DependencyKeyword::Public);

        let oracles = OracleSet::new();
        let dirs = collector(&graph, &oracles)
            .collect(&TargetRef::materialized(a, "a"))
            .unwrap();

        assert_eq!(
            dirs,
            vec![PathBuf::from("a/include"), PathBuf::from("b/include")]
        );
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let mut graph = BuildGraph::new();
        let shared = graph.add_target(node("shared", &["common/include"])).unwrap();
        let lib = graph
            .add_target(node("app", &["common/include", "app/include"]))
            .unwrap();
        graph.link(
            lib,
            TargetRef::materialized(shared, "shared"),
            DependencyKeyword::Public,
        );

        let oracles = OracleSet::new();
        let dirs = collector(&graph, &oracles)
            .collect(&TargetRef::materialized(lib, "app"))
            .unwrap();

        assert_eq!(
            dirs,
            vec![PathBuf::from("common/include"), PathBuf::from("app/include")]
        );
    }

    #[test]
    fn test_named_dependency_resolved_via_oracle() {
        let mut graph = BuildGraph::new();
        let lib = graph.add_target(node("app", &["app/include"])).unwrap();
        graph.link(lib, TargetRef::named("fmt"), DependencyKeyword::Public);

        let mut oracles = OracleSet::new();
        oracles.add(Box::new(MockOracle::new().with_package(
            "fmt",
            Resolution {
                include_dirs: vec![PathBuf::from("/pkgs/fmt/include")],
                lib_dirs: vec![],
                link_names: vec!["fmt".to_string()],
            },
        )));

        let dirs = collector(&graph, &oracles)
            .collect(&TargetRef::materialized(lib, "app"))
            .unwrap();

        assert_eq!(
            dirs,
            vec![
                PathBuf::from("app/include"),
                PathBuf::from("/pkgs/fmt/include")
            ]
        );
    }

    #[test]
    fn test_unresolved_dependency_is_fatal() {
        let mut graph = BuildGraph::new();
        let lib = graph.add_target(node("app", &[])).unwrap();
        graph.link(lib, TargetRef::named("ghost"), DependencyKeyword::Public);

        let oracles = OracleSet::new();
        let err = collector(&graph, &oracles)
            .collect(&TargetRef::materialized(lib, "app"))
            .unwrap_err();

        assert!(err.to_string().contains("ghost"));
    }
}
