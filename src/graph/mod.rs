//! Build node primitives.
//!
//! A BuildGraph is the described build graph: compile/link target nodes,
//! custom code-generation nodes with explicit output paths and input
//! dependencies, and visibility-tagged dependency edges. Slipway only
//! describes this graph; a downstream executor runs it, and is free to
//! parallelize any nodes not ordered by an edge.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};

use crate::core::project::DependencyKeyword;
use crate::core::target_ref::TargetRef;

/// Identifier of a target node in the described graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Identifier of a custom (code-generation) node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CustomId(pub usize);

/// Concrete node type a project kind maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Static archive (.a / .lib)
    StaticArchive,
    /// Shared/dynamic library
    DynamicLibrary,
    /// Header-only virtual node; usage requirements only
    HeaderOnly,
    /// Loadable module, opened at runtime rather than linked
    LoadableModule,
    /// Executable binary
    Executable,
}

/// An include directory attached to a target.
///
/// The raw entry may still carry a phase wrapper; it is preserved here so
/// install staging downstream can see the build/install distinction. Only
/// the extractor-facing path collection normalizes it away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeDir {
    /// Raw entry, possibly phase-wrapped
    pub entry: String,
    /// Visibility of the directory
    pub visibility: DependencyKeyword,
}

/// A dependency edge from one target to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub target: TargetRef,
    pub visibility: DependencyKeyword,
}

/// A compile/link target node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetNode {
    pub name: String,
    pub kind: NodeKind,

    /// Expanded source files
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Include directories with visibility and preserved phase wrappers
    #[serde(default)]
    pub include_dirs: Vec<IncludeDir>,

    /// Dependency edges with visibility
    #[serde(default)]
    pub deps: Vec<DependencyEdge>,

    /// External library names to link (from oracle resolutions)
    #[serde(default)]
    pub link_names: Vec<String>,

    /// Library search paths (from oracle resolutions)
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
}

/// Invocation recorded on a custom node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// A custom graph node: explicit outputs, explicit input dependencies,
/// and the command that produces the outputs. All-or-nothing: a failed
/// command must leave nothing at the output paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomNode {
    /// Display label (e.g. `extract:i_sample.h`)
    pub label: String,
    pub outputs: Vec<PathBuf>,
    pub inputs: Vec<PathBuf>,
    pub command: Option<CommandSpec>,
}

/// The described build graph.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BuildGraph {
    targets: Vec<TargetNode>,
    customs: Vec<CustomNode>,

    #[serde(skip)]
    by_name: HashMap<String, NodeId>,

    #[serde(skip)]
    claimed_outputs: HashMap<PathBuf, CustomId>,
}

impl BuildGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        BuildGraph::default()
    }

    /// Add a target node. Target names are unique per invocation.
    pub fn add_target(&mut self, node: TargetNode) -> Result<NodeId> {
        if self.by_name.contains_key(&node.name) {
            bail!("target `{}` declared twice in one configure pass", node.name);
        }

        let id = NodeId(self.targets.len());
        self.by_name.insert(node.name.clone(), id);
        self.targets.push(node);
        Ok(id)
    }

    /// Add a custom node, rejecting any output path already claimed by
    /// another node. Two nodes writing one file would race in a parallel
    /// executor.
    pub fn add_custom(&mut self, node: CustomNode) -> Result<CustomId> {
        for output in &node.outputs {
            if let Some(owner) = self.claimed_outputs.get(output) {
                let owner_label = &self.customs[owner.0].label;
                bail!(
                    "output `{}` claimed by both `{}` and `{}`",
                    output.display(),
                    owner_label,
                    node.label
                );
            }
        }

        let id = CustomId(self.customs.len());
        for output in &node.outputs {
            self.claimed_outputs.insert(output.clone(), id);
        }
        self.customs.push(node);
        Ok(id)
    }

    /// Attach a dependency edge to an existing target.
    pub fn link(&mut self, from: NodeId, to: TargetRef, visibility: DependencyKeyword) {
        self.targets[from.0].deps.push(DependencyEdge {
            target: to,
            visibility,
        });
    }

    /// Look up a materialized target by name.
    pub fn find_target(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Access a target node.
    pub fn target(&self, id: NodeId) -> &TargetNode {
        &self.targets[id.0]
    }

    /// Access a custom node.
    pub fn custom(&self, id: CustomId) -> &CustomNode {
        &self.customs[id.0]
    }

    /// All target nodes.
    pub fn targets(&self) -> &[TargetNode] {
        &self.targets
    }

    /// All custom nodes.
    pub fn customs(&self) -> &[CustomNode] {
        &self.customs
    }

    /// Topological order of the custom nodes, derived from declared
    /// output→input path matches. Stage order within one header chain
    /// comes from these edges, never from declaration order.
    pub fn custom_order(&self) -> Result<Vec<CustomId>> {
        let mut dag: DiGraph<CustomId, ()> = DiGraph::new();
        let indices: Vec<_> = (0..self.customs.len())
            .map(|i| dag.add_node(CustomId(i)))
            .collect();

        for (consumer_idx, consumer) in self.customs.iter().enumerate() {
            for input in &consumer.inputs {
                if let Some(producer) = self.claimed_outputs.get(input) {
                    dag.add_edge(indices[producer.0], indices[consumer_idx], ());
                }
            }
        }

        let order = toposort(&dag, None)
            .map_err(|cycle| {
                let label = &self.customs[dag[cycle.node_id()].0].label;
                anyhow!("cycle in generated-file graph involving `{}`", label)
            })?;

        Ok(order.into_iter().map(|ix| dag[ix]).collect())
    }

    /// Serialize the described graph for the downstream executor.
    pub fn emit(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::util::fs::atomic_write(path, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(label: &str, outputs: &[&str], inputs: &[&str]) -> CustomNode {
        CustomNode {
            label: label.to_string(),
            outputs: outputs.iter().map(PathBuf::from).collect(),
            inputs: inputs.iter().map(PathBuf::from).collect(),
            command: None,
        }
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let mut graph = BuildGraph::new();
        let node = TargetNode {
            name: "core".to_string(),
            kind: NodeKind::StaticArchive,
            sources: vec![],
            include_dirs: vec![],
            deps: vec![],
            link_names: vec![],
            lib_dirs: vec![],
        };

        graph.add_target(node.clone()).unwrap();
        assert!(graph.add_target(node).is_err());
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let mut graph = BuildGraph::new();
        graph
            .add_custom(custom("a", &["out/x.json"], &["x.h"]))
            .unwrap();

        let err = graph
            .add_custom(custom("b", &["out/x.json"], &["y.h"]))
            .unwrap_err();
        assert!(err.to_string().contains("out/x.json"));
    }

    #[test]
    fn test_custom_order_respects_chains() {
        let mut graph = BuildGraph::new();
        // Declared out of order on purpose: edges, not declaration order,
        // must drive scheduling.
        let render = graph
            .add_custom(custom("render", &["out/x.wit"], &["out/x.interface.json"]))
            .unwrap();
        let simplify = graph
            .add_custom(custom(
                "simplify",
                &["out/x.interface.json"],
                &["out/x.ast.json"],
            ))
            .unwrap();
        let extract = graph
            .add_custom(custom("extract", &["out/x.ast.json"], &["x.h"]))
            .unwrap();

        let order = graph.custom_order().unwrap();
        let pos = |id: CustomId| order.iter().position(|&c| c == id).unwrap();

        assert!(pos(extract) < pos(simplify));
        assert!(pos(simplify) < pos(render));
    }

    #[test]
    fn test_link_records_visibility() {
        let mut graph = BuildGraph::new();
        let a = graph
            .add_target(TargetNode {
                name: "a".to_string(),
                kind: NodeKind::StaticArchive,
                sources: vec![],
                include_dirs: vec![],
                deps: vec![],
                link_names: vec![],
                lib_dirs: vec![],
            })
            .unwrap();

        graph.link(a, TargetRef::named("m"), DependencyKeyword::Private);

        assert_eq!(graph.target(a).deps.len(), 1);
        assert_eq!(
            graph.target(a).deps[0].visibility,
            DependencyKeyword::Private
        );
    }
}
