//! Target references.
//!
//! A TargetRef is an opaque handle to either a build node materialized
//! by this configure invocation, or a named node provided by an
//! installed package and resolved lazily through the package oracle.

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Handle to a build target, materialized or package-provided.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRef {
    /// A node created by this invocation.
    Materialized { node: NodeId, name: String },

    /// A named node expected from an installed package.
    Named { name: String },
}

impl TargetRef {
    /// Reference a materialized node.
    pub fn materialized(node: NodeId, name: impl Into<String>) -> Self {
        TargetRef::Materialized {
            node,
            name: name.into(),
        }
    }

    /// Reference a package-provided node by name.
    pub fn named(name: impl Into<String>) -> Self {
        TargetRef::Named { name: name.into() }
    }

    /// The target's name, regardless of where it comes from.
    pub fn name(&self) -> &str {
        match self {
            TargetRef::Materialized { name, .. } => name,
            TargetRef::Named { name } => name,
        }
    }

    /// Node id if this target was materialized by this invocation.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            TargetRef::Materialized { node, .. } => Some(*node),
            TargetRef::Named { .. } => None,
        }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetRef::Materialized { name, .. } => write!(f, "{}", name),
            TargetRef::Named { name } => write!(f, "{} (external)", name),
        }
    }
}
