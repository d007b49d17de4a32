//! Slipway - a project-description-to-build-graph compiler
//!
//! This crate provides the core library functionality for Slipway:
//! project-kind dispatch, transitive include collection, the interface
//! code-generation pipeline, and package descriptor export.

pub mod builder;
pub mod codegen;
pub mod core;
pub mod export;
pub mod graph;
pub mod ops;
pub mod oracle;
pub mod scripts;
pub mod util;

pub use crate::core::{
    interface::InterfaceHeader, manifest::WorkspaceManifest, package::PackageRegistry,
    project::ProjectDescriptor, project::ProjectKind, target_ref::TargetRef,
};

pub use crate::builder::ConfigureContext;
pub use crate::graph::BuildGraph;
pub use crate::oracle::PackageOracle;
