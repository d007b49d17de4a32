//! Core data structures for Slipway.
//!
//! This module contains the foundational types used throughout Slipway:
//! - Project descriptors and the closed project-kind set
//! - Target references (materialized vs. package-provided)
//! - Package descriptors and the configure-pass registry
//! - Interface headers and generated artifacts
//! - Workspace manifests

pub mod interface;
pub mod manifest;
pub mod package;
pub mod project;
pub mod script;
pub mod target_ref;

pub use interface::{GeneratedArtifact, InterfaceHeader, Stage, WrapperLang};
pub use manifest::{find_manifest, WorkspaceManifest, MANIFEST_NAME};
pub use package::{PackageDescriptor, PackageRegistry};
pub use project::{DependencyKeyword, DependencySet, ProjectDescriptor, ProjectKind};
pub use script::{ScriptLanguage, ScriptProject};
pub use target_ref::TargetRef;
