//! Slipway.toml manifest parsing and schema.
//!
//! The manifest is the declarative description of one logical package:
//! its projects, code-generation outputs and script projects. Host
//! preset, build type and output root are invocation inputs and do not
//! live here.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::project::ProjectDescriptor;
use crate::util::diagnostic::ConfigurationError;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Slipway.toml";

/// `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Logical package name
    pub name: String,

    /// Package category (engine, application, sdk, ...)
    #[serde(default = "default_category")]
    pub category: String,

    /// Package version
    pub version: Version,

    /// Root namespace filtering interface extraction
    #[serde(default)]
    pub root_namespace: Option<String>,
}

fn default_category() -> String {
    "engine".to_string()
}

fn default_true() -> bool {
    true
}

/// `[codegen]` section - which fan-out outputs are produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Directory holding the stage templates
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    /// Emit the interface document as an exported artifact
    #[serde(default = "default_true")]
    pub interface_json: bool,

    /// Emit the native reflection header
    #[serde(default = "default_true")]
    pub native_header: bool,

    /// Emit the wire-schema file
    #[serde(default = "default_true")]
    pub wire_schema: bool,

    /// Emit the C++ script-boundary wrapper
    #[serde(default = "default_true")]
    pub wrapper_cxx: bool,

    /// Emit the managed-runtime wrapper
    #[serde(default = "default_true")]
    pub wrapper_csharp: bool,

    /// Emit the systems-language wrapper
    #[serde(default = "default_true")]
    pub wrapper_rust: bool,

    /// Files pre-included before each header during extraction
    #[serde(default)]
    pub include_files: Vec<PathBuf>,

    /// Extra include directories handed to the extractor
    #[serde(default)]
    pub extra_include_dirs: Vec<String>,
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            template_dir: default_template_dir(),
            interface_json: true,
            native_header: true,
            wire_schema: true,
            wrapper_cxx: true,
            wrapper_csharp: true,
            wrapper_rust: true,
            include_files: Vec::new(),
            extra_include_dirs: Vec::new(),
        }
    }
}

/// `[[script]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Path to the script's own manifest, relative to the workspace root
    pub manifest: PathBuf,

    /// Build profile override (defaults to the invocation's build type)
    #[serde(default)]
    pub profile: Option<String>,
}

/// The parsed workspace manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    pub package: PackageSection,

    #[serde(default)]
    pub codegen: CodegenConfig,

    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectDescriptor>,

    #[serde(default, rename = "script")]
    pub scripts: Vec<ScriptEntry>,

    /// Root directory the manifest was loaded from (not serialized)
    #[serde(skip)]
    pub root: PathBuf,
}

impl WorkspaceManifest {
    /// Load and validate a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = crate::util::fs::read_to_string(path)?;
        let mut manifest: WorkspaceManifest = toml::from_str(&content)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;

        manifest.root = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate manifest-level invariants.
    pub fn validate(&mut self) -> Result<()> {
        if self.package.name.trim().is_empty() {
            return Err(ConfigurationError::missing("package-name").into());
        }

        let mut seen = std::collections::HashSet::new();
        for project in &mut self.projects {
            project.validate()?;
            project.dependencies.dedup();

            if !seen.insert(project.name.clone()) {
                bail!(
                    "duplicate project `{}` in package `{}`",
                    project.name,
                    self.package.name
                );
            }
        }

        let carries_interfaces = self
            .projects
            .iter()
            .any(|p| !p.interface_headers.is_empty());
        if carries_interfaces && self.root_namespace().is_none() {
            return Err(ConfigurationError::missing("root-namespace").into());
        }

        Ok(())
    }

    /// The root namespace, if declared non-empty.
    pub fn root_namespace(&self) -> Option<&str> {
        self.package
            .root_namespace
            .as_deref()
            .filter(|ns| !ns.trim().is_empty())
    }

    /// Look up a declared project by name.
    pub fn project(&self, name: &str) -> Option<&ProjectDescriptor> {
        self.projects.iter().find(|p| p.name == name)
    }
}

/// Find the manifest by walking up from a starting directory.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !dir.pop() {
            bail!(
                "no {} found in `{}` or any parent directory\n{}",
                MANIFEST_NAME,
                start.display(),
                crate::util::diagnostic::suggestions::NO_MANIFEST
            );
        }
    }
}
