//! Configure context - the invocation-wide inputs.
//!
//! Host preset, build type and output root arrive from the command line
//! or `SLIPWAY_*` environment variables; package name and root namespace
//! from the manifest. All of them are prerequisites of the whole pass:
//! absence is a fatal error before any graph description happens.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::manifest::WorkspaceManifest;
use crate::util::diagnostic::ConfigurationError;

/// Invocation-wide configuration for one configure pass.
#[derive(Debug, Clone)]
pub struct ConfigureContext {
    /// Host platform preset identifier (e.g. `linux-x64`)
    pub host_preset: String,

    /// Build type identifier (e.g. `debug`, `release`)
    pub build_type: String,

    /// Root output folder for every produced artifact
    pub output_root: PathBuf,

    /// Logical package name
    pub package_name: String,

    /// Root namespace filtering interface extraction
    pub root_namespace: Option<String>,

    /// Active configuration for conditional-path evaluation
    pub active_config: Option<String>,

    /// Workspace root the manifest was loaded from
    pub workspace_root: PathBuf,
}

impl ConfigureContext {
    /// Build and validate a context from invocation inputs and manifest.
    pub fn new(
        manifest: &WorkspaceManifest,
        host_preset: Option<String>,
        build_type: Option<String>,
        output_root: Option<PathBuf>,
        active_config: Option<String>,
    ) -> Result<Self> {
        let host_preset = require(host_preset, "host-preset")?;
        let build_type = require(build_type, "build-type")?;
        let output_root =
            output_root.ok_or_else(|| ConfigurationError::missing("output-root"))?;

        if manifest.package.name.trim().is_empty() {
            return Err(ConfigurationError::missing("package-name").into());
        }

        // Conditional paths default to the build type when no explicit
        // configuration is given, so normalize() rarely has to fall back
        // to lossy stripping.
        let active_config = active_config.or_else(|| Some(build_type.clone()));

        Ok(ConfigureContext {
            host_preset,
            build_type,
            output_root,
            package_name: manifest.package.name.clone(),
            root_namespace: manifest.root_namespace().map(|s| s.to_string()),
            active_config,
            workspace_root: manifest.root.clone(),
        })
    }

    /// Root namespace, required for interface extraction.
    pub fn require_root_namespace(&self) -> Result<&str> {
        self.root_namespace
            .as_deref()
            .ok_or_else(|| ConfigurationError::missing("root-namespace").into())
    }

    /// Staging directory for AST documents (always produced).
    pub fn staging_dir(&self) -> PathBuf {
        self.output_root.join("codegen").join("ast")
    }

    /// Base directory for configured fan-out outputs.
    pub fn codegen_dir(&self, part: &str) -> PathBuf {
        self.output_root.join("codegen").join(part)
    }

    /// Install root for exported package descriptors.
    pub fn install_root(&self) -> PathBuf {
        self.output_root.join("packages")
    }

    /// Unified output directory for script modules.
    pub fn scripts_dir(&self) -> PathBuf {
        self.output_root.join("scripts")
    }

    /// Path of the emitted graph description.
    pub fn graph_path(&self) -> PathBuf {
        self.output_root.join("graph.json")
    }

    /// Resolve a manifest-relative path against the workspace root.
    pub fn workspace_path(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.workspace_root.join(relative)
        }
    }
}

fn require(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigurationError::missing(name).into()),
    }
}
