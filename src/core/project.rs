//! Project descriptors - what gets declared.
//!
//! A ProjectDescriptor is the declarative description of one buildable
//! project: its archetype, sources, include folders, dependencies and
//! optional interface-header surface.

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// The closed set of project archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// Foundation static archive (engine base layer)
    Base,

    /// Static library (.a / .lib)
    #[serde(alias = "static", alias = "lib")]
    StaticLibrary,

    /// Shared/dynamic library (.so / .dylib / .dll)
    #[serde(alias = "shared", alias = "dylib")]
    SharedLibrary,

    /// Header-only library; no compiled sources
    HeaderOnly,

    /// Pure-interface project; contract surface only
    Interface,

    /// Dependency-inversion shim linked as a dynamic library
    InterfaceLinker,

    /// Loadable module, opened at runtime
    Module,

    /// Plugin dynamic library
    Plugin,

    /// Tool executable
    Tool,

    /// Test executable
    Test,

    /// Bootstrap executable (entry-point launcher)
    Bootstrap,
}

impl ProjectKind {
    /// Kinds that produce no compiled object code of their own.
    pub fn is_virtual(&self) -> bool {
        matches!(self, ProjectKind::HeaderOnly | ProjectKind::Interface)
    }

    /// Kinds that produce an executable.
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            ProjectKind::Tool | ProjectKind::Test | ProjectKind::Bootstrap
        )
    }

    /// Manifest spelling of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Base => "base",
            ProjectKind::StaticLibrary => "static_library",
            ProjectKind::SharedLibrary => "shared_library",
            ProjectKind::HeaderOnly => "header_only",
            ProjectKind::Interface => "interface",
            ProjectKind::InterfaceLinker => "interface_linker",
            ProjectKind::Module => "module",
            ProjectKind::Plugin => "plugin",
            ProjectKind::Tool => "tool",
            ProjectKind::Test => "test",
            ProjectKind::Bootstrap => "bootstrap",
        }
    }
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency visibility keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKeyword {
    /// Propagates to dependents
    Public,
    /// Internal only
    Private,
    /// Usage requirements only, no link of the declaring project itself
    Interface,
}

impl DependencyKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKeyword::Public => "public",
            DependencyKeyword::Private => "private",
            DependencyKeyword::Interface => "interface",
        }
    }
}

impl std::fmt::Display for DependencyKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared dependencies of a project, grouped by visibility keyword.
///
/// Order within each group is declaration order; duplicates are dropped
/// keeping the first occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencySet {
    #[serde(default)]
    pub public: Vec<String>,

    #[serde(default)]
    pub private: Vec<String>,

    #[serde(default)]
    pub interface: Vec<String>,
}

impl DependencySet {
    /// All declared dependency names with their keyword, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (DependencyKeyword, &str)> {
        self.public
            .iter()
            .map(|d| (DependencyKeyword::Public, d.as_str()))
            .chain(
                self.private
                    .iter()
                    .map(|d| (DependencyKeyword::Private, d.as_str())),
            )
            .chain(
                self.interface
                    .iter()
                    .map(|d| (DependencyKeyword::Interface, d.as_str())),
            )
    }

    /// Check if no dependencies are declared.
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty() && self.interface.is_empty()
    }

    /// Drop duplicate names within each keyword group, keeping first occurrence.
    pub fn dedup(&mut self) {
        for group in [&mut self.public, &mut self.private, &mut self.interface] {
            let mut seen = std::collections::HashSet::new();
            group.retain(|name| seen.insert(name.clone()));
        }
    }
}

/// A declared project with its configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    /// Project name (unique within the package)
    pub name: String,

    /// Archetype determining node type and linkage rules
    pub kind: ProjectKind,

    /// Include directories exported to dependents (may carry phase wrappers)
    #[serde(default)]
    pub public_include_dirs: Vec<String>,

    /// Include directories used internally only
    #[serde(default)]
    pub private_include_dirs: Vec<String>,

    /// Source file patterns (globs)
    #[serde(default)]
    pub sources: Vec<String>,

    /// Declared dependencies by visibility
    #[serde(default)]
    pub dependencies: DependencySet,

    /// Third-party packages resolved through the package oracle
    #[serde(default)]
    pub external_packages: Vec<String>,

    /// C++ headers designated as cross-runtime contract surfaces
    #[serde(default)]
    pub interface_headers: Vec<PathBuf>,
}

impl ProjectDescriptor {
    /// Create a new descriptor with the given name and kind.
    pub fn new(name: impl Into<String>, kind: ProjectKind) -> Self {
        ProjectDescriptor {
            name: name.into(),
            kind,
            public_include_dirs: Vec::new(),
            private_include_dirs: Vec::new(),
            sources: Vec::new(),
            dependencies: DependencySet::default(),
            external_packages: Vec::new(),
            interface_headers: Vec::new(),
        }
    }

    /// Add source patterns.
    pub fn with_sources(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sources = patterns.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Add public include directories.
    pub fn with_public_includes(
        mut self,
        dirs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.public_include_dirs = dirs.into_iter().map(|d| d.into()).collect();
        self
    }

    /// Add interface headers.
    pub fn with_interface_headers(
        mut self,
        headers: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.interface_headers = headers.into_iter().map(|h| h.into()).collect();
        self
    }

    /// Validate declaration-level invariants.
    ///
    /// Virtual kinds carry no compiled sources; everything else is
    /// checked later against the kind's linkage rules during dispatch.
    pub fn validate(&self) -> Result<()> {
        if self.kind.is_virtual() && !self.sources.is_empty() {
            bail!(
                "project `{}` of kind `{}` may not declare sources\n\
                 hint: move compiled sources into a `static_library` project",
                self.name,
                self.kind
            );
        }
        Ok(())
    }
}
