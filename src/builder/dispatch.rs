//! Project kind dispatch.
//!
//! Maps each declared project kind to its node type and linkage rules,
//! creates the node, attaches sources and include directories, links
//! declared dependencies, and registers the target under the enclosing
//! package.

use anyhow::{Context, Result};

use crate::builder::context::ConfigureContext;
use crate::core::package::PackageRegistry;
use crate::core::project::{DependencyKeyword, ProjectDescriptor, ProjectKind};
use crate::core::target_ref::TargetRef;
use crate::graph::{BuildGraph, IncludeDir, NodeId, NodeKind, TargetNode};
use crate::oracle::OracleSet;
use crate::util::diagnostic::{DependencyResolutionError, LinkageRuleViolation};
use crate::util::fs::glob_files;

/// Kind-specific creation strategy, resolved once per project.
#[derive(Debug, Clone, Copy)]
pub struct KindStrategy {
    /// Node type the kind materializes as
    pub node_kind: NodeKind,

    /// Dependency keywords the kind accepts
    pub allowed: &'static [DependencyKeyword],
}

impl KindStrategy {
    /// Resolve the strategy for a project kind.
    pub fn for_kind(kind: ProjectKind) -> KindStrategy {
        use DependencyKeyword::{Interface, Private, Public};

        match kind {
            ProjectKind::Base | ProjectKind::StaticLibrary => KindStrategy {
                node_kind: NodeKind::StaticArchive,
                allowed: &[Public, Private],
            },
            ProjectKind::SharedLibrary | ProjectKind::InterfaceLinker | ProjectKind::Plugin => {
                KindStrategy {
                    node_kind: NodeKind::DynamicLibrary,
                    allowed: &[Public, Private],
                }
            }
            ProjectKind::HeaderOnly | ProjectKind::Interface => KindStrategy {
                node_kind: NodeKind::HeaderOnly,
                allowed: &[Interface],
            },
            ProjectKind::Module => KindStrategy {
                node_kind: NodeKind::LoadableModule,
                allowed: &[Private],
            },
            ProjectKind::Tool | ProjectKind::Test | ProjectKind::Bootstrap => KindStrategy {
                node_kind: NodeKind::Executable,
                allowed: &[Private],
            },
        }
    }

    /// Check a declared keyword against the rules.
    fn check(&self, project: &ProjectDescriptor, keyword: DependencyKeyword) -> Result<()> {
        if self.allowed.contains(&keyword) {
            return Ok(());
        }

        let correct = self
            .allowed
            .iter()
            .map(|k| format!("`{}`", k))
            .collect::<Vec<_>>()
            .join(" or ");

        Err(LinkageRuleViolation {
            project: project.name.clone(),
            kind: project.kind.to_string(),
            keyword: keyword.to_string(),
            correction: format!(
                "declare the dependency with {} for `{}` projects",
                correct, project.kind
            ),
        }
        .into())
    }
}

/// Creates build nodes from project descriptors.
pub struct ProjectDispatcher<'a> {
    ctx: &'a ConfigureContext,
    oracles: &'a OracleSet,
}

impl<'a> ProjectDispatcher<'a> {
    pub fn new(ctx: &'a ConfigureContext, oracles: &'a OracleSet) -> Self {
        ProjectDispatcher { ctx, oracles }
    }

    /// Create the build node for one project.
    ///
    /// Side effect: the new node is registered under the enclosing
    /// package in `registry`.
    pub fn create_project(
        &self,
        project: &ProjectDescriptor,
        graph: &mut BuildGraph,
        registry: &mut PackageRegistry,
    ) -> Result<NodeId> {
        project.validate()?;

        let strategy = KindStrategy::for_kind(project.kind);
        for (keyword, _) in project.dependencies.iter() {
            strategy.check(project, keyword)?;
        }

        let sources = glob_files(&self.ctx.workspace_root, &project.sources)
            .with_context(|| format!("failed to expand sources of `{}`", project.name))?;

        // Raw entries keep their phase wrappers; install staging needs
        // the build/install distinction later.
        let mut include_dirs: Vec<IncludeDir> = project
            .public_include_dirs
            .iter()
            .map(|d| IncludeDir {
                entry: d.clone(),
                visibility: DependencyKeyword::Public,
            })
            .collect();
        include_dirs.extend(project.private_include_dirs.iter().map(|d| IncludeDir {
            entry: d.clone(),
            visibility: DependencyKeyword::Private,
        }));

        let mut node = TargetNode {
            name: project.name.clone(),
            kind: strategy.node_kind,
            sources,
            include_dirs,
            deps: Vec::new(),
            link_names: Vec::new(),
            lib_dirs: Vec::new(),
        };

        // External packages resolve through the oracle up front; a
        // missing package would otherwise only surface deep inside the
        // generation pipeline.
        for package in &project.external_packages {
            let resolution = self
                .oracles
                .resolve(package, &self.ctx.host_preset, &self.ctx.build_type)?
                .ok_or_else(|| DependencyResolutionError::new(package, &project.name))?;

            node.link_names.extend(resolution.link_names);
            node.lib_dirs.extend(resolution.lib_dirs);
            for dir in resolution.include_dirs {
                node.include_dirs.push(IncludeDir {
                    entry: dir.display().to_string(),
                    visibility: DependencyKeyword::Public,
                });
            }
            registry.record_external(&self.ctx.package_name, package);
        }

        let id = graph.add_target(node)?;

        for (keyword, dep_name) in project.dependencies.iter() {
            let target = match graph.find_target(dep_name) {
                Some(dep_id) => TargetRef::materialized(dep_id, dep_name),
                None => TargetRef::named(dep_name),
            };
            graph.link(id, target, keyword);
        }

        registry.register(
            &self.ctx.package_name,
            TargetRef::materialized(id, &project.name),
        )?;

        tracing::debug!(
            "created {:?} node `{}` under package `{}`",
            strategy.node_kind,
            project.name,
            self.ctx.package_name
        );

        Ok(id)
    }
}
