//! The configure pass: manifest to build graph, artifacts and exports.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::context::ConfigureContext;
use crate::builder::dispatch::ProjectDispatcher;
use crate::builder::genex;
use crate::builder::includes::IncludeCollector;
use crate::codegen::extractor::ClangExtractor;
use crate::codegen::pipeline::{FailureMode, GenerateReport, OutputFolderSet, Pipeline};
use crate::core::interface::InterfaceHeader;
use crate::core::manifest::{find_manifest, WorkspaceManifest};
use crate::core::package::PackageRegistry;
use crate::core::target_ref::TargetRef;
use crate::export;
use crate::graph::BuildGraph;
use crate::oracle::{DirectoryOracle, OracleSet};
use crate::util::diagnostic::ExtractionError;

/// Inputs of one configure invocation.
#[derive(Debug, Default)]
pub struct ConfigureOptions {
    pub manifest_path: Option<PathBuf>,
    pub host_preset: Option<String>,
    pub build_type: Option<String>,
    pub output_root: Option<PathBuf>,
    pub active_config: Option<String>,

    /// Additional install roots consulted by the package oracle
    pub install_roots: Vec<PathBuf>,

    /// Abort on the first failing header instead of aggregating
    pub eager: bool,
}

/// What one configure pass produced.
#[derive(Debug)]
pub struct ConfigureSummary {
    pub package_name: String,
    pub project_count: usize,
    pub artifact_count: usize,
    pub extracted: usize,
    pub rendered: usize,
    pub fresh: usize,
    pub failures: Vec<ExtractionError>,
    pub export_path: PathBuf,
    pub graph_path: PathBuf,
}

/// Load the manifest and build the validated context.
pub fn load_workspace(
    opts: &ConfigureOptions,
) -> Result<(WorkspaceManifest, ConfigureContext)> {
    let manifest_path = match &opts.manifest_path {
        Some(path) => path.clone(),
        None => find_manifest(&std::env::current_dir()?)?,
    };

    let manifest = WorkspaceManifest::load(&manifest_path)?;
    let ctx = ConfigureContext::new(
        &manifest,
        opts.host_preset.clone(),
        opts.build_type.clone(),
        opts.output_root.clone(),
        opts.active_config.clone(),
    )?;

    Ok((manifest, ctx))
}

/// Oracle set over the invocation's own install root plus extra roots.
pub fn build_oracles(ctx: &ConfigureContext, extra_roots: &[PathBuf]) -> OracleSet {
    let mut oracles = OracleSet::new();
    oracles.add(Box::new(DirectoryOracle::new(ctx.install_root())));
    for root in extra_roots {
        oracles.add(Box::new(DirectoryOracle::new(root.clone())));
    }
    oracles
}

/// Dispatch every declared project into the graph, in declaration order.
pub fn describe_projects(
    manifest: &WorkspaceManifest,
    ctx: &ConfigureContext,
    oracles: &OracleSet,
    graph: &mut BuildGraph,
    registry: &mut PackageRegistry,
) -> Result<()> {
    let dispatcher = ProjectDispatcher::new(ctx, oracles);

    for project in &manifest.projects {
        dispatcher
            .create_project(project, graph, registry)
            .with_context(|| format!("failed to configure project `{}`", project.name))?;
    }

    Ok(())
}

/// Collect headers with their extractor search paths and run the
/// generation pipeline.
pub fn run_codegen(
    manifest: &WorkspaceManifest,
    ctx: &ConfigureContext,
    oracles: &OracleSet,
    graph: &mut BuildGraph,
    eager: bool,
) -> Result<GenerateReport> {
    let mut headers: Vec<(InterfaceHeader, Vec<PathBuf>)> = Vec::new();

    let extra_dirs: Vec<PathBuf> = genex::normalize(
        &manifest.codegen.extra_include_dirs,
        ctx.active_config.as_deref(),
    )
    .into_iter()
    .map(|d| ctx.workspace_path(&d))
    .collect();

    let collector = IncludeCollector::new(
        graph,
        oracles,
        &ctx.host_preset,
        &ctx.build_type,
        ctx.active_config.as_deref(),
    );

    for project in &manifest.projects {
        if project.interface_headers.is_empty() {
            continue;
        }

        let root_namespace = ctx.require_root_namespace()?.to_string();
        let node = graph
            .find_target(&project.name)
            .ok_or_else(|| anyhow::anyhow!("project not dispatched: {}", project.name))?;

        let mut include_dirs =
            collector.collect(&TargetRef::materialized(node, &project.name))?;
        include_dirs = include_dirs
            .iter()
            .map(|d| ctx.workspace_path(d))
            .collect();
        for dir in &extra_dirs {
            if !include_dirs.contains(dir) {
                include_dirs.push(dir.clone());
            }
        }

        for header in &project.interface_headers {
            headers.push((
                InterfaceHeader::new(
                    ctx.workspace_path(header),
                    ctx.package_name.clone(),
                    root_namespace.clone(),
                ),
                include_dirs.clone(),
            ));
        }
    }

    if headers.is_empty() {
        return Ok(GenerateReport::default());
    }

    let extractor = ClangExtractor::detect()?;
    let folders = OutputFolderSet::from_config(ctx, &manifest.codegen);
    let failure_mode = if eager {
        FailureMode::Eager
    } else {
        FailureMode::Aggregate
    };

    let pipeline = Pipeline::new(
        &extractor,
        &ctx.workspace_path(&manifest.codegen.template_dir),
        folders,
        failure_mode,
        manifest
            .codegen
            .include_files
            .iter()
            .map(|f| ctx.workspace_path(f))
            .collect(),
    )?;

    let only_headers: Vec<InterfaceHeader> =
        headers.iter().map(|(h, _)| h.clone()).collect();
    pipeline.register(&only_headers, graph)?;

    pipeline.generate(&headers)
}

/// Run the whole configure pass.
pub fn configure(opts: &ConfigureOptions) -> Result<ConfigureSummary> {
    let (manifest, ctx) = load_workspace(opts)?;
    let oracles = build_oracles(&ctx, &opts.install_roots);

    let mut graph = BuildGraph::new();
    let mut registry = PackageRegistry::new();

    describe_projects(&manifest, &ctx, &oracles, &mut graph, &mut registry)?;

    let report = run_codegen(&manifest, &ctx, &oracles, &mut graph, opts.eager)?;

    // The registry is complete only now; finalize exactly once so the
    // emitted descriptor never reflects a prefix of the member list.
    let descriptor = registry.finalize(
        &ctx.package_name,
        &manifest.package.category,
        &ctx.host_preset,
        &ctx.build_type,
        manifest.package.version.clone(),
    )?;
    let namespace = ctx.root_namespace.clone().unwrap_or_else(|| ctx.package_name.clone());
    let export_path = export::emit_package(&ctx.install_root(), &descriptor, &namespace)?;

    let graph_path = ctx.graph_path();
    graph.emit(&graph_path)?;

    Ok(ConfigureSummary {
        package_name: ctx.package_name.clone(),
        project_count: manifest.projects.len(),
        artifact_count: report.artifacts.len(),
        extracted: report.extracted,
        rendered: report.rendered,
        fresh: report.fresh,
        failures: report.failures,
        export_path,
        graph_path,
    })
}
