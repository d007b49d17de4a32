//! Run only the interface code-generation pipeline.
//!
//! Project dispatch still happens - the collector needs materialized
//! targets for the extractor search paths - but nothing is exported and
//! no graph description is emitted.

use anyhow::Result;

use crate::codegen::pipeline::GenerateReport;
use crate::core::package::PackageRegistry;
use crate::graph::BuildGraph;
use crate::ops::configure::{
    build_oracles, describe_projects, load_workspace, ConfigureOptions,
};

/// Run the pipeline for every declared interface header.
pub fn generate(opts: &ConfigureOptions) -> Result<GenerateReport> {
    let (manifest, ctx) = load_workspace(opts)?;
    let oracles = build_oracles(&ctx, &opts.install_roots);

    let mut graph = BuildGraph::new();
    let mut registry = PackageRegistry::new();
    describe_projects(&manifest, &ctx, &oracles, &mut graph, &mut registry)?;

    super::configure::run_codegen(&manifest, &ctx, &oracles, &mut graph, opts.eager)
}
