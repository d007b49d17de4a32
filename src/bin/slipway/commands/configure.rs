//! `slipway configure` - the full configure pass.

use anyhow::{bail, Result};

use crate::cli::ConfigureArgs;

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let summary = slipway::ops::configure(&args.into_options())?;

    eprintln!(
        "  Configured {} project(s) of package `{}`",
        summary.project_count, summary.package_name
    );
    eprintln!(
        "   Generated {} artifact(s): {} extracted, {} rendered, {} fresh",
        summary.artifact_count, summary.extracted, summary.rendered, summary.fresh
    );
    eprintln!("    Exported {}", summary.export_path.display());
    eprintln!("       Graph {}", summary.graph_path.display());

    if !summary.failures.is_empty() {
        for failure in &summary.failures {
            eprintln!("error: {:#}", failure);
        }
        bail!(
            "{} header(s) failed extraction; their artifacts were withheld",
            summary.failures.len()
        );
    }

    Ok(())
}
