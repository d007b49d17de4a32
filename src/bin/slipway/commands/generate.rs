//! `slipway generate` - codegen pipeline only.

use anyhow::{bail, Result};

use crate::cli::ConfigureArgs;

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let report = slipway::ops::generate(&args.into_options())?;

    eprintln!(
        "   Generated {} artifact(s): {} extracted, {} rendered, {} fresh",
        report.artifacts.len(),
        report.extracted,
        report.rendered,
        report.fresh
    );

    if !report.failures.is_empty() {
        for failure in &report.failures {
            eprintln!("error: {:#}", failure);
        }
        bail!(
            "{} header(s) failed extraction; their artifacts were withheld",
            report.failures.len()
        );
    }

    Ok(())
}
