//! `slipway scripts` - build declared script projects.

use anyhow::{bail, Result};

use crate::cli::ConfigureArgs;

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let summary = slipway::ops::build_scripts(&args.into_options())?;

    for module in &summary.modules {
        eprintln!("   Installed {}", module.display());
    }

    if !summary.failures.is_empty() {
        for (manifest, error) in &summary.failures {
            eprintln!("error: {}: {}", manifest.display(), error);
        }
        bail!("{} script(s) failed to build", summary.failures.len());
    }

    Ok(())
}
