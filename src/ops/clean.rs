//! Remove build outputs.

use anyhow::Result;

use crate::ops::configure::{load_workspace, ConfigureOptions};
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the entire output root.
pub fn clean(opts: &ConfigureOptions) -> Result<()> {
    let (_, ctx) = load_workspace(opts)?;

    tracing::info!("removing {}", ctx.output_root.display());
    remove_dir_all_if_exists(&ctx.output_root)
}
