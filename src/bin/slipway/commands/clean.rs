//! `slipway clean` - remove build outputs.

use anyhow::Result;

use crate::cli::ConfigureArgs;

pub fn execute(args: ConfigureArgs) -> Result<()> {
    slipway::ops::clean(&args.into_options())?;
    eprintln!("     Cleaned build outputs");
    Ok(())
}
