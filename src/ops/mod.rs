//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod clean;
pub mod configure;
pub mod generate;
pub mod scripts;

pub use clean::clean;
pub use configure::{configure, ConfigureOptions, ConfigureSummary};
pub use generate::generate;
pub use scripts::{build_scripts, ScriptSummary};
