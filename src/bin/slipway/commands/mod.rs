//! Command implementations.

pub mod clean;
pub mod completions;
pub mod configure;
pub mod generate;
pub mod scripts;
