//! Project-description-to-build-graph compilation.
//!
//! This module turns declared projects into graph nodes: conditional
//! path normalization, transitive include collection, and kind dispatch.

pub mod context;
pub mod dispatch;
pub mod genex;
pub mod includes;

pub use context::ConfigureContext;
pub use dispatch::ProjectDispatcher;
pub use genex::{normalize, ConditionalPath};
pub use includes::IncludeCollector;
