//! Interface code-generation pipeline.
//!
//! Each interface header runs through a strictly ordered chain: AST
//! extraction via the external C++ front-end, simplification into a
//! stable-shape interface document, then an independent fan-out of
//! template renders (reflection header, wire schema, per-language
//! wrappers). Chains of different headers are independent.

pub mod astjson;
pub mod extractor;
pub mod names;
pub mod pipeline;
pub mod render;

pub use extractor::{ClangExtractor, Extract};
pub use pipeline::{FailureMode, GenerateReport, OutputFolderSet, Pipeline};
pub use render::Renderer;
