//! Interface headers and generated artifacts.
//!
//! An InterfaceHeader is a C++ header designated as a cross-runtime
//! contract surface. Each header produces a chain of GeneratedArtifact
//! nodes: AST extraction, interface-document simplification, then an
//! independent fan-out of rendered outputs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A C++ header subject to metadata extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceHeader {
    /// Header file path
    pub source_path: PathBuf,

    /// Logical package name, propagated from the owning project
    pub package_name: String,

    /// Namespace filter for extraction (e.g. `Engine::Interface::Sample`)
    pub root_namespace: String,
}

impl InterfaceHeader {
    pub fn new(
        source_path: impl Into<PathBuf>,
        package_name: impl Into<String>,
        root_namespace: impl Into<String>,
    ) -> Self {
        InterfaceHeader {
            source_path: source_path.into(),
            package_name: package_name.into(),
            root_namespace: root_namespace.into(),
        }
    }

    /// File stem used to name every downstream artifact.
    pub fn stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Target language of a foreign wrapper artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperLang {
    /// Native C++ side of the script boundary
    Cxx,
    /// Managed-runtime (C#) wrapper
    CSharp,
    /// Systems-language (Rust) wrapper
    Rust,
}

impl WrapperLang {
    /// Artifact file suffix for this language.
    pub fn suffix(&self) -> &'static str {
        match self {
            WrapperLang::Cxx => "wasm.h",
            WrapperLang::CSharp => "wasm.cs",
            WrapperLang::Rust => "wasm.rs",
        }
    }

    /// Template file name for this language's render.
    pub fn template(&self) -> &'static str {
        match self {
            WrapperLang::Cxx => "wasm.h.tera",
            WrapperLang::CSharp => "wasm.cs.tera",
            WrapperLang::Rust => "wasm.rs.tera",
        }
    }
}

/// Pipeline stage that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// External front-end AST dump plus post-processing
    AstExtraction,
    /// Stable-shape interface document derived from the AST document
    InterfaceJson,
    /// Native reflection header
    NativeHeader,
    /// Wire-schema description
    WireSchema,
    /// Per-language wrapper source
    ForeignWrapper { lang: WrapperLang },
}

impl Stage {
    /// Whether this stage is one of the independent fan-out renders.
    pub fn is_fanout(&self) -> bool {
        matches!(
            self,
            Stage::NativeHeader | Stage::WireSchema | Stage::ForeignWrapper { .. }
        )
    }
}

/// One node of the generated-file DAG.
///
/// Regenerated if and only if any declared input has a newer modification
/// time than the artifact itself; always written atomically so a partial
/// output never masquerades as fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Output path, unique repository-wide
    pub output_path: PathBuf,

    /// Producing stage
    pub stage: Stage,

    /// Declared inputs: the upstream document/header plus the template
    /// the artifact was rendered from, if any
    pub inputs: Vec<PathBuf>,
}

impl GeneratedArtifact {
    pub fn new(
        output_path: impl Into<PathBuf>,
        stage: Stage,
        inputs: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        GeneratedArtifact {
            output_path: output_path.into(),
            stage,
            inputs: inputs.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_stem() {
        let header = InterfaceHeader::new("include/sample/i_sample.h", "engine:sample", "Ns");
        assert_eq!(header.stem(), "i_sample");
    }

    #[test]
    fn test_wrapper_suffixes() {
        assert_eq!(WrapperLang::Cxx.suffix(), "wasm.h");
        assert_eq!(WrapperLang::CSharp.suffix(), "wasm.cs");
        assert_eq!(WrapperLang::Rust.suffix(), "wasm.rs");
    }

    #[test]
    fn test_fanout_classification() {
        assert!(!Stage::AstExtraction.is_fanout());
        assert!(!Stage::InterfaceJson.is_fanout());
        assert!(Stage::WireSchema.is_fanout());
        assert!(Stage::ForeignWrapper {
            lang: WrapperLang::Rust
        }
        .is_fanout());
    }
}
