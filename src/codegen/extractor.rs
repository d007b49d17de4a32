//! External front-end invocation for AST extraction.
//!
//! One extraction runs the C++ front-end in analysis-only mode against a
//! single header, filtered to the root namespace, and post-processes the
//! dump into the extraction document. The front-end is the most
//! expensive step of the pipeline; callers gate it behind the staleness
//! check.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::codegen::astjson;
use crate::core::interface::InterfaceHeader;
use crate::util::diagnostic::{ConfigurationError, ExtractionError};
use crate::util::fs::{atomic_write, read_to_string};
use crate::util::process::{find_clang, ProcessBuilder};

/// Produces the extraction document for one header.
pub trait Extract: Send + Sync {
    fn extract(
        &self,
        header: &InterfaceHeader,
        include_dirs: &[PathBuf],
        include_files: &[PathBuf],
        output: &Path,
    ) -> Result<()>;
}

/// Extractor backed by a clang front-end.
pub struct ClangExtractor {
    clang: PathBuf,
}

impl ClangExtractor {
    /// Use a specific front-end executable.
    pub fn new(clang: impl Into<PathBuf>) -> Self {
        ClangExtractor {
            clang: clang.into(),
        }
    }

    /// Locate the front-end, failing with an environment error if none
    /// is available.
    pub fn detect() -> Result<Self> {
        let clang = find_clang().ok_or_else(|| ConfigurationError::ToolMissing {
            tool: "clang++".to_string(),
        })?;
        tracing::debug!("using front-end at {}", clang.display());
        Ok(ClangExtractor { clang })
    }
}

impl Extract for ClangExtractor {
    fn extract(
        &self,
        header: &InterfaceHeader,
        include_dirs: &[PathBuf],
        include_files: &[PathBuf],
        output: &Path,
    ) -> Result<()> {
        let mut pb = ProcessBuilder::new(&self.clang).args([
            "-x",
            "c++-header",
            "-std=c++20",
            "-w",
            "-Wno-error",
            "-fsyntax-only",
            "-Xclang",
            "-ast-dump=json",
            "-Xclang",
            "-detailed-preprocessing-record",
            "-Xclang",
        ]);
        pb = pb.arg(format!("-ast-dump-filter={}", header.root_namespace));

        for dir in include_dirs {
            pb = pb.arg("-I").arg(dir);
        }
        for file in include_files {
            pb = pb.arg("-include").arg(file);
        }
        pb = pb.arg(&header.source_path);

        tracing::debug!(
            "extracting {} with {} include dir(s)",
            header.source_path.display(),
            include_dirs.len()
        );

        let result = pb.exec()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ExtractionError::new(
                header.source_path.clone(),
                format!(
                    "front-end exited with {:?}\n{}",
                    result.status.code(),
                    stderr.trim()
                ),
            )
            .into());
        }

        let stdout = String::from_utf8_lossy(&result.stdout);
        let documents = astjson::parse_concatenated(&stdout)
            .map_err(|e| ExtractionError::new(header.source_path.clone(), e.to_string()))?;
        let merged = astjson::merge_documents(documents);

        let header_content = read_to_string(&header.source_path)?;
        let document = astjson::post_process(
            merged,
            &header_content,
            &header.source_path,
            &header.package_name,
            &header.root_namespace,
        );

        let json = serde_json::to_string_pretty(&document)?;
        atomic_write(output, json.as_bytes())
    }
}
