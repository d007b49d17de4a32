//! Per-header generation chains with staleness short-circuiting.
//!
//! Each header owns a strictly ordered chain - extraction, interface
//! document, fan-out renders - expressed as explicit input/output edges.
//! Chains of different headers are independent: one header's parse
//! failure withholds that header's artifacts without touching siblings.
//! An artifact is regenerated if and only if one of its declared inputs
//! is newer than the artifact itself, so an unchanged workspace re-runs
//! neither the front-end nor the renderer.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::Value;

use crate::builder::context::ConfigureContext;
use crate::codegen::extractor::Extract;
use crate::codegen::render::Renderer;
use crate::core::interface::{GeneratedArtifact, InterfaceHeader, Stage, WrapperLang};
use crate::core::manifest::CodegenConfig;
use crate::graph::{BuildGraph, CustomNode};
use crate::util::diagnostic::{ConfigurationError, ExtractionError};
use crate::util::fs::{atomic_write, mtime};

/// Where each stage's artifacts land. `staging` is always present; every
/// other folder is optional and gates its artifact.
#[derive(Debug, Clone)]
pub struct OutputFolderSet {
    pub staging: PathBuf,
    pub interface_json: Option<PathBuf>,
    pub native_header: Option<PathBuf>,
    pub wire_schema: Option<PathBuf>,
    pub wrapper_cxx: Option<PathBuf>,
    pub wrapper_csharp: Option<PathBuf>,
    pub wrapper_rust: Option<PathBuf>,
}

impl OutputFolderSet {
    /// Derive the folder set from the configure context and manifest.
    pub fn from_config(ctx: &ConfigureContext, cfg: &CodegenConfig) -> Self {
        let on = |enabled: bool, part: &str| enabled.then(|| ctx.codegen_dir(part));

        OutputFolderSet {
            staging: ctx.staging_dir(),
            interface_json: on(cfg.interface_json, "interface"),
            native_header: on(cfg.native_header, "include"),
            wire_schema: on(cfg.wire_schema, "wit"),
            wrapper_cxx: on(cfg.wrapper_cxx, "wrappers/cxx"),
            wrapper_csharp: on(cfg.wrapper_csharp, "wrappers/csharp"),
            wrapper_rust: on(cfg.wrapper_rust, "wrappers/rust"),
        }
    }

    fn template_names(&self) -> Vec<&'static str> {
        let mut names = vec![INTERFACE_TEMPLATE];
        if self.native_header.is_some() {
            names.push(NATIVE_HEADER_TEMPLATE);
        }
        if self.wire_schema.is_some() {
            names.push(WIRE_SCHEMA_TEMPLATE);
        }
        if self.wrapper_cxx.is_some() {
            names.push(WrapperLang::Cxx.template());
        }
        if self.wrapper_csharp.is_some() {
            names.push(WrapperLang::CSharp.template());
        }
        if self.wrapper_rust.is_some() {
            names.push(WrapperLang::Rust.template());
        }
        names
    }
}

const INTERFACE_TEMPLATE: &str = "interface.json.tera";
const NATIVE_HEADER_TEMPLATE: &str = "interface_info.h.tera";
const WIRE_SCHEMA_TEMPLATE: &str = "interface.wit.tera";

/// How per-header failures propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Abort the pipeline on the first failing header.
    Eager,

    /// Collect failures, keep sibling chains alive, report at the end.
    #[default]
    Aggregate,
}

/// Result of one pipeline run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Every artifact described by the processed chains
    pub artifacts: Vec<GeneratedArtifact>,

    /// Headers whose chains were withheld
    pub failures: Vec<ExtractionError>,

    /// Front-end invocations actually performed
    pub extracted: usize,

    /// Template renders actually performed
    pub rendered: usize,

    /// Artifacts skipped because they were fresh
    pub fresh: usize,
}

/// One planned chain: the artifacts of a single header in stage order.
struct HeaderChain {
    header: InterfaceHeader,
    ast: GeneratedArtifact,
    interface_doc: GeneratedArtifact,
    interface_reported: bool,
    fanouts: Vec<(GeneratedArtifact, &'static str)>,
}

/// The interface code-generation pipeline.
pub struct Pipeline<'a> {
    extractor: &'a dyn Extract,
    renderer: Renderer,
    folders: OutputFolderSet,
    failure_mode: FailureMode,
    include_files: Vec<PathBuf>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline, loading every template the configured folders
    /// need. Template and tool absence surface here, before any header
    /// is touched.
    pub fn new(
        extractor: &'a dyn Extract,
        template_dir: &Path,
        folders: OutputFolderSet,
        failure_mode: FailureMode,
        include_files: Vec<PathBuf>,
    ) -> Result<Self> {
        let renderer = Renderer::load(template_dir, &folders.template_names())?;

        Ok(Pipeline {
            extractor,
            renderer,
            folders,
            failure_mode,
            include_files,
        })
    }

    /// Describe one header's chain without executing it.
    fn plan(&self, header: &InterfaceHeader) -> HeaderChain {
        let stem = header.stem();

        let ast_path = self.folders.staging.join(format!("{}.ast.json", stem));
        let ast = GeneratedArtifact::new(
            ast_path.clone(),
            Stage::AstExtraction,
            [header.source_path.clone()],
        );

        let interface_dir = self
            .folders
            .interface_json
            .as_ref()
            .unwrap_or(&self.folders.staging);
        let interface_path = interface_dir.join(format!("{}.interface.json", stem));
        let interface_doc = GeneratedArtifact::new(
            interface_path.clone(),
            Stage::InterfaceJson,
            [
                ast_path.clone(),
                self.renderer.template_path(INTERFACE_TEMPLATE),
            ],
        );

        let specs: [(Option<&PathBuf>, &str, Stage, &'static str); 5] = [
            (
                self.folders.native_header.as_ref(),
                "interface_info.h",
                Stage::NativeHeader,
                NATIVE_HEADER_TEMPLATE,
            ),
            (
                self.folders.wire_schema.as_ref(),
                "interface.wit",
                Stage::WireSchema,
                WIRE_SCHEMA_TEMPLATE,
            ),
            (
                self.folders.wrapper_cxx.as_ref(),
                WrapperLang::Cxx.suffix(),
                Stage::ForeignWrapper {
                    lang: WrapperLang::Cxx,
                },
                WrapperLang::Cxx.template(),
            ),
            (
                self.folders.wrapper_csharp.as_ref(),
                WrapperLang::CSharp.suffix(),
                Stage::ForeignWrapper {
                    lang: WrapperLang::CSharp,
                },
                WrapperLang::CSharp.template(),
            ),
            (
                self.folders.wrapper_rust.as_ref(),
                WrapperLang::Rust.suffix(),
                Stage::ForeignWrapper {
                    lang: WrapperLang::Rust,
                },
                WrapperLang::Rust.template(),
            ),
        ];

        let mut fanouts = Vec::new();
        for (dir, suffix, stage, template) in specs {
            if let Some(dir) = dir {
                fanouts.push((
                    GeneratedArtifact::new(
                        dir.join(format!("{}.{}", stem, suffix)),
                        stage,
                        [
                            interface_path.clone(),
                            self.renderer.template_path(template),
                        ],
                    ),
                    template,
                ));
            }
        }

        HeaderChain {
            header: header.clone(),
            ast,
            interface_doc,
            interface_reported: self.folders.interface_json.is_some(),
            fanouts,
        }
    }

    /// Register every chain's artifacts as custom graph nodes.
    ///
    /// Stage order is carried by the input/output edges; the duplicate-
    /// output guard enforces repository-wide unique artifact paths.
    pub fn register(
        &self,
        headers: &[InterfaceHeader],
        graph: &mut BuildGraph,
    ) -> Result<Vec<GeneratedArtifact>> {
        let mut artifacts = Vec::new();

        for header in headers {
            let chain = self.plan(header);
            let stem = chain.header.stem();

            graph.add_custom(CustomNode {
                label: format!("extract:{}", stem),
                outputs: vec![chain.ast.output_path.clone()],
                inputs: chain.ast.inputs.clone(),
                command: None,
            })?;
            graph.add_custom(CustomNode {
                label: format!("interface:{}", stem),
                outputs: vec![chain.interface_doc.output_path.clone()],
                inputs: chain.interface_doc.inputs.clone(),
                command: None,
            })?;
            for (artifact, template) in &chain.fanouts {
                graph.add_custom(CustomNode {
                    label: format!("render:{}:{}", stem, template),
                    outputs: vec![artifact.output_path.clone()],
                    inputs: artifact.inputs.clone(),
                    command: None,
                })?;
            }

            artifacts.extend(self.chain_artifacts(chain));
        }

        Ok(artifacts)
    }

    fn chain_artifacts(&self, chain: HeaderChain) -> Vec<GeneratedArtifact> {
        let mut artifacts = vec![chain.ast];
        if chain.interface_reported {
            artifacts.push(chain.interface_doc);
        }
        artifacts.extend(chain.fanouts.into_iter().map(|(a, _)| a));
        artifacts
    }

    /// Run the pipeline over a set of headers.
    ///
    /// `include_dirs` is the extractor search path per header, already
    /// collected and normalized. Chains run in parallel under the
    /// aggregate failure mode; eager mode keeps the source design's
    /// abort-on-first-failure and therefore runs sequentially.
    pub fn generate(
        &self,
        headers: &[(InterfaceHeader, Vec<PathBuf>)],
    ) -> Result<GenerateReport> {
        for (header, _) in headers {
            if header.package_name.trim().is_empty() {
                return Err(ConfigurationError::missing("package-name").into());
            }
            if header.root_namespace.trim().is_empty() {
                return Err(ConfigurationError::missing("root-namespace").into());
            }
        }

        let progress = if headers.len() > 1 {
            let pb = ProgressBar::new(headers.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let outcomes: Vec<Result<ChainOutcome>> = match self.failure_mode {
            FailureMode::Eager => {
                let mut results = Vec::new();
                for (header, include_dirs) in headers {
                    let outcome = self.run_chain(header, include_dirs);
                    if let Some(ref pb) = progress {
                        pb.inc(1);
                    }
                    let failed = outcome.is_err();
                    results.push(outcome);
                    if failed {
                        break;
                    }
                }
                results
            }
            FailureMode::Aggregate => headers
                .par_iter()
                .map(|(header, include_dirs)| {
                    let outcome = self.run_chain(header, include_dirs);
                    if let Some(ref pb) = progress {
                        pb.inc(1);
                    }
                    outcome
                })
                .collect(),
        };

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        let mut report = GenerateReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(chain) => {
                    report.artifacts.extend(chain.artifacts);
                    report.extracted += chain.extracted;
                    report.rendered += chain.rendered;
                    report.fresh += chain.fresh;
                }
                Err(err) => {
                    if self.failure_mode == FailureMode::Eager {
                        return Err(err);
                    }
                    let extraction = match err.downcast::<ExtractionError>() {
                        Ok(e) => e,
                        Err(other) => {
                            ExtractionError::new(PathBuf::new(), format!("{:#}", other))
                        }
                    };
                    report.failures.push(extraction);
                }
            }
        }

        Ok(report)
    }

    fn run_chain(
        &self,
        header: &InterfaceHeader,
        include_dirs: &[PathBuf],
    ) -> Result<ChainOutcome> {
        let chain = self.plan(header);
        let mut outcome = ChainOutcome::default();

        if is_stale(&chain.ast.output_path, &chain.ast.inputs) {
            self.extractor.extract(
                header,
                include_dirs,
                &self.include_files,
                &chain.ast.output_path,
            )?;
            outcome.extracted += 1;
        } else {
            tracing::debug!("{} is fresh", chain.ast.output_path.display());
            outcome.fresh += 1;
        }

        if is_stale(&chain.interface_doc.output_path, &chain.interface_doc.inputs) {
            let ast_doc = load_document(&chain.ast.output_path, header)?;
            let rendered = self
                .renderer
                .render(INTERFACE_TEMPLATE, &ast_doc)
                .map_err(|e| {
                    ExtractionError::new(header.source_path.clone(), format!("{:#}", e))
                })?;
            atomic_write(&chain.interface_doc.output_path, rendered.as_bytes())?;
            outcome.rendered += 1;
        } else {
            outcome.fresh += 1;
        }

        // Fan-out renders are independent and order-insensitive.
        let stale_fanouts: Vec<&(GeneratedArtifact, &'static str)> = chain
            .fanouts
            .iter()
            .filter(|(artifact, _)| is_stale(&artifact.output_path, &artifact.inputs))
            .collect();
        outcome.fresh += chain.fanouts.len() - stale_fanouts.len();

        if !stale_fanouts.is_empty() {
            let interface_doc = load_document(&chain.interface_doc.output_path, header)?;
            for (artifact, template) in stale_fanouts {
                let rendered = self.renderer.render(template, &interface_doc).map_err(|e| {
                    ExtractionError::new(header.source_path.clone(), format!("{:#}", e))
                })?;
                atomic_write(&artifact.output_path, rendered.as_bytes())?;
                outcome.rendered += 1;
            }
        }

        outcome.artifacts = self.chain_artifacts(chain);
        Ok(outcome)
    }
}

#[derive(Default)]
struct ChainOutcome {
    artifacts: Vec<GeneratedArtifact>,
    extracted: usize,
    rendered: usize,
    fresh: usize,
}

/// Staleness check: regenerate when the artifact is missing or any
/// declared input is newer than it.
pub fn is_stale(output: &Path, inputs: &[PathBuf]) -> bool {
    let Some(output_time) = mtime(output) else {
        return true;
    };

    inputs.iter().any(|input| match mtime(input) {
        Some(input_time) => input_time > output_time,
        None => true,
    })
}

fn load_document(path: &Path, header: &InterfaceHeader) -> Result<Value> {
    let content = crate::util::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ExtractionError::new(
            header.source_path.clone(),
            format!("corrupt document {}: {}", path.display(), e),
        )
        .into()
    })
}
