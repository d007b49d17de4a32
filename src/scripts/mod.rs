//! Foreign-runtime script building.
//!
//! Script projects compile to portable bytecode modules through their
//! own toolchains. The strategy is keyed by the manifest kind; each one
//! extracts the few fields it needs, derives the toolchain's own output
//! location, runs the toolchain, and the produced module is copied into
//! the unified script output directory preserving the script's
//! source-relative directory structure.

pub mod cargo;
pub mod dotnet;
pub mod native;
pub mod probe;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::script::{ScriptLanguage, ScriptProject};
use crate::util::fs::{ensure_dir, relative_path};

/// Builds declared script projects into the unified output directory.
pub struct ScriptBuilder {
    /// Workspace root, for source-relative layout preservation
    workspace_root: PathBuf,

    /// Unified script output directory
    output_dir: PathBuf,
}

impl ScriptBuilder {
    pub fn new(workspace_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ScriptBuilder {
            workspace_root: workspace_root.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Build one script project and install its module.
    ///
    /// A missing required manifest field or a failing toolchain is fatal
    /// for this script only; the caller decides whether siblings keep
    /// building.
    pub fn build_script(&self, script: &ScriptProject) -> Result<PathBuf> {
        let manifest = &script.manifest_path;
        if !manifest.is_file() {
            bail!("script manifest not found: {}", manifest.display());
        }

        tracing::info!(
            "building {} script from {}",
            script.language,
            manifest.display()
        );

        let module = match script.language {
            ScriptLanguage::Systems => cargo::build(manifest, &script.build_profile)?,
            ScriptLanguage::Managed => dotnet::build(manifest, &script.build_profile)?,
            ScriptLanguage::NativeBuild => native::build(manifest, &script.build_profile)?,
        };

        if !module.is_file() {
            bail!(
                "toolchain reported success but produced no module at {}",
                module.display()
            );
        }

        self.install_module(manifest, &module)
    }

    /// Copy a produced module into the unified output directory,
    /// mirroring the script's directory structure under the workspace.
    pub fn install_module(&self, manifest: &Path, module: &Path) -> Result<PathBuf> {
        let manifest_dir = manifest.parent().unwrap_or(Path::new("."));
        let relative = relative_path(&self.workspace_root, manifest_dir);

        let file_name = module
            .file_name()
            .with_context(|| format!("module path has no file name: {}", module.display()))?;
        let destination = self.output_dir.join(relative).join(file_name);

        if let Some(parent) = destination.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(module, &destination).with_context(|| {
            format!(
                "failed to copy module {} to {}",
                module.display(),
                destination.display()
            )
        })?;

        tracing::info!("installed script module at {}", destination.display());
        Ok(destination)
    }
}
