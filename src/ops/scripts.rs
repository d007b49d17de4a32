//! Build every declared script project.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::script::{ScriptLanguage, ScriptProject};
use crate::ops::configure::{load_workspace, ConfigureOptions};
use crate::scripts::ScriptBuilder;

/// Outcome of one scripts run.
#[derive(Debug, Default)]
pub struct ScriptSummary {
    /// Installed module paths
    pub modules: Vec<PathBuf>,

    /// Scripts that failed, with their error text
    pub failures: Vec<(PathBuf, String)>,
}

/// Build all script projects declared in the manifest.
///
/// Failures are per-script: one broken manifest or toolchain run does
/// not stop the remaining scripts.
pub fn build_scripts(opts: &ConfigureOptions) -> Result<ScriptSummary> {
    let (manifest, ctx) = load_workspace(opts)?;

    if manifest.scripts.is_empty() {
        bail!(
            "no [[script]] entries declared in the manifest of `{}`",
            ctx.package_name
        );
    }

    let builder = ScriptBuilder::new(&ctx.workspace_root, ctx.scripts_dir());
    let mut summary = ScriptSummary::default();

    for entry in &manifest.scripts {
        let manifest_path = ctx.workspace_path(&entry.manifest);

        let Some(language) = ScriptLanguage::from_manifest(&manifest_path) else {
            summary.failures.push((
                manifest_path.clone(),
                "unrecognized script manifest kind".to_string(),
            ));
            continue;
        };

        let profile = entry
            .profile
            .clone()
            .unwrap_or_else(|| ctx.build_type.clone());
        let script = ScriptProject::new(manifest_path.clone(), language, profile);

        match builder.build_script(&script) {
            Ok(module) => summary.modules.push(module),
            Err(e) => summary.failures.push((manifest_path, format!("{:#}", e))),
        }
    }

    Ok(summary)
}
