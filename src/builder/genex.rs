//! Conditional path normalization.
//!
//! Include directory entries may carry phase wrappers telling the build
//! tool when a path applies: `$<BUILD_INTERFACE:p>` only while building,
//! `$<INSTALL_INTERFACE:p>` only after installation, `$<CONFIG:c:p>`
//! only under configuration `c`. Out-of-band tools (the metadata
//! extractor) understand none of this, so the wrappers are resolved to
//! plain filesystem paths before paths leave the graph description.

use std::path::PathBuf;

/// A parsed include-directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalPath {
    /// Plain filesystem path
    Plain(String),

    /// Applies while building only
    BuildOnly(String),

    /// Applies in the installed layout only
    InstallOnly(String),

    /// Applies under one named configuration only
    ConfigOnly { config: String, inner: String },
}

impl ConditionalPath {
    /// Parse one raw entry. Returns `None` for malformed wrapper syntax.
    pub fn parse(entry: &str) -> Option<ConditionalPath> {
        let trimmed = entry.trim();

        if !trimmed.starts_with("$<") {
            return Some(ConditionalPath::Plain(trimmed.to_string()));
        }

        let body = trimmed.strip_prefix("$<")?.strip_suffix('>')?;
        let (tag, rest) = body.split_once(':')?;

        match tag {
            "BUILD_INTERFACE" => Some(ConditionalPath::BuildOnly(rest.to_string())),
            "INSTALL_INTERFACE" => Some(ConditionalPath::InstallOnly(rest.to_string())),
            "CONFIG" => {
                let (config, inner) = rest.split_once(':')?;
                if config.is_empty() {
                    return None;
                }
                Some(ConditionalPath::ConfigOnly {
                    config: config.to_string(),
                    inner: inner.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// Normalize raw entries to plain paths for an out-of-band tool.
///
/// Build-phase wrappers are unwrapped; install-phase wrappers are
/// dropped (the tool only ever runs against build-phase artifacts).
/// Configuration-conditional wrappers are kept or dropped against the
/// active configuration when it is known; when it is not, the wrapper is
/// stripped unconditionally - a lossy fallback, so it logs a warning.
/// Malformed entries are skipped with a warning, never fatal.
pub fn normalize(entries: &[String], active_config: Option<&str>) -> Vec<PathBuf> {
    let mut out = Vec::new();

    for entry in entries {
        let parsed = match ConditionalPath::parse(entry) {
            Some(p) => p,
            None => {
                tracing::warn!("skipping malformed path wrapper: `{}`", entry);
                continue;
            }
        };

        match parsed {
            ConditionalPath::Plain(p) | ConditionalPath::BuildOnly(p) => {
                if !p.is_empty() {
                    out.push(PathBuf::from(p));
                }
            }
            ConditionalPath::InstallOnly(_) => {}
            ConditionalPath::ConfigOnly { config, inner } => match active_config {
                Some(active) => {
                    if config.eq_ignore_ascii_case(active) && !inner.is_empty() {
                        out.push(PathBuf::from(inner));
                    }
                }
                None => {
                    tracing::warn!(
                        "no active configuration; stripping `$<CONFIG:{}:...>` wrapper from `{}`",
                        config,
                        inner
                    );
                    if !inner.is_empty() {
                        out.push(PathBuf::from(inner));
                    }
                }
            },
        }
    }

    out
}
