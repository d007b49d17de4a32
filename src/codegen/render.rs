//! Template rendering for the fan-out stages.
//!
//! Templates live as files in the workspace's template directory; each
//! stage render feeds the upstream JSON document into one template. The
//! template file is a declared input of the rendered artifact, so
//! editing a template regenerates exactly the artifacts behind it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tera::Tera;

use crate::util::diagnostic::ConfigurationError;

/// Renders JSON documents through tera templates.
#[derive(Debug)]
pub struct Renderer {
    template_dir: PathBuf,
    tera: Tera,
}

impl Renderer {
    /// Load the named templates from a directory.
    ///
    /// Missing template files are a fatal environment error, reported
    /// before any header is processed.
    pub fn load(template_dir: &Path, template_names: &[&str]) -> Result<Self> {
        let mut tera = Tera::default();

        for name in template_names {
            let path = template_dir.join(name);
            if !path.is_file() {
                return Err(ConfigurationError::TemplateMissing { path }.into());
            }
            let content = crate::util::fs::read_to_string(&path)?;
            tera.add_raw_template(name, &content)
                .with_context(|| format!("failed to compile template: {}", path.display()))?;
        }

        tera.register_filter(
            "string_literal",
            |value: &tera::Value,
             _args: &std::collections::HashMap<String, tera::Value>| match value {
            tera::Value::Null => Ok(tera::Value::String("nullptr".to_string())),
            tera::Value::String(old) => {
                let escaped = format!(
                    "\"{}\"",
                    old.replace('\\', "\\\\")
                        .replace('\n', "\\n")
                        .replace('\r', "")
                        .replace('"', "\\\"")
                );
                Ok(tera::Value::String(escaped))
            }
            _ => Err(tera::Error::msg("string_literal expects a string")),
        });

        Ok(Renderer {
            template_dir: template_dir.to_path_buf(),
            tera,
        })
    }

    /// Absolute path of a template file, for input-dependency tracking.
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.template_dir.join(name)
    }

    /// Render one template over a JSON document.
    pub fn render(&self, template_name: &str, document: &Value) -> Result<String> {
        let context = tera::Context::from_value(document.clone())
            .context("extraction document is not a JSON object")?;

        self.tera
            .render(template_name, &context)
            .with_context(|| format!("failed to render template `{}`", template_name))
    }
}
