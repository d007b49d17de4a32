//! User-friendly diagnostic messages and the typed error taxonomy.
//!
//! Every fatal error carries enough context (project name, header path,
//! missing field name) to locate the offending declaration without
//! re-running with extra verbosity.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str = "help: Create a Slipway.toml describing the package's projects";

    /// Suggestion when the front-end compiler cannot be located.
    pub const NO_FRONTEND: &str =
        "help: Install clang or point SLIPWAY_CLANG at a clang++ executable";

    /// Suggestion when a dependency cannot be resolved.
    pub const UNRESOLVED_DEPENDENCY: &str =
        "help: Check the dependency name, or install the providing package under the install root";

    /// Suggestion when a required configure input is missing.
    pub const MISSING_INPUT: &str =
        "help: Pass the value as a flag or set the matching SLIPWAY_* environment variable";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// A required configure input or environment tool is absent.
///
/// These are invocation-wide prerequisites: they abort the whole
/// configure pass and are reported once.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigurationError {
    #[error("missing required parameter `{name}`")]
    #[diagnostic(
        code(slipway::configure::missing_parameter),
        help("Pass --{name} or set SLIPWAY_{env} in the environment")
    )]
    MissingParameter { name: String, env: String },

    #[error("required tool `{tool}` not found")]
    #[diagnostic(
        code(slipway::configure::tool_missing),
        help("Install {tool} or make it reachable via PATH")
    )]
    ToolMissing { tool: String },

    #[error("template `{path}` not found in the template directory")]
    #[diagnostic(
        code(slipway::configure::template_missing),
        help("Add the template file, or drop the matching output folder from [codegen]")
    )]
    TemplateMissing { path: PathBuf },
}

impl ConfigurationError {
    /// Missing parameter, deriving the env-var suffix from the flag name.
    pub fn missing(name: &str) -> Self {
        ConfigurationError::MissingParameter {
            name: name.to_string(),
            env: name.replace('-', "_").to_uppercase(),
        }
    }
}

/// A named dependency could not be found as a materialized node or
/// through the package oracle. Fatal for the project being configured.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("could not resolve dependency `{dependency}` required by `{requested_by}`")]
#[diagnostic(code(slipway::resolve::not_found))]
pub struct DependencyResolutionError {
    pub dependency: String,
    pub requested_by: String,
    #[help]
    pub suggestion: Option<String>,
}

impl DependencyResolutionError {
    pub fn new(dependency: impl Into<String>, requested_by: impl Into<String>) -> Self {
        DependencyResolutionError {
            dependency: dependency.into(),
            requested_by: requested_by.into(),
            suggestion: Some(suggestions::UNRESOLVED_DEPENDENCY.to_string()),
        }
    }
}

/// The front-end failed to parse one interface header.
///
/// Fatal for that header's artifact chain only; sibling headers keep
/// processing.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("metadata extraction failed for `{header}`")]
#[diagnostic(code(slipway::codegen::extraction_failed))]
pub struct ExtractionError {
    pub header: PathBuf,
    #[help]
    pub detail: Option<String>,
}

impl ExtractionError {
    pub fn new(header: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        ExtractionError {
            header: header.into(),
            detail: Some(detail.into()),
        }
    }
}

/// A project declared a dependency keyword its kind does not allow.
///
/// The message names the offending keyword and the correct one, so the
/// declaration can be fixed without consulting the kind table.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("project `{project}` of kind `{kind}` may not declare `{keyword}` dependencies; {correction}")]
#[diagnostic(code(slipway::dispatch::linkage_rule))]
pub struct LinkageRuleViolation {
    pub project: String,
    pub kind: String,
    pub keyword: String,
    pub correction: String,
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("could not resolve dependency `render-core`")
            .with_context("required by project `viewer` (public)")
            .with_suggestion("Install the providing package under the install root")
            .with_suggestion("Declare the target in this workspace before `viewer`");

        let output = diag.format(false);
        assert!(output.contains("error: could not resolve"));
        assert!(output.contains("required by project"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Install the providing package"));
    }

    #[test]
    fn test_missing_parameter_env_name() {
        let err = ConfigurationError::missing("host-preset");
        match err {
            ConfigurationError::MissingParameter { ref env, .. } => {
                assert_eq!(env, "HOST_PRESET");
            }
            _ => panic!("wrong variant"),
        }
        assert!(err.to_string().contains("host-preset"));
    }

    #[test]
    fn test_linkage_violation_message() {
        let err = LinkageRuleViolation {
            project: "math".to_string(),
            kind: "interface".to_string(),
            keyword: "public".to_string(),
            correction: "use `interface` dependencies for interface projects".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("math"));
        assert!(msg.contains("`public`"));
    }
}
