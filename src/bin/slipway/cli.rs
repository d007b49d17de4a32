//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Slipway - project-description-to-build-graph compiler
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full configure pass: graph, codegen, package export
    Configure(ConfigureArgs),

    /// Run only the interface code-generation pipeline
    Generate(ConfigureArgs),

    /// Build the declared script projects
    Scripts(ConfigureArgs),

    /// Remove the output root
    Clean(ConfigureArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Path to Slipway.toml (defaults to searching parent directories)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Host platform preset identifier
    #[arg(long, env = "SLIPWAY_HOST_PRESET")]
    pub host_preset: Option<String>,

    /// Build type identifier (debug, release, ...)
    #[arg(long, env = "SLIPWAY_BUILD_TYPE")]
    pub build_type: Option<String>,

    /// Root output folder
    #[arg(long, env = "SLIPWAY_OUTPUT_ROOT")]
    pub output_root: Option<PathBuf>,

    /// Active configuration for conditional paths (defaults to build type)
    #[arg(long)]
    pub active_config: Option<String>,

    /// Additional install roots consulted by the package oracle
    #[arg(long = "install-root")]
    pub install_roots: Vec<PathBuf>,

    /// Abort on the first failing header instead of aggregating failures
    #[arg(long)]
    pub eager: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl ConfigureArgs {
    pub fn into_options(self) -> slipway::ops::ConfigureOptions {
        slipway::ops::ConfigureOptions {
            manifest_path: self.manifest_path,
            host_preset: self.host_preset,
            build_type: self.build_type,
            output_root: self.output_root,
            active_config: self.active_config,
            install_roots: self.install_roots,
            eager: self.eager,
        }
    }
}
