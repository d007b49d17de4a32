//! Script project declarations.
//!
//! A ScriptProject is a user-authored module built by an out-of-band
//! toolchain into exactly one portable bytecode module. The module's
//! location is derived deterministically from the manifest's own
//! declared name plus the build profile, following each toolchain's
//! output-layout convention.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Foreign toolchain family, keyed by manifest kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLanguage {
    /// Systems-language package manifest (Cargo.toml)
    Systems,
    /// Managed-runtime project manifest (.csproj)
    Managed,
    /// Native-build-tool manifest (CMakeLists.txt)
    NativeBuild,
}

impl ScriptLanguage {
    /// Detect the language from the manifest file name.
    pub fn from_manifest(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy();
        if file_name == "Cargo.toml" {
            Some(ScriptLanguage::Systems)
        } else if file_name.ends_with(".csproj") {
            Some(ScriptLanguage::Managed)
        } else if file_name == "CMakeLists.txt" {
            Some(ScriptLanguage::NativeBuild)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScriptLanguage::Systems => "systems",
            ScriptLanguage::Managed => "managed",
            ScriptLanguage::NativeBuild => "native_build",
        };
        f.write_str(s)
    }
}

/// One declared script project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptProject {
    /// Path to the script's own manifest file
    pub manifest_path: PathBuf,

    /// Toolchain family
    pub language: ScriptLanguage,

    /// Build profile handed to the toolchain (debug/release)
    pub build_profile: String,
}

impl ScriptProject {
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        language: ScriptLanguage,
        build_profile: impl Into<String>,
    ) -> Self {
        ScriptProject {
            manifest_path: manifest_path.into(),
            language,
            build_profile: build_profile.into(),
        }
    }
}
