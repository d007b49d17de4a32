//! Point extraction of well-known fields from foreign manifest files.
//!
//! Each toolchain's manifest grammar is foreign (TOML, MSBuild XML,
//! CMake script); the builder only ever needs two or three well-known
//! fields, so each format gets a narrow regex probe rather than a full
//! parser. The `ManifestProbe` seam keeps callers ignorant of the
//! extraction mechanics, so a real parser could be substituted without
//! touching them.

use regex::Regex;

/// Narrow field lookup over one manifest's content.
pub trait ManifestProbe {
    /// Extract a well-known field by name, if present.
    fn field(&self, name: &str) -> Option<String>;
}

/// Probe for systems-language package manifests (Cargo.toml).
pub struct CargoProbe {
    content: String,
}

impl CargoProbe {
    pub fn new(content: impl Into<String>) -> Self {
        CargoProbe {
            content: content.into(),
        }
    }
}

impl ManifestProbe for CargoProbe {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => capture(&self.content, r#"(?m)^\s*name\s*=\s*"([^"]+)""#),
            _ => None,
        }
    }
}

/// Probe for managed-runtime project manifests (.csproj).
pub struct CsprojProbe {
    content: String,
}

impl CsprojProbe {
    pub fn new(content: impl Into<String>) -> Self {
        CsprojProbe {
            content: content.into(),
        }
    }
}

impl ManifestProbe for CsprojProbe {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "assembly_name" => capture(&self.content, r"<AssemblyName>\s*([^<\s]+)\s*</AssemblyName>"),
            "target_framework" => capture(
                &self.content,
                r"<TargetFramework>\s*([^<\s]+)\s*</TargetFramework>",
            ),
            _ => None,
        }
    }
}

/// Probe for native-build-tool manifests (CMakeLists.txt).
pub struct CMakeProbe {
    content: String,
}

impl CMakeProbe {
    pub fn new(content: impl Into<String>) -> Self {
        CMakeProbe {
            content: content.into(),
        }
    }
}

impl ManifestProbe for CMakeProbe {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "project" => capture(&self.content, r"(?i)project\s*\(\s*([A-Za-z0-9_\-]+)"),
            _ => None,
        }
    }
}

fn capture(content: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).expect("probe pattern must compile");
    re.captures(content).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cargo_probe() {
        let probe = CargoProbe::new(
            "[package]\nname = \"mover-script\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
        );

        assert_eq!(probe.field("name").as_deref(), Some("mover-script"));
        assert_eq!(probe.field("version"), None);
    }

    #[test]
    fn test_csproj_probe() {
        let probe = CsprojProbe::new(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net9.0</TargetFramework>
    <AssemblyName>HudScript</AssemblyName>
  </PropertyGroup>
</Project>"#,
        );

        assert_eq!(probe.field("assembly_name").as_deref(), Some("HudScript"));
        assert_eq!(probe.field("target_framework").as_deref(), Some("net9.0"));
    }

    #[test]
    fn test_cmake_probe() {
        let probe = CMakeProbe::new("cmake_minimum_required(VERSION 3.20)\nproject(ai_logic VERSION 1.0)\n");

        assert_eq!(probe.field("project").as_deref(), Some("ai_logic"));
    }

    #[test]
    fn test_missing_field_is_none() {
        let probe = CargoProbe::new("[package]\nversion = \"0.1.0\"\n");
        assert_eq!(probe.field("name"), None);
    }
}
