//! Module descriptors and the candidates they are attached to
//!
//! A [`Candidate`] is one location that may end up on the module path: the
//! project output directory, a resolved artifact or a system-path dependency.
//! Each candidate carries the [`ModuleDescriptor`] extracted from it, if any.

pub mod archive;
pub mod automatic;
pub mod classfile;
pub mod manifest;
pub mod resolver;
pub mod toolchain;

pub use archive::{read_descriptor, DescriptorError};
pub use resolver::{resolve_paths, PathException, Placement, ResolveRequest, ResolvedPaths};
pub use toolchain::ToolchainHome;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_NAME: &str = "module-info.class";

/// Where the module name of a descriptor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleNameSource {
    /// Declared in a compiled `module-info.class`
    ModuleDescriptor,
    /// `Automatic-Module-Name` manifest attribute
    Manifest,
    /// Derived from the archive file name
    Filename,
}

impl fmt::Display for ModuleNameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleNameSource::ModuleDescriptor => write!(f, "module-info"),
            ModuleNameSource::Manifest => write!(f, "manifest"),
            ModuleNameSource::Filename => write!(f, "filename"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiresModifier {
    Transitive,
    Static,
    Synthetic,
    Mandated,
}

impl fmt::Display for RequiresModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiresModifier::Transitive => write!(f, "TRANSITIVE"),
            RequiresModifier::Static => write!(f, "STATIC"),
            RequiresModifier::Synthetic => write!(f, "SYNTHETIC"),
            RequiresModifier::Mandated => write!(f, "MANDATED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requires {
    pub name: String,
    pub modifiers: Vec<RequiresModifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Requires {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
            version: None,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(&RequiresModifier::Static)
    }
}

/// An exported package; `targets` is `None` for an unqualified export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exports {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provides {
    pub service: String,
    pub providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub source: ModuleNameSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub open: bool,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub provides: Vec<Provides>,
    pub uses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
}

impl ModuleDescriptor {
    /// A descriptor whose name was not declared by the module itself.
    pub fn automatic(name: impl Into<String>, source: ModuleNameSource) -> Self {
        Self {
            name: name.into(),
            source,
            version: None,
            open: false,
            requires: Vec::new(),
            exports: Vec::new(),
            provides: Vec::new(),
            uses: Vec::new(),
            main_class: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::automatic(name, ModuleNameSource::ModuleDescriptor)
    }

    pub fn is_automatic(&self) -> bool {
        self.source != ModuleNameSource::ModuleDescriptor
    }
}

/// Where a candidate path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    OutputDirectory,
    Artifact,
    SystemDependency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
    pub origin: CandidateOrigin,
    pub descriptor: Option<ModuleDescriptor>,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, origin: CandidateOrigin) -> Self {
        Self {
            path: path.into(),
            origin,
            descriptor: None,
        }
    }

    pub fn with_descriptor(mut self, descriptor: ModuleDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_output(&self) -> bool {
        self.origin == CandidateOrigin::OutputDirectory
    }

    pub fn is_automatic(&self) -> bool {
        self.descriptor
            .as_ref()
            .map(ModuleDescriptor::is_automatic)
            .unwrap_or(false)
    }

    /// Module name used for name patterns; empty when there is no descriptor.
    pub fn module_name(&self) -> &str {
        self.descriptor
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("")
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automatic_flag_follows_name_source() {
        assert!(!ModuleDescriptor::named("a").is_automatic());
        assert!(ModuleDescriptor::automatic("a", ModuleNameSource::Manifest).is_automatic());
        assert!(ModuleDescriptor::automatic("a", ModuleNameSource::Filename).is_automatic());
    }

    #[test]
    fn test_candidate_without_descriptor() {
        let candidate = Candidate::new("/libs/plain.jar", CandidateOrigin::Artifact);
        assert_eq!(candidate.module_name(), "");
        assert!(!candidate.is_automatic());
        assert!(!candidate.is_output());
        assert_eq!(candidate.file_name(), "plain.jar");
    }
}
