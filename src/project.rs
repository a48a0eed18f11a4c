//! Project dependencies: where the candidate list comes from

use crate::debug::artifact_set_debug_info;
use crate::module::CandidateOrigin;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dependency scope of a resolved artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        };
        write!(f, "{}", name)
    }
}

/// A resolved dependency artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    #[serde(default)]
    pub scope: Scope,
    /// `group:artifact:version`, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, scope: Scope) -> Self {
        Self {
            path: path.into(),
            scope,
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, coordinates: impl Into<String>) -> Self {
        self.coordinates = Some(coordinates.into());
        self
    }
}

/// Supplies the inputs of descriptor resolution
pub trait DependencyProvider {
    fn output_directory(&self) -> &Path;

    /// Resolved artifacts in resolution order
    fn artifacts(&self) -> &[Artifact];

    /// Declared system-path dependencies
    fn system_dependencies(&self) -> &[PathBuf];

    /// Output directory first, then every non-test artifact, then the
    /// non-blank system-path dependencies.
    fn candidate_paths(&self) -> Vec<(PathBuf, CandidateOrigin)> {
        let artifacts: Vec<&Artifact> = self
            .artifacts()
            .iter()
            .filter(|a| a.scope != Scope::Test)
            .collect();
        debug!("{}", artifact_set_debug_info(&artifacts));

        let mut paths = vec![(
            self.output_directory().to_path_buf(),
            CandidateOrigin::OutputDirectory,
        )];
        paths.extend(
            artifacts
                .into_iter()
                .map(|a| (a.path.clone(), CandidateOrigin::Artifact)),
        );
        paths.extend(
            self.system_dependencies()
                .iter()
                .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
                .map(|p| (p.clone(), CandidateOrigin::SystemDependency)),
        );
        paths
    }
}

/// Dependencies declared directly in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDependencies {
    pub output_directory: PathBuf,
    pub artifacts: Vec<Artifact>,
    pub system_dependencies: Vec<PathBuf>,
}

impl DependencyProvider for ProjectDependencies {
    fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    fn system_dependencies(&self) -> &[PathBuf] {
        &self.system_dependencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_paths_order_and_scope_filter() {
        let project = ProjectDependencies {
            output_directory: PathBuf::from("/p/target/classes"),
            artifacts: vec![
                Artifact::new("/repo/a.jar", Scope::Compile),
                Artifact::new("/repo/junit.jar", Scope::Test),
                Artifact::new("/repo/b.jar", Scope::Runtime).with_coordinates("org:b:1.0"),
            ],
            system_dependencies: vec![PathBuf::from("/opt/sys.jar"), PathBuf::from("  ")],
        };

        let paths = project.candidate_paths();
        assert_eq!(
            paths,
            vec![
                (PathBuf::from("/p/target/classes"), CandidateOrigin::OutputDirectory),
                (PathBuf::from("/repo/a.jar"), CandidateOrigin::Artifact),
                (PathBuf::from("/repo/b.jar"), CandidateOrigin::Artifact),
                (PathBuf::from("/opt/sys.jar"), CandidateOrigin::SystemDependency),
            ]
        );
    }

    #[test]
    fn test_scope_deserializes_lowercase() {
        let artifact: Artifact = toml::from_str("path = \"/a.jar\"\nscope = \"provided\"").unwrap();
        assert_eq!(artifact.scope, Scope::Provided);
        let artifact: Artifact = toml::from_str("path = \"/a.jar\"").unwrap();
        assert_eq!(artifact.scope, Scope::Compile);
    }
}
