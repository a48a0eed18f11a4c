//! Serializable summaries of a resolution run and of inspected artifacts

use crate::error::root_cause;
use crate::filter::{Decision, Reason};
use crate::module::{
    read_descriptor, Candidate, ModuleDescriptor, ModuleNameSource, PathException, ToolchainHome,
};
use crate::path::AssembledModulePath;
use crate::resolution::Resolution;
use serde::Serialize;
use std::path::PathBuf;

/// Kind of project, derived from the main module's exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Application,
    Library,
    NonModular,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainModule {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSummary {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_source: Option<ModuleNameSource>,
}

impl From<&Candidate> for ElementSummary {
    fn from(candidate: &Candidate) -> Self {
        Self {
            path: candidate.path.clone(),
            module: candidate.descriptor.as_ref().map(|d| d.name.clone()),
            name_source: candidate.descriptor.as_ref().map(|d| d.source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionSummary {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub automatic: bool,
    pub included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl From<&Decision> for DecisionSummary {
    fn from(decision: &Decision) -> Self {
        Self {
            path: decision.path.clone(),
            module: decision.module.clone(),
            automatic: decision.automatic,
            included: decision.included,
            reason: decision.reason(),
        }
    }
}

/// Outcome of a resolution run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub module_path: String,
    pub entries: AssembledModulePath,
    pub project_kind: ProjectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_module: Option<MainModule>,
    pub modulepath_elements: Vec<ElementSummary>,
    pub classpath_elements: Vec<ElementSummary>,
    pub filename_based_modules: Vec<PathBuf>,
    pub dependencies: Vec<DecisionSummary>,
    pub path_exceptions: Vec<PathException>,
}

impl ResolutionReport {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let resolved = &resolution.resolved;
        let main_module = resolved.main_module_descriptor().map(|d| MainModule {
            name: d.name.clone(),
            version: d.version.clone(),
            main_class: d.main_class.clone(),
        });
        let project_kind = match &main_module {
            None => ProjectKind::NonModular,
            Some(_) if resolved.is_application() => ProjectKind::Application,
            Some(_) => ProjectKind::Library,
        };

        Self {
            module_path: resolution.module_path(),
            entries: resolution.assembly.module_path.clone(),
            project_kind,
            main_module,
            modulepath_elements: resolved
                .modulepath_elements()
                .into_iter()
                .map(ElementSummary::from)
                .collect(),
            classpath_elements: resolved
                .classpath_elements()
                .into_iter()
                .map(ElementSummary::from)
                .collect(),
            filename_based_modules: resolved
                .filename_based_modules()
                .into_iter()
                .map(|c| c.path.clone())
                .collect(),
            dependencies: resolution
                .assembly
                .selection
                .decisions
                .iter()
                .map(DecisionSummary::from)
                .collect(),
            path_exceptions: resolved.path_exceptions().to_vec(),
        }
    }
}

/// Descriptor of one inspected artifact, or why it could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectedArtifact {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<ModuleDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn inspect_artifacts(
    paths: &[PathBuf],
    toolchain: Option<&ToolchainHome>,
) -> Vec<InspectedArtifact> {
    paths
        .iter()
        .map(|path| match read_descriptor(path, toolchain) {
            Ok(descriptor) => InspectedArtifact {
                path: path.clone(),
                descriptor,
                error: None,
            },
            Err(e) => InspectedArtifact {
                path: path.clone(),
                descriptor: None,
                error: Some(root_cause(&e)),
            },
        })
        .collect()
}
