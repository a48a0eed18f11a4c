//! Merges the four module path sources into one ordered path
//!
//! Groups always appear in the same order: path elements, file-sets,
//! dir-sets, dependency-sets. Entries reached through two sources appear
//! twice unless the `deduplicate` pass is requested.

use super::fileset::FileSet;
use super::PATH_SEPARATOR;
use crate::debug::path_elements_debug_info;
use crate::error::{ResolveError, SetKind};
use crate::filter::{compile_filters, select_dependencies, DependencySelection, DependencySet};
use crate::module::Candidate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The `[module_path]` configuration section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulePath {
    pub path_elements: Vec<PathBuf>,
    pub file_sets: Vec<FileSet>,
    pub dir_sets: Vec<FileSet>,
    /// An empty list applies the default dependency policy
    pub dependency_sets: Vec<DependencySet>,
    pub deduplicate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembledModulePath {
    pub path_elements: Vec<PathBuf>,
    pub file_sets: Vec<PathBuf>,
    pub dir_sets: Vec<PathBuf>,
    pub dependency_sets: Vec<PathBuf>,
}

impl AssembledModulePath {
    /// Every entry in group order.
    pub fn entries(&self) -> impl Iterator<Item = &PathBuf> {
        self.path_elements
            .iter()
            .chain(&self.file_sets)
            .chain(&self.dir_sets)
            .chain(&self.dependency_sets)
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Joins the entries with the platform separator; blank entries are skipped.
    pub fn to_path_string(&self) -> String {
        self.entries()
            .map(|p| p.to_string_lossy())
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Drops repeated entries across all groups; the first occurrence wins.
    pub fn deduplicated(&self) -> Self {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut keep = |group: &[PathBuf]| -> Vec<PathBuf> {
            group
                .iter()
                .filter(|p| seen.insert((*p).clone()))
                .cloned()
                .collect()
        };
        Self {
            path_elements: keep(&self.path_elements),
            file_sets: keep(&self.file_sets),
            dir_sets: keep(&self.dir_sets),
            dependency_sets: keep(&self.dependency_sets),
        }
    }
}

impl fmt::Display for AssembledModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

/// Result of assembling the module path
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub module_path: AssembledModulePath,
    pub selection: DependencySelection,
}

fn expand_sets(
    sets: &[FileSet],
    kind: SetKind,
    project_root: &Path,
) -> Result<Vec<PathBuf>, ResolveError> {
    let mut expanded = Vec::new();
    for set in sets {
        expanded.extend(set.expand(kind, project_root)?);
    }
    Ok(expanded)
}

/// Assembles the module path from `config` over the resolved `candidates`.
pub fn assemble(
    config: &ModulePath,
    project_root: &Path,
    candidates: &[Candidate],
) -> Result<Assembly, ResolveError> {
    let filters = compile_filters(&config.dependency_sets)?;

    if !config.path_elements.is_empty() {
        debug!(
            "{}",
            path_elements_debug_info("PATHELEMENTS", &config.path_elements)
        );
    }

    let file_sets = expand_sets(&config.file_sets, SetKind::FileSet, project_root)?;
    let dir_sets = expand_sets(&config.dir_sets, SetKind::DirSet, project_root)?;
    let selection = select_dependencies(&filters, candidates)?;

    let mut module_path = AssembledModulePath {
        path_elements: config.path_elements.clone(),
        file_sets,
        dir_sets,
        dependency_sets: selection.selected.clone(),
    };
    if config.deduplicate {
        let before = module_path.len();
        module_path = module_path.deduplicated();
        debug!(removed = before - module_path.len(), "Deduplicated module path");
    }

    info!(
        path_elements = module_path.path_elements.len(),
        file_sets = module_path.file_sets.len(),
        dir_sets = module_path.dir_sets.len(),
        dependency_sets = module_path.dependency_sets.len(),
        "Module path assembled"
    );

    Ok(Assembly {
        module_path,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{CandidateOrigin, ModuleDescriptor};

    fn paths(raw: &[&str]) -> Vec<PathBuf> {
        raw.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_groups_are_joined_in_order_without_stray_separators() {
        let assembled = AssembledModulePath {
            path_elements: paths(&["p1", "p2"]),
            file_sets: Vec::new(),
            dir_sets: paths(&["d1"]),
            dependency_sets: Vec::new(),
        };
        let sep = PATH_SEPARATOR;
        assert_eq!(assembled.to_path_string(), format!("p1{sep}p2{sep}d1"));
        assert_eq!(AssembledModulePath::default().to_path_string(), "");
    }

    #[test]
    fn test_duplicates_are_kept_unless_deduplicated() {
        let assembled = AssembledModulePath {
            path_elements: paths(&["a.jar"]),
            file_sets: paths(&["a.jar", "b.jar"]),
            dir_sets: Vec::new(),
            dependency_sets: paths(&["b.jar", "c.jar"]),
        };
        assert_eq!(assembled.len(), 5);

        let deduplicated = assembled.deduplicated();
        assert_eq!(deduplicated.path_elements, paths(&["a.jar"]));
        assert_eq!(deduplicated.file_sets, paths(&["b.jar"]));
        assert_eq!(deduplicated.dependency_sets, paths(&["c.jar"]));
    }

    #[test]
    fn test_assemble_path_elements_and_dependency_set() {
        let config = ModulePath {
            path_elements: paths(&["mod.jar"]),
            dependency_sets: vec![DependencySet {
                includes: vec!["glob:**/*.jar".to_string()],
                excludes: vec!["glob:**/*Empty.jar".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let candidates = vec![
            Candidate::new("/libs/a.jar", CandidateOrigin::Artifact)
                .with_descriptor(ModuleDescriptor::named("a")),
            Candidate::new("/libs/aEmpty.jar", CandidateOrigin::Artifact)
                .with_descriptor(ModuleDescriptor::named("a.empty")),
        ];

        let assembly = assemble(&config, Path::new("/project"), &candidates).unwrap();
        assert_eq!(
            assembly.module_path.to_path_string(),
            format!("mod.jar{}/libs/a.jar", PATH_SEPARATOR)
        );
    }

    #[test]
    fn test_assemble_reports_invalid_dependency_pattern() {
        let config = ModulePath {
            dependency_sets: vec![DependencySet {
                exclude_names: vec!["(".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(
            assemble(&config, Path::new("/project"), &[]),
            Err(ResolveError::Pattern(_))
        ));
    }
}
