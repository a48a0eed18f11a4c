//! Descriptor resolution for the whole candidate set
//!
//! Every candidate is inspected independently. A failure for one candidate is
//! recorded as a [`PathException`] and the candidate stays in the set without
//! a descriptor, so a single report can list every problematic dependency.

use super::archive::read_descriptor;
use super::toolchain::ToolchainHome;
use super::{Candidate, CandidateOrigin, ModuleDescriptor, ModuleNameSource};
use crate::error::root_cause;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Input of a resolution run
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub paths: Vec<(PathBuf, CandidateOrigin)>,
    pub toolchain: Option<ToolchainHome>,
}

impl ResolveRequest {
    pub fn new(paths: Vec<(PathBuf, CandidateOrigin)>) -> Self {
        Self {
            paths,
            toolchain: None,
        }
    }

    pub fn with_toolchain(mut self, toolchain: Option<ToolchainHome>) -> Self {
        self.toolchain = toolchain;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathException {
    pub path: PathBuf,
    pub cause: String,
}

/// Whether a candidate belongs on the module path or the class path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    ModulePath,
    ClassPath,
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    candidates: Vec<Candidate>,
    placements: Vec<Placement>,
    main_module: Option<ModuleDescriptor>,
    path_exceptions: Vec<PathException>,
}

impl ResolvedPaths {
    /// Builds a resolution result from already resolved candidates.
    pub fn from_candidates(candidates: Vec<Candidate>, path_exceptions: Vec<PathException>) -> Self {
        let main_module = candidates
            .iter()
            .find(|c| c.is_output())
            .and_then(|c| c.descriptor.as_ref())
            .filter(|d| !d.is_automatic())
            .cloned();
        let placements = classify(&candidates, main_module.as_ref());
        Self {
            candidates,
            placements,
            main_module,
            path_exceptions,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn main_module_descriptor(&self) -> Option<&ModuleDescriptor> {
        self.main_module.as_ref()
    }

    pub fn path_exceptions(&self) -> &[PathException] {
        &self.path_exceptions
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .find(|c| c.is_output())
            .map(Candidate::path)
    }

    pub fn placement(&self, index: usize) -> Option<Placement> {
        self.placements.get(index).copied()
    }

    pub fn modulepath_elements(&self) -> Vec<&Candidate> {
        self.with_placement(Placement::ModulePath)
    }

    pub fn classpath_elements(&self) -> Vec<&Candidate> {
        self.with_placement(Placement::ClassPath)
    }

    fn with_placement(&self, placement: Placement) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .zip(&self.placements)
            .filter(|(_, p)| **p == placement)
            .map(|(c, _)| c)
            .collect()
    }

    /// Automatic modules whose name was guessed from the file name.
    pub fn filename_based_modules(&self) -> Vec<&Candidate> {
        self.modulepath_elements()
            .into_iter()
            .filter(|c| {
                c.descriptor
                    .as_ref()
                    .map(|d| d.source == ModuleNameSource::Filename)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// A modular project whose main module exports nothing is an application.
    pub fn is_application(&self) -> bool {
        self.main_module
            .as_ref()
            .map(|d| d.exports.is_empty())
            .unwrap_or(false)
    }

    /// Logs the main module, both element lists and every path exception.
    pub fn log_summary(&self) {
        match &self.main_module {
            Some(descriptor) => info!("Found the main module descriptor: [{}]", descriptor.name),
            None => warn!("The main module descriptor not found"),
        }

        let classpath = self.classpath_elements();
        info!(
            "Found classpath elements: {}\n{}",
            classpath.len(),
            classpath
                .iter()
                .map(|c| c.path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n")
        );

        let kind = if self.is_application() {
            "APPLICATION"
        } else {
            "LIBRARY"
        };
        let modulepath = self.modulepath_elements();
        info!(
            "Found modulepath elements: {}\n{}",
            modulepath.len(),
            modulepath
                .iter()
                .map(|c| {
                    let filename_based = c
                        .descriptor
                        .as_ref()
                        .map(|d| d.source == ModuleNameSource::Filename)
                        .unwrap_or(false);
                    if filename_based {
                        format!(
                            "{}\n[!] Detected 'requires' filename based automatic module\n\
                             [!] Please don't publish this project to a public artifact repository\n\
                             [!] {}",
                            c.path.display(),
                            kind
                        )
                    } else {
                        c.path.display().to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        );

        for candidate in self.filename_based_modules() {
            warn!(
                path = %candidate.path.display(),
                module = candidate.module_name(),
                "Filename based automatic module"
            );
        }

        if !self.path_exceptions.is_empty() {
            warn!(
                "Found path exceptions: {}\n{}",
                self.path_exceptions.len(),
                self.path_exceptions
                    .iter()
                    .map(|e| format!("{}\n{}", e.path.display(), e.cause))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
    }
}

/// Transitive non-static `requires` closure of the main module; everything
/// else goes on the class path. Without a main module nothing is modular.
fn classify(candidates: &[Candidate], main_module: Option<&ModuleDescriptor>) -> Vec<Placement> {
    let mut placements = vec![Placement::ClassPath; candidates.len()];
    let Some(main_module) = main_module else {
        return placements;
    };

    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        if let Some(descriptor) = &candidate.descriptor {
            by_name.entry(descriptor.name.as_str()).or_insert(index);
        }
    }

    if let Some(index) = candidates.iter().position(Candidate::is_output) {
        placements[index] = Placement::ModulePath;
    }

    let mut visited: HashSet<usize> = HashSet::new();
    let mut pending: Vec<&str> = main_module
        .requires
        .iter()
        .filter(|r| !r.is_static())
        .map(|r| r.name.as_str())
        .collect();

    while let Some(name) = pending.pop() {
        let Some(&index) = by_name.get(name) else {
            // platform module or unresolved
            continue;
        };
        if !visited.insert(index) {
            continue;
        }
        placements[index] = Placement::ModulePath;
        if let Some(descriptor) = &candidates[index].descriptor {
            pending.extend(
                descriptor
                    .requires
                    .iter()
                    .filter(|r| !r.is_static())
                    .map(|r| r.name.as_str()),
            );
        }
    }

    placements
}

/// Reads the descriptor of every requested path.
///
/// Duplicate paths collapse onto their first occurrence.
pub fn resolve_paths(request: &ResolveRequest) -> ResolvedPaths {
    let mut seen: HashSet<&Path> = HashSet::new();
    let mut candidates = Vec::with_capacity(request.paths.len());
    let mut path_exceptions = Vec::new();

    for (path, origin) in &request.paths {
        if !seen.insert(path.as_path()) {
            debug!(path = %path.display(), "Skipping duplicate candidate");
            continue;
        }

        let mut candidate = Candidate::new(path.clone(), *origin);
        match read_descriptor(path, request.toolchain.as_ref()) {
            Ok(Some(descriptor)) => {
                debug!(
                    path = %path.display(),
                    module = %descriptor.name,
                    source = %descriptor.source,
                    "Resolved module descriptor"
                );
                candidate.descriptor = Some(descriptor);
            }
            Ok(None) => {
                debug!(path = %path.display(), "No module descriptor");
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Module descriptor extraction failed");
                path_exceptions.push(PathException {
                    path: path.clone(),
                    cause: root_cause(&e),
                });
            }
        }
        candidates.push(candidate);
    }

    ResolvedPaths::from_candidates(candidates, path_exceptions)
}
