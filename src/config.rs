//! Configuration management for jlinkpath
//!
//! The resolution inputs are read from a TOML file. Relative paths resolve
//! against the project root, which defaults to the directory holding the
//! configuration file.
//!
//! # Environment Variables
//!
//! - `JLINKPATH_TOOLCHAIN_HOME`: toolchain home used when none is configured
//! - `JAVA_HOME`: fallback for `JLINKPATH_TOOLCHAIN_HOME`
//! - `JLINKPATH_LOG_LEVEL`, `JLINKPATH_LOG_JSON`: see [`crate::util::logging`]
//!
//! # Example
//!
//! ```toml
//! output_directory = "target/classes"
//!
//! [[artifacts]]
//! path = "libs/commons-lang3-3.12.0.jar"
//! scope = "compile"
//! coordinates = "org.apache.commons:commons-lang3:3.12.0"
//!
//! [module_path]
//! path_elements = ["mods/extra.jar"]
//!
//! [[module_path.file_sets]]
//! directory = "mods"
//! includes = ["**/*.jar"]
//!
//! [[module_path.dependency_sets]]
//! includes = ["glob:**/*.jar"]
//! exclude_names = ["org\\.example\\.internal.*"]
//! ```

use crate::error::SetKind;
use crate::filter::DependencyFilter;
use crate::path::fileset::SetMatcher;
use crate::path::{FileSet, ModulePath};
use crate::pattern::PatternError;
use crate::project::{Artifact, ProjectDependencies};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_OUTPUT_DIRECTORY: &str = "target/classes";
const TOOLCHAIN_HOME_ENV: &str = "JLINKPATH_TOOLCHAIN_HOME";
const JAVA_HOME_ENV: &str = "JAVA_HOME";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid dependency set {index}: {source}")]
    InvalidDependencySet {
        index: usize,
        #[source]
        source: PatternError,
    },
}

/// Resolution inputs for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPathConfig {
    /// Base for relative paths; the configuration file's directory when absent
    pub project_root: Option<PathBuf>,

    /// Compiled classes of the project
    pub output_directory: PathBuf,

    /// JDK home whose `release` file limits multi-release descriptors
    pub toolchain_home: Option<PathBuf>,

    pub artifacts: Vec<Artifact>,

    pub system_dependencies: Vec<PathBuf>,

    pub module_path: ModulePath,
}

impl Default for LinkPathConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            toolchain_home: None,
            artifacts: Vec::new(),
            system_dependencies: Vec::new(),
            module_path: ModulePath::default(),
        }
    }
}

impl LinkPathConfig {
    /// Loads a configuration file and applies environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut config = Self::from_toml_str(&content, &base_dir).map_err(|e| match e {
            ConfigError::ParseError { error, .. } => ConfigError::ParseError {
                field: path.display().to_string(),
                error,
            },
            other => other,
        })?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses TOML; a missing `project_root` becomes `base_dir`.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            field: "configuration".to_string(),
            error: e.to_string(),
        })?;
        config.project_root = Some(match config.project_root.take() {
            Some(root) if root.is_absolute() => root,
            Some(root) => base_dir.join(root),
            None => base_dir.to_path_buf(),
        });
        Ok(config)
    }

    /// Fills the toolchain home from the environment when not configured.
    pub fn apply_env_overrides(&mut self) {
        if self.toolchain_home.is_some() {
            return;
        }
        self.toolchain_home = [TOOLCHAIN_HOME_ENV, JAVA_HOME_ENV]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .find(|value| !value.trim().is_empty())
            .map(PathBuf::from);
    }

    pub fn project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolves `path` against the project root unless it is absolute.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root().join(path)
        }
    }

    pub fn output_directory_path(&self) -> PathBuf {
        self.resolve_path(&self.output_directory)
    }

    pub fn toolchain_home_path(&self) -> Option<PathBuf> {
        self.toolchain_home.as_deref().map(|p| self.resolve_path(p))
    }

    /// Project dependencies with every path resolved.
    pub fn dependencies(&self) -> ProjectDependencies {
        ProjectDependencies {
            output_directory: self.output_directory_path(),
            artifacts: self
                .artifacts
                .iter()
                .map(|a| Artifact {
                    path: self.resolve_path(&a.path),
                    ..a.clone()
                })
                .collect(),
            system_dependencies: self
                .system_dependencies
                .iter()
                .filter(|p| !is_blank(p))
                .map(|p| self.resolve_path(p))
                .collect(),
        }
    }

    /// Validates the configuration
    ///
    /// Rejects blank paths and blank patterns, and compiles every pattern so a
    /// typo fails before any filesystem work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.output_directory) {
            return Err(ConfigError::ValidationFailed(
                "Output directory must not be empty".to_string(),
            ));
        }

        if let Some(index) = self.artifacts.iter().position(|a| is_blank(&a.path)) {
            return Err(ConfigError::ValidationFailed(format!(
                "Artifact {} has an empty path",
                index
            )));
        }

        if let Some(index) = self
            .module_path
            .path_elements
            .iter()
            .position(|p| is_blank(p))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Path element {} is empty",
                index
            )));
        }

        validate_sets(&self.module_path.file_sets, SetKind::FileSet)?;
        validate_sets(&self.module_path.dir_sets, SetKind::DirSet)?;

        for (index, set) in self.module_path.dependency_sets.iter().enumerate() {
            DependencyFilter::compile(set)
                .map_err(|source| ConfigError::InvalidDependencySet { index, source })?;
        }

        Ok(())
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

fn validate_sets(sets: &[FileSet], kind: SetKind) -> Result<(), ConfigError> {
    for (index, set) in sets.iter().enumerate() {
        if let Some(pattern) = set
            .includes
            .iter()
            .chain(&set.excludes)
            .find(|p| p.trim().is_empty())
        {
            return Err(ConfigError::ValidationFailed(format!(
                "{} {} has a blank pattern: '{}'",
                kind, index, pattern
            )));
        }
        SetMatcher::compile(set, kind).map_err(|e| {
            ConfigError::ValidationFailed(format!("{} {}: {}", kind, index, e))
        })?;
    }
    Ok(())
}

impl fmt::Display for LinkPathConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "jlinkpath Configuration:")?;
        writeln!(f, "  Project Root: {}", self.project_root().display())?;
        writeln!(f, "  Output Directory: {}", self.output_directory.display())?;
        match &self.toolchain_home {
            Some(home) => writeln!(f, "  Toolchain Home: {}", home.display())?,
            None => writeln!(f, "  Toolchain Home: (not set)")?,
        }
        writeln!(f, "  Artifacts: {}", self.artifacts.len())?;
        writeln!(f, "  System Dependencies: {}", self.system_dependencies.len())?;
        writeln!(f, "  Path Elements: {}", self.module_path.path_elements.len())?;
        writeln!(f, "  File Sets: {}", self.module_path.file_sets.len())?;
        writeln!(f, "  Dir Sets: {}", self.module_path.dir_sets.len())?;
        writeln!(
            f,
            "  Dependency Sets: {}",
            self.module_path.dependency_sets.len()
        )?;
        writeln!(f, "  Deduplicate: {}", self.module_path.deduplicate)?;
        Ok(())
    }
}
