//! End-to-end module path resolution for one project
//!
//! Collects candidates, resolves their descriptors, assembles the module path
//! and logs the resulting classification. Nothing is cached between runs.

use crate::config::LinkPathConfig;
use crate::module::{resolve_paths, ResolveRequest, ResolvedPaths, ToolchainHome};
use crate::path::{assemble, Assembly};
use crate::project::DependencyProvider;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, info};

/// Everything a resolution run produced
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolved: ResolvedPaths,
    pub assembly: Assembly,
}

impl Resolution {
    /// The assembled module path string.
    pub fn module_path(&self) -> String {
        self.assembly.module_path.to_path_string()
    }
}

pub struct ModulePathResolver {
    toolchain: Option<ToolchainHome>,
    deduplicate: Option<bool>,
}

impl ModulePathResolver {
    pub fn new(toolchain: Option<ToolchainHome>) -> Self {
        Self {
            toolchain,
            deduplicate: None,
        }
    }

    /// Opens the configured toolchain home, if any.
    pub fn from_config(config: &LinkPathConfig) -> Result<Self> {
        let toolchain = match config.toolchain_home_path() {
            Some(home) => Some(
                ToolchainHome::open(&home)
                    .with_context(|| format!("Invalid toolchain home {}", home.display()))?,
            ),
            None => None,
        };
        Ok(Self::new(toolchain))
    }

    /// Forces the deduplication pass on or off regardless of configuration.
    pub fn with_deduplicate(mut self, deduplicate: Option<bool>) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    pub fn toolchain(&self) -> Option<&ToolchainHome> {
        self.toolchain.as_ref()
    }

    pub fn resolve(
        &self,
        provider: &dyn DependencyProvider,
        config: &LinkPathConfig,
    ) -> Result<Resolution> {
        let start = Instant::now();
        let project_root = config.project_root();
        info!("Resolving module path for: {}", project_root.display());

        let request = ResolveRequest::new(provider.candidate_paths())
            .with_toolchain(self.toolchain.clone());
        let resolved = resolve_paths(&request);
        resolved.log_summary();

        let mut module_path = config.module_path.clone();
        if let Some(deduplicate) = self.deduplicate {
            module_path.deduplicate = deduplicate;
        }
        let assembly = assemble(&module_path, &project_root, resolved.candidates())
            .context("Failed to assemble module path")?;

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Module path resolution complete"
        );

        Ok(Resolution { resolved, assembly })
    }
}

/// Validates `config` and resolves its module path.
pub fn resolve_module_path(config: &LinkPathConfig) -> Result<Resolution> {
    config.validate().context("Invalid configuration")?;
    let dependencies = config.dependencies();
    ModulePathResolver::from_config(config)?.resolve(&dependencies, config)
}
