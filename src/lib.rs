//! jlinkpath - module path resolution for jlink
//!
//! Given a project's compiled output and its dependency artifacts, jlinkpath
//! reads every module descriptor (explicit `module-info.class`, manifest
//! `Automatic-Module-Name` or a name derived from the file name), decides which
//! elements belong on the module path and which on the class path, and
//! assembles the final module path from explicit path elements, file-sets,
//! dir-sets and dependency-sets.
//!
//! # Example
//!
//! ```no_run
//! use jlinkpath::{resolve_module_path, LinkPathConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = LinkPathConfig::load_from_file(std::path::Path::new("jlinkpath.toml"))?;
//! let resolution = resolve_module_path(&config)?;
//! println!("--module-path {}", resolution.module_path());
//! # Ok(())
//! # }
//! ```
//!
//! # Layout
//!
//! - [`module`]: descriptor reading and module path / class path classification
//! - [`pattern`]: `glob:` and `regex:` patterns used by dependency-sets
//! - [`filter`]: dependency-set evaluation
//! - [`path`]: file-sets, dir-sets and module path assembly
//! - [`resolution`]: the end-to-end pipeline

pub mod cli;
pub mod config;
pub mod debug;
pub mod error;
pub mod filter;
pub mod module;
pub mod path;
pub mod pattern;
pub mod project;
pub mod report;
pub mod resolution;
pub mod util;

pub use config::{ConfigError, LinkPathConfig};
pub use error::ResolveError;
pub use filter::{DependencyFilter, DependencySet};
pub use module::{Candidate, ModuleDescriptor, ResolvedPaths};
pub use path::{assemble, AssembledModulePath, ModulePath};
pub use report::ResolutionReport;
pub use resolution::{resolve_module_path, ModulePathResolver, Resolution};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
