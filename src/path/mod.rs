//! Module path assembly from path elements, file-sets, dir-sets and
//! dependency-sets

pub mod assembler;
pub mod fileset;

pub use assembler::{assemble, AssembledModulePath, Assembly, ModulePath};
pub use fileset::{FileSet, DEFAULT_EXCLUDES};

/// Platform path separator used to join module path entries
pub const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };
