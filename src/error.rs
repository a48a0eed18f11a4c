//! Errors that abort a resolution run
//!
//! Per-candidate descriptor failures never surface here; they are collected as
//! path exceptions by [`crate::module::resolver`].

use crate::pattern::PatternError;
use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of set a root directory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    FileSet,
    DirSet,
}

impl std::fmt::Display for SetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetKind::FileSet => write!(f, "file-set"),
            SetKind::DirSet => write!(f, "dir-set"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unable to resolve {kind} directory {}: {source}", directory.display())]
    SetRoot {
        kind: SetKind,
        directory: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to walk {kind} directory {}: {source}", directory.display())]
    Walk {
        kind: SetKind,
        directory: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid {kind} pattern '{pattern}': {source}")]
    SetPattern {
        kind: SetKind,
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Message of the deepest error in the `source()` chain.
pub fn root_cause(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}
