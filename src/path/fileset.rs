//! Rooted, pattern-filtered selections of files or directories
//!
//! Patterns follow Ant conventions and are matched against the path relative
//! to the set's root, always with `/` separators. A trailing `/` means
//! everything below that directory, and `dir/**` also selects `dir` itself.
//! Entries are visited depth-first in file-name order, so the same tree
//! always expands to the same sequence.

use crate::debug::file_set_debug_info;
use crate::error::{ResolveError, SetKind};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, enabled, warn, Level};
use walkdir::WalkDir;

/// SCM and editor metadata skipped unless `use_default_excludes` is off
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    "**/RCS",
    "**/RCS/**",
    "**/SCCS",
    "**/SCCS/**",
    "**/vssver.scc",
    "**/project.pj",
    "**/.svn",
    "**/.svn/**",
    "**/.arch-ids",
    "**/.arch-ids/**",
    "**/.bzr",
    "**/.bzr/**",
    "**/.MySCMServerInfo",
    "**/.DS_Store",
    "**/.metadata",
    "**/.metadata/**",
    "**/.hg",
    "**/.hg/**",
    "**/.git",
    "**/.git/**",
    "**/.gitignore",
    "**/.gitattributes",
    "**/BitKeeper",
    "**/BitKeeper/**",
    "**/ChangeSet",
    "**/ChangeSet/**",
    "**/_darcs",
    "**/_darcs/**",
    "**/.darcsrepo",
    "**/.darcsrepo/**",
    "**/-darcs-backup*",
    "**/.darcs-temp-mail",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSet {
    /// Root of the set; the project root when absent, relative paths resolve against it
    pub directory: Option<PathBuf>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub follow_symlinks: bool,
    pub use_default_excludes: bool,
}

impl Default for FileSet {
    fn default() -> Self {
        Self {
            directory: None,
            includes: Vec::new(),
            excludes: Vec::new(),
            follow_symlinks: false,
            use_default_excludes: true,
        }
    }
}

/// Rewrites an Ant pattern into one or more globs.
fn normalize_pattern(raw: &str) -> Vec<String> {
    let mut pattern = raw.trim().replace('\\', "/");
    if pattern.ends_with('/') {
        pattern.push_str("**");
    }
    match pattern.strip_suffix("/**") {
        Some(dir) if !dir.is_empty() => vec![dir.to_string(), pattern.clone()],
        _ => vec![pattern],
    }
}

fn build_glob_set(patterns: &[String], kind: SetKind) -> Result<GlobSet, ResolveError> {
    let mut builder = GlobSetBuilder::new();
    for raw in patterns {
        for pattern in normalize_pattern(raw) {
            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ResolveError::SetPattern {
                    kind,
                    pattern: raw.clone(),
                    source,
                })?;
            builder.add(glob);
        }
    }
    builder.build().map_err(|source| ResolveError::SetPattern {
        kind,
        pattern: patterns.join(","),
        source,
    })
}

/// Compiled include/exclude patterns of one set
#[derive(Debug, Clone)]
pub struct SetMatcher {
    includes: GlobSet,
    excludes: GlobSet,
}

impl SetMatcher {
    pub fn compile(set: &FileSet, kind: SetKind) -> Result<Self, ResolveError> {
        let includes = if set.includes.is_empty() {
            vec!["**".to_string()]
        } else {
            set.includes.clone()
        };
        let mut excludes = set.excludes.clone();
        if set.use_default_excludes {
            excludes.extend(DEFAULT_EXCLUDES.iter().map(|p| p.to_string()));
        }
        Ok(Self {
            includes: build_glob_set(&includes, kind)?,
            excludes: build_glob_set(&excludes, kind)?,
        })
    }

    /// `relative` uses `/` separators.
    pub fn is_selected(&self, relative: &str) -> bool {
        self.includes.is_match(relative) && !self.excludes.is_match(relative)
    }
}

impl FileSet {
    /// Absolute, canonical root of the set.
    pub fn resolve_root(&self, kind: SetKind, project_root: &Path) -> Result<PathBuf, ResolveError> {
        let directory = match &self.directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_root.join(dir),
            None => project_root.to_path_buf(),
        };
        directory
            .canonicalize()
            .map_err(|source| ResolveError::SetRoot {
                kind,
                directory,
                source,
            })
    }

    /// Expands the set into matching files (`SetKind::FileSet`) or
    /// directories (`SetKind::DirSet`). The root itself is never selected.
    pub fn expand(&self, kind: SetKind, project_root: &Path) -> Result<Vec<PathBuf>, ResolveError> {
        let root = self.resolve_root(kind, project_root)?;
        let matcher = SetMatcher::compile(self, kind)?;
        let mut selected = Vec::new();

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    warn!(
                        root = %root.display(),
                        error = %e,
                        "Skipping unreadable {} entry", kind
                    );
                    continue;
                }
                Err(source) => {
                    return Err(ResolveError::Walk {
                        kind,
                        directory: root,
                        source,
                    })
                }
            };

            if entry.path_is_symlink() && !self.follow_symlinks {
                continue;
            }
            let wanted = match kind {
                SetKind::FileSet => entry.file_type().is_file(),
                SetKind::DirSet => entry.file_type().is_dir(),
            };
            if !wanted {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            if matcher.is_selected(&relative) {
                selected.push(entry.into_path());
            }
        }

        if enabled!(Level::DEBUG) {
            let data = selected
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(super::PATH_SEPARATOR);
            let title = match kind {
                SetKind::FileSet => "FILESET",
                SetKind::DirSet => "DIRSET",
            };
            debug!("{}", file_set_debug_info(title, self, &root, &data));
        }

        Ok(selected)
    }
}
