//! Toolchain home directory
//!
//! The `release` file of a JDK home names the Java version the image is linked
//! for. Its feature release decides which versioned `module-info.class` of a
//! multi-release archive applies.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const RELEASE_FILE: &str = "release";
const JAVA_VERSION_KEY: &str = "JAVA_VERSION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainHome {
    path: PathBuf,
    feature_release: Option<u32>,
}

impl ToolchainHome {
    /// Opens a toolchain home. A missing or unparsable `release` file is
    /// tolerated and leaves the feature release unknown.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            bail!("Toolchain home is not a directory: {}", path.display());
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize toolchain home {:?}", path))?;

        let release_path = path.join(RELEASE_FILE);
        let feature_release = match fs::read_to_string(&release_path) {
            Ok(content) => {
                let release = parse_java_version(&content);
                if release.is_none() {
                    warn!(
                        file = %release_path.display(),
                        "No usable JAVA_VERSION in toolchain release file"
                    );
                }
                release
            }
            Err(e) => {
                warn!(
                    file = %release_path.display(),
                    error = %e,
                    "Unable to read toolchain release file"
                );
                None
            }
        };

        debug!(home = %path.display(), ?feature_release, "Toolchain home opened");

        Ok(Self {
            path,
            feature_release,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn feature_release(&self) -> Option<u32> {
        self.feature_release
    }
}

/// Extracts the feature release from `JAVA_VERSION="17.0.2"` (or `"1.8.0_292"`).
pub fn parse_java_version(release_file: &str) -> Option<u32> {
    let value = release_file.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        (key.trim() == JAVA_VERSION_KEY).then(|| value.trim().trim_matches('"').to_string())
    })?;

    let mut parts = value.split(|c: char| !c.is_ascii_digit());
    let first: u32 = parts.next()?.parse().ok()?;
    if first == 1 {
        parts.next()?.parse().ok()
    } else {
        Some(first)
    }
}
