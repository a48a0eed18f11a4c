//! Minimal reader for the main section of `META-INF/MANIFEST.MF`

use std::collections::HashMap;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
pub const AUTOMATIC_MODULE_NAME: &str = "Automatic-Module-Name";
pub const MULTI_RELEASE: &str = "Multi-Release";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    attributes: HashMap<String, String>,
}

impl Manifest {
    /// Parses the main attributes; per-entry sections after the first blank
    /// line are ignored. Continuation lines start with a single space.
    pub fn parse(content: &str) -> Self {
        let mut attributes = HashMap::new();
        let mut current: Option<(String, String)> = None;

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            if let Some(rest) = line.strip_prefix(' ') {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(rest);
                }
                continue;
            }
            if let Some((key, value)) = current.take() {
                attributes.insert(key.to_ascii_lowercase(), value);
            }
            if let Some((key, value)) = line.split_once(':') {
                current = Some((key.trim().to_string(), value.trim_start().to_string()));
            }
        }
        if let Some((key, value)) = current {
            attributes.insert(key.to_ascii_lowercase(), value);
        }

        Self { attributes }
    }

    /// Attribute names are case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn automatic_module_name(&self) -> Option<&str> {
        self.get(AUTOMATIC_MODULE_NAME)
    }

    pub fn is_multi_release(&self) -> bool {
        self.get(MULTI_RELEASE)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
