//! Path and module-name pattern matching
//!
//! Path patterns select their matcher by prefix: `glob:` or `regex:`. A pattern
//! without a prefix is a glob. Module names are always matched as regular
//! expressions, since a module name is an identifier and not a path.
//!
//! Every match is a full match: the pattern has to describe the whole path or
//! name, not just a part of it.
//!
//! ```
//! use jlinkpath::pattern::{compile_path_patterns, path_matches};
//! use std::path::Path;
//!
//! let patterns = compile_path_patterns(&["glob:**/*.jar".to_string()]).unwrap();
//! assert!(path_matches(&patterns, Path::new("/a/b/c.jar")).unwrap());
//! ```

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const GLOB_PREFIX: &str = "glob:";
pub const REGEX_PREFIX: &str = "regex:";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Empty {0} pattern list: at least one pattern is required")]
    EmptyPatternList(&'static str),

    #[error("Blank pattern: '{0}'")]
    BlankPattern(String),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Matcher kind of a path pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Glob,
    Regex,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Glob => write!(f, "glob"),
            PatternKind::Regex => write!(f, "regex"),
        }
    }
}

/// A pattern split into its matcher kind and the remaining pattern text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPattern<'a> {
    pub kind: PatternKind,
    pub text: &'a str,
}

/// Splits the matcher prefix off a raw path pattern.
///
/// Knows nothing about matching, so new prefixes only need a new arm here.
pub fn parse_pattern(raw: &str) -> ParsedPattern<'_> {
    if let Some(text) = raw.strip_prefix(REGEX_PREFIX) {
        ParsedPattern {
            kind: PatternKind::Regex,
            text,
        }
    } else if let Some(text) = raw.strip_prefix(GLOB_PREFIX) {
        ParsedPattern {
            kind: PatternKind::Glob,
            text,
        }
    } else {
        ParsedPattern {
            kind: PatternKind::Glob,
            text: raw,
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Glob(GlobMatcher),
    Regex(Regex),
}

/// A compiled path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    kind: PatternKind,
    matcher: Matcher,
}

impl PathPattern {
    pub fn new(raw: &str) -> Result<Self, PatternError> {
        let parsed = parse_pattern(raw);
        if parsed.text.trim().is_empty() {
            return Err(PatternError::BlankPattern(raw.to_string()));
        }

        let matcher = match parsed.kind {
            PatternKind::Glob => Matcher::Glob(compile_glob(parsed.text)?),
            PatternKind::Regex => Matcher::Regex(compile_full_regex(parsed.text)?),
        };

        Ok(Self {
            raw: raw.to_string(),
            kind: parsed.kind,
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn is_match(&self, path: &Path) -> bool {
        match &self.matcher {
            Matcher::Glob(glob) => glob.is_match(path),
            Matcher::Regex(regex) => regex.is_match(&path.to_string_lossy()),
        }
    }
}

/// A compiled module-name pattern (always a regular expression)
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(raw: &str) -> Result<Self, PatternError> {
        if raw.trim().is_empty() {
            return Err(PatternError::BlankPattern(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            regex: compile_full_regex(raw)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

fn compile_glob(text: &str) -> Result<GlobMatcher, PatternError> {
    GlobBuilder::new(text)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| PatternError::InvalidGlob {
            pattern: text.to_string(),
            source,
        })
}

/// Compiles a regex anchored at both ends.
fn compile_full_regex(text: &str) -> Result<Regex, PatternError> {
    Regex::new(&format!("^(?:{})$", text)).map_err(|source| PatternError::InvalidRegex {
        pattern: text.to_string(),
        source,
    })
}

pub fn compile_path_patterns(raw: &[String]) -> Result<Vec<PathPattern>, PatternError> {
    raw.iter().map(|p| PathPattern::new(p)).collect()
}

pub fn compile_name_patterns(raw: &[String]) -> Result<Vec<NamePattern>, PatternError> {
    raw.iter().map(|p| NamePattern::new(p)).collect()
}

/// Returns true if the path matches at least one of the patterns.
///
/// An empty list is rejected: the caller decides what "no patterns" means.
pub fn path_matches(patterns: &[PathPattern], path: &Path) -> Result<bool, PatternError> {
    if patterns.is_empty() {
        return Err(PatternError::EmptyPatternList("path"));
    }
    Ok(patterns.iter().any(|p| p.is_match(path)))
}

/// Returns true if the module name matches at least one of the patterns.
///
/// An empty list is rejected: the caller decides what "no patterns" means.
pub fn name_matches(patterns: &[NamePattern], name: &str) -> Result<bool, PatternError> {
    if patterns.is_empty() {
        return Err(PatternError::EmptyPatternList("name"));
    }
    Ok(patterns.iter().any(|p| p.is_match(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(raw: &[&str]) -> Vec<PathPattern> {
        compile_path_patterns(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    fn names(raw: &[&str]) -> Vec<NamePattern> {
        compile_name_patterns(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(
            parse_pattern("glob:**/*.jar"),
            ParsedPattern {
                kind: PatternKind::Glob,
                text: "**/*.jar"
            }
        );
        assert_eq!(
            parse_pattern("regex:.*\\.jar"),
            ParsedPattern {
                kind: PatternKind::Regex,
                text: ".*\\.jar"
            }
        );
        assert_eq!(parse_pattern("**/*.jmod").kind, PatternKind::Glob);
        assert_eq!(parse_pattern("**/*.jmod").text, "**/*.jmod");
    }

    #[test]
    fn test_glob_matches_whole_path() {
        let patterns = paths(&["glob:**/*.jar"]);
        assert!(path_matches(&patterns, Path::new("/a/b/c.jar")).unwrap());
        assert!(!path_matches(&patterns, Path::new("/a/b/c.jar.sha1")).unwrap());
    }

    #[test]
    fn test_unprefixed_pattern_is_glob() {
        let patterns = paths(&["**/lib/*.jar"]);
        assert_eq!(patterns[0].kind(), PatternKind::Glob);
        assert!(path_matches(&patterns, Path::new("/repo/lib/x.jar")).unwrap());
    }

    #[test]
    fn test_glob_star_does_not_cross_directories() {
        let patterns = paths(&["glob:/repo/*.jar"]);
        assert!(path_matches(&patterns, Path::new("/repo/a.jar")).unwrap());
        assert!(!path_matches(&patterns, Path::new("/repo/lib/a.jar")).unwrap());
    }

    #[test]
    fn test_glob_alternation() {
        let patterns = paths(&["glob:**/*.{jar,jmod}"]);
        assert!(path_matches(&patterns, Path::new("/m/java.base.jmod")).unwrap());
        assert!(path_matches(&patterns, Path::new("/m/a.jar")).unwrap());
        assert!(!path_matches(&patterns, Path::new("/m/a.zip")).unwrap());
    }

    #[test]
    fn test_regex_is_full_match() {
        let patterns = paths(&["regex:foo"]);
        assert!(!path_matches(&patterns, Path::new("foobar")).unwrap());
        assert!(path_matches(&patterns, Path::new("foo")).unwrap());
    }

    #[test]
    fn test_regex_path_pattern() {
        let patterns = paths(&["regex:.*/foo-(bar|baz)-.*?\\.jar"]);
        assert!(path_matches(&patterns, Path::new("/repo/foo-bar-1.0.jar")).unwrap());
        assert!(!path_matches(&patterns, Path::new("/repo/foo-qux-1.0.jar")).unwrap());
    }

    #[test]
    fn test_any_pattern_suffices() {
        let patterns = paths(&["glob:**/*.jmod", "regex:.*\\.jar"]);
        assert!(path_matches(&patterns, Path::new("/x/y.jar")).unwrap());
    }

    #[test]
    fn test_name_matches_full_regex() {
        let patterns = names(&["javafx\\..+"]);
        assert!(name_matches(&patterns, "javafx.base").unwrap());
        assert!(!name_matches(&patterns, "org.javafx.base").unwrap());
        assert!(!name_matches(&patterns, "javafx").unwrap());
    }

    #[test]
    fn test_empty_lists_are_rejected() {
        assert!(matches!(
            path_matches(&[], Path::new("/a.jar")),
            Err(PatternError::EmptyPatternList("path"))
        ));
        assert!(matches!(
            name_matches(&[], "a"),
            Err(PatternError::EmptyPatternList("name"))
        ));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::new("regex:foo(("),
            Err(PatternError::InvalidRegex { .. })
        ));
        assert!(matches!(
            PathPattern::new("glob:[a-"),
            Err(PatternError::InvalidGlob { .. })
        ));
        assert!(matches!(
            PathPattern::new("glob:"),
            Err(PatternError::BlankPattern(_))
        ));
        assert!(matches!(
            NamePattern::new("  "),
            Err(PatternError::BlankPattern(_))
        ));
    }
}
